//! Patient directory: the list loaded once per dashboard.

use crate::api::ApiError;
use crate::app_state::StateError;
use crate::models::{Patient, PatientId};

pub const MSG_PATIENTS_FAILED: &str = "โหลดรายชื่อผู้ป่วยไม่สำเร็จ";

/// Observable state of a remote list.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Map a backend result, using `fallback` when the server gave no message.
    pub fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(data) => LoadState::Loaded(data),
            Err(e) => LoadState::Failed(e.user_message(fallback)),
        }
    }
}

impl<E> LoadState<Vec<E>> {
    /// Loaded rows, or an empty slice while loading or after a failure.
    pub fn items(&self) -> &[E] {
        match self {
            LoadState::Loaded(rows) => rows.as_slice(),
            _ => &[],
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

// ═══════════════════════════════════════════════════════════
// PatientDirectory
// ═══════════════════════════════════════════════════════════

/// Directory state plus the at-most-once load latch.
#[derive(Debug, Clone, Default)]
pub struct PatientDirectory {
    state: LoadState<Vec<Patient>>,
    requested: bool,
}

impl PatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once: the caller then performs the load.
    pub fn begin_load(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        self.state = LoadState::Loading;
        true
    }

    pub fn resolve(&mut self, result: Result<Vec<Patient>, ApiError>) {
        self.state = LoadState::from_result(result, MSG_PATIENTS_FAILED);
        match &self.state {
            LoadState::Loaded(rows) => tracing::info!(count = rows.len(), "Patient directory loaded"),
            LoadState::Failed(message) => tracing::warn!(error = %message, "Patient directory failed"),
            LoadState::Loading => {}
        }
    }

    pub fn state(&self) -> &LoadState<Vec<Patient>> {
        &self.state
    }

    pub fn patients(&self) -> &[Patient] {
        self.state.items()
    }

    pub fn find(&self, id: PatientId) -> Option<&Patient> {
        self.patients().iter().find(|p| p.id == id)
    }

    /// Hospital number of `id`, or `-` when the patient is not in the list.
    pub fn hn_of(&self, id: PatientId) -> &str {
        self.find(id).map(|p| p.hn.as_str()).unwrap_or("-")
    }

    /// Next local patient id: one past the highest id in the list, so a
    /// local row never shadows a server row when server ids have gaps.
    pub fn next_local_id(&self) -> PatientId {
        self.patients().iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Append a locally registered patient. Never sent to the backend.
    pub fn append_local(&mut self, patient: Patient) -> Result<(), StateError> {
        match &mut self.state {
            LoadState::Loaded(rows) => {
                tracing::info!(id = patient.id, hn = %patient.hn, "Patient added locally");
                rows.push(patient);
                Ok(())
            }
            _ => Err(StateError::NotLoaded("patients")),
        }
    }
}
