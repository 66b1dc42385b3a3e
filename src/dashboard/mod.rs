//! Role dashboards.
//!
//! Each dashboard owns its state outright: directory, record cache, local
//! collections and search box. Nothing is shared between dashboards, so
//! the doctor and staff views keep separate record caches. All mutation
//! goes through named methods; view accessors return owned snapshots.

pub mod doctor;
pub mod owner;
pub mod staff;

use std::sync::{Arc, Mutex};

use serde::Serialize;

pub use doctor::DoctorDashboard;
pub use owner::OwnerDashboard;
pub use staff::StaffDashboard;

use crate::api::{ApiError, ClinicBackend};
use crate::app_state::{lock, StateError};
use crate::directory::{LoadState, PatientDirectory};
use crate::forms::ValidationError;
use crate::models::{MedicalRecord, Patient, PatientId};
use crate::record_cache::{Begin, CacheEntry, RecordCache};
use crate::report::ReportError;
use crate::search;

pub const MSG_RECORDS_FAILED: &str = "โหลดเวชระเบียนไม่สำเร็จ";

// ═══════════════════════════════════════════════════════════
// ActionError — what a dashboard action can fail with
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl ActionError {
    /// Localized message; `fallback` names the remote action that failed.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ActionError::Validation(e) => e.alert_message(),
            ActionError::State(e) => e.user_message(),
            ActionError::Api(e) => e.user_message(fallback),
            ActionError::Report(e) => e.user_message(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// TabState — active tab plus the single search box
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct TabState<T> {
    active: T,
    query: String,
}

impl<T: Copy + PartialEq> TabState<T> {
    pub fn new(initial: T) -> Self {
        Self {
            active: initial,
            query: String::new(),
        }
    }

    pub fn active(&self) -> T {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Switch tab. The query is cleared even when re-selecting the same tab.
    pub fn switch(&mut self, tab: T) {
        self.active = tab;
        self.query.clear();
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
    }
}

// ═══════════════════════════════════════════════════════════
// RecordPanel — what the records area shows for one patient
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "records", rename_all = "snake_case")]
pub enum RecordPanel {
    /// Never requested: show nothing.
    NotRequested,
    Loading,
    Failed(String),
    /// Fetched, and the patient has no records.
    Empty,
    Records(Vec<MedicalRecord>),
}

impl RecordPanel {
    fn from_entry(entry: Option<&CacheEntry<Vec<MedicalRecord>>>) -> Self {
        match entry {
            None => RecordPanel::NotRequested,
            Some(CacheEntry::Pending) => RecordPanel::Loading,
            Some(CacheEntry::Failed(message)) => RecordPanel::Failed(message.clone()),
            Some(CacheEntry::Ready(rows)) if rows.is_empty() => RecordPanel::Empty,
            Some(CacheEntry::Ready(rows)) => RecordPanel::Records(rows.clone()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// PatientDesk — directory loader + record cache of one dashboard
// ═══════════════════════════════════════════════════════════

pub struct PatientDesk<B> {
    backend: Arc<B>,
    directory: Mutex<PatientDirectory>,
    records: Mutex<RecordCache<PatientId, Vec<MedicalRecord>>>,
}

impl<B: ClinicBackend> PatientDesk<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            directory: Mutex::new(PatientDirectory::new()),
            records: Mutex::new(RecordCache::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the patient list. Only the first call hits the backend.
    pub async fn load_patients(&self) -> Result<(), StateError> {
        let claimed = lock(&self.directory)?.begin_load();
        if !claimed {
            return Ok(());
        }

        let result = self.backend.list_patients(None).await;

        lock(&self.directory)?.resolve(result);
        Ok(())
    }

    /// Records of `patient_id`, fetched at most once per dashboard.
    ///
    /// Returns the panel as it stands once this call is done: data or
    /// error after a fetch, `Loading` if another caller owns the fetch.
    pub async fn get_records(&self, patient_id: PatientId) -> Result<RecordPanel, StateError> {
        let begin = lock(&self.records)?.begin(patient_id);
        match begin {
            Begin::Cached(rows) if rows.is_empty() => return Ok(RecordPanel::Empty),
            Begin::Cached(rows) => return Ok(RecordPanel::Records(rows)),
            Begin::InFlight => return Ok(RecordPanel::Loading),
            Begin::Fetch => {}
        }

        tracing::debug!(patient_id, "Fetching medical records");
        let outcome = self
            .backend
            .patient_records(patient_id)
            .await
            .map_err(|e| e.user_message(MSG_RECORDS_FAILED));

        let mut cache = lock(&self.records)?;
        cache.resolve(patient_id, outcome);
        Ok(RecordPanel::from_entry(cache.entry(&patient_id)))
    }

    /// Current panel for `patient_id` without fetching.
    pub fn record_panel(&self, patient_id: PatientId) -> Result<RecordPanel, StateError> {
        let cache = lock(&self.records)?;
        Ok(RecordPanel::from_entry(cache.entry(&patient_id)))
    }

    // ── Directory views ──────────────────────────────────

    pub fn directory_state(&self) -> Result<LoadState<Vec<Patient>>, StateError> {
        Ok(lock(&self.directory)?.state().clone())
    }

    pub fn patients_matching(&self, query: &str) -> Result<Vec<Patient>, StateError> {
        let directory = lock(&self.directory)?;
        Ok(search::filter(directory.patients(), query)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn patient(&self, id: PatientId) -> Result<Patient, StateError> {
        lock(&self.directory)?
            .find(id)
            .cloned()
            .ok_or(StateError::NotFound { kind: "patient", id })
    }

    pub fn hn_of(&self, id: PatientId) -> Result<String, StateError> {
        Ok(lock(&self.directory)?.hn_of(id).to_string())
    }

    /// Append a locally registered patient built from the next local id.
    pub fn append_patient(
        &self,
        build: impl FnOnce(PatientId) -> Patient,
    ) -> Result<Patient, StateError> {
        let mut directory = lock(&self.directory)?;
        let patient = build(directory.next_local_id());
        directory.append_local(patient.clone())?;
        Ok(patient)
    }
}
