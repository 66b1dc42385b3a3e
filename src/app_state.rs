//! Application root state: the session and the dashboard it selects.
//!
//! `AppState` is shared behind an `Arc` by whatever front-end drives the
//! command layer. The session and dashboard slots are std `RwLock`s and
//! the dashboards guard their own state with `Mutex`es. Neither is held
//! across an `.await`: callers clone the `Arc` of the active dashboard out
//! and release the lock before doing any I/O.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::api::ClinicBackend;
use crate::auth::{self, AuthError, Session};
use crate::dashboard::{DoctorDashboard, OwnerDashboard, StaffDashboard};
use crate::models::Role;
use crate::report::PrintSurface;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("State lock poisoned")]
    LockPoisoned,
    #[error("No active session")]
    NoActiveSession,
    #[error("Action requires the {expected} dashboard")]
    WrongDashboard { expected: Role },
    #[error("{0} not loaded yet")]
    NotLoaded(&'static str),
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },
}

impl StateError {
    pub fn user_message(&self) -> String {
        match self {
            StateError::NoActiveSession => "กรุณาเข้าสู่ระบบ".to_string(),
            StateError::WrongDashboard { expected } => {
                format!("คำสั่งนี้ใช้ได้เฉพาะ{}", expected.label())
            }
            StateError::NotLoaded(_) => "ข้อมูลยังโหลดไม่เสร็จ".to_string(),
            StateError::NotFound { .. } => "ไม่พบข้อมูล".to_string(),
            StateError::LockPoisoned => "เกิดข้อผิดพลาด".to_string(),
        }
    }
}

/// Lock a dashboard-owned mutex.
pub(crate) fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StateError> {
    m.lock().map_err(|_| StateError::LockPoisoned)
}

// ═══════════════════════════════════════════════════════════
// Dashboard — the view a session selects
// ═══════════════════════════════════════════════════════════

pub enum Dashboard<B> {
    Doctor(Arc<DoctorDashboard<B>>),
    Staff(Arc<StaffDashboard<B>>),
    Owner(Arc<OwnerDashboard>),
}

impl<B> Clone for Dashboard<B> {
    fn clone(&self) -> Self {
        match self {
            Dashboard::Doctor(d) => Dashboard::Doctor(d.clone()),
            Dashboard::Staff(d) => Dashboard::Staff(d.clone()),
            Dashboard::Owner(d) => Dashboard::Owner(d.clone()),
        }
    }
}

impl<B> Dashboard<B> {
    pub fn role(&self) -> Role {
        match self {
            Dashboard::Doctor(_) => Role::Doctor,
            Dashboard::Staff(_) => Role::Staff,
            Dashboard::Owner(_) => Role::Owner,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// AppState
// ═══════════════════════════════════════════════════════════

pub struct AppState<B> {
    backend: Arc<B>,
    surface: Arc<dyn PrintSurface>,
    session: RwLock<Option<Session>>,
    dashboard: RwLock<Option<Dashboard<B>>>,
}

impl<B: ClinicBackend> AppState<B> {
    pub fn new(backend: Arc<B>, surface: Arc<dyn PrintSurface>) -> Self {
        Self {
            backend,
            surface,
            session: RwLock::new(None),
            dashboard: RwLock::new(None),
        }
    }

    pub fn surface(&self) -> &dyn PrintSurface {
        self.surface.as_ref()
    }

    // ── Session ──────────────────────────────────────────

    /// Log in and build a fresh dashboard for the returned role. The
    /// dashboard is not mounted yet; see [`mount`](Self::mount).
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let session = auth::login(self.backend.as_ref(), username, password).await?;

        let dashboard = match session.role {
            Role::Doctor => {
                Dashboard::Doctor(Arc::new(DoctorDashboard::new(self.backend.clone(), session.clone())))
            }
            Role::Staff => {
                Dashboard::Staff(Arc::new(StaffDashboard::new(self.backend.clone(), session.clone())))
            }
            Role::Owner => Dashboard::Owner(Arc::new(OwnerDashboard::new(session.clone()))),
        };

        // A poisoned lock leaves the previous user in place; report it.
        {
            let mut guard = self.session.write().map_err(|_| poisoned())?;
            *guard = Some(session.clone());
        }
        {
            let mut guard = self.dashboard.write().map_err(|_| poisoned())?;
            *guard = Some(dashboard);
        }
        Ok(session)
    }

    /// Drop the session and every piece of dashboard state with it.
    pub fn logout(&self) -> Result<(), StateError> {
        let name = {
            let mut guard = self.session.write().map_err(|_| StateError::LockPoisoned)?;
            guard.take().map(|s| s.username)
        };
        let mut dashboard = self.dashboard.write().map_err(|_| StateError::LockPoisoned)?;
        *dashboard = None;
        if let Some(username) = name {
            tracing::info!(username = %username, "Logged out");
        }
        Ok(())
    }

    pub fn session(&self) -> Result<Option<Session>, StateError> {
        let guard = self.session.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(guard.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    // ── Dashboard access ─────────────────────────────────

    pub fn dashboard(&self) -> Result<Dashboard<B>, StateError> {
        let guard = self.dashboard.read().map_err(|_| StateError::LockPoisoned)?;
        guard.clone().ok_or(StateError::NoActiveSession)
    }

    /// Load the directory of the active dashboard. Runs once per login.
    pub async fn mount(&self) -> Result<(), StateError> {
        match self.dashboard()? {
            Dashboard::Doctor(d) => d.mount().await,
            Dashboard::Staff(d) => d.mount().await,
            Dashboard::Owner(_) => Ok(()),
        }
    }

    pub fn doctor(&self) -> Result<Arc<DoctorDashboard<B>>, StateError> {
        match self.dashboard()? {
            Dashboard::Doctor(d) => Ok(d),
            _ => Err(StateError::WrongDashboard { expected: Role::Doctor }),
        }
    }

    pub fn staff(&self) -> Result<Arc<StaffDashboard<B>>, StateError> {
        match self.dashboard()? {
            Dashboard::Staff(d) => Ok(d),
            _ => Err(StateError::WrongDashboard { expected: Role::Staff }),
        }
    }

    pub fn owner(&self) -> Result<Arc<OwnerDashboard>, StateError> {
        match self.dashboard()? {
            Dashboard::Owner(d) => Ok(d),
            _ => Err(StateError::WrongDashboard { expected: Role::Owner }),
        }
    }
}

fn poisoned() -> AuthError {
    tracing::error!("Session lock poisoned during login");
    AuthError::SessionUnavailable
}
