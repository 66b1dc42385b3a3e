//! Login / logout commands.

use crate::api::ClinicBackend;
use crate::app_state::AppState;
use crate::auth::Session;

/// Log in, build the role's dashboard and load its patient directory.
///
/// A directory load failure does not fail the login: it shows up as the
/// directory's error state instead.
pub async fn login<B: ClinicBackend>(
    state: &AppState<B>,
    username: &str,
    password: &str,
) -> Result<Session, String> {
    let session = state
        .login(username, password)
        .await
        .map_err(|e| e.user_message())?;
    state.mount().await.map_err(|e| e.user_message())?;
    Ok(session)
}

pub fn logout<B: ClinicBackend>(state: &AppState<B>) -> Result<(), String> {
    state.logout().map_err(|e| e.user_message())
}

pub fn current_session<B: ClinicBackend>(state: &AppState<B>) -> Result<Option<Session>, String> {
    state.session().map_err(|e| e.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::mock::{EP_LOGIN, EP_PATIENTS};
    use crate::api::{ApiError, MockBackend};
    use crate::auth::{MSG_BACKEND_DOWN, MSG_BAD_CREDENTIALS};
    use crate::models::Role;
    use crate::report::FilePrintSurface;

    fn app(backend: Arc<MockBackend>) -> AppState<MockBackend> {
        AppState::new(backend, Arc::new(FilePrintSurface::new(std::env::temp_dir())))
    }

    #[tokio::test]
    async fn login_mounts_directory() {
        let backend = Arc::new(MockBackend::demo());
        let state = app(backend.clone());

        let session = login(&state, "doctor1", "1234").await.unwrap();
        assert_eq!(session.name, "Dr. Somchai");
        assert_eq!(session.role, Role::Doctor);
        assert_eq!(backend.calls(EP_PATIENTS), 1);
        assert_eq!(current_session(&state).unwrap(), Some(session));
    }

    #[tokio::test]
    async fn owner_login_loads_nothing() {
        let backend = Arc::new(MockBackend::demo());
        let state = app(backend.clone());
        login(&state, "owner1", "1234").await.unwrap();
        assert_eq!(backend.calls(EP_PATIENTS), 0);
    }

    #[tokio::test]
    async fn bad_password_returns_server_message() {
        let state = app(Arc::new(MockBackend::demo()));
        assert_eq!(
            login(&state, "staff1", "nope").await.unwrap_err(),
            MSG_BAD_CREDENTIALS
        );
        assert_eq!(current_session(&state).unwrap(), None);
    }

    #[tokio::test]
    async fn backend_down_message() {
        let backend = Arc::new(MockBackend::demo());
        backend.fail(
            EP_LOGIN,
            ApiError::Transport {
                endpoint: "login",
                detail: "connection refused".into(),
            },
        );
        let state = app(backend);
        assert_eq!(login(&state, "staff1", "1234").await.unwrap_err(), MSG_BACKEND_DOWN);
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let state = app(Arc::new(MockBackend::demo()));
        login(&state, "staff1", "1234").await.unwrap();
        logout(&state).unwrap();
        assert_eq!(current_session(&state).unwrap(), None);
    }
}
