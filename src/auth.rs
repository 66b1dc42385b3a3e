//! Login and the in-memory session.
//!
//! A session exists only between a successful `login` and `logout`.
//! There is no token: the backend only confirms the credentials and
//! returns the user row plus role.

use std::str::FromStr;

use crate::api::error::MSG_MALFORMED;
use crate::api::{ApiError, ClinicBackend, Credentials};
use crate::models::Role;

pub const MSG_BAD_CREDENTIALS: &str = "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง";
pub const MSG_BACKEND_DOWN: &str = "ไม่สามารถเชื่อมต่อเซิร์ฟเวอร์ Back-end ได้";

/// The logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Session {
    pub name: String,
    pub role: Role,
    /// Backend account id, used as `doctor_id` for server appointments.
    pub user_id: Option<u64>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Session state unavailable")]
    SessionUnavailable,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "กรุณากรอกชื่อผู้ใช้และรหัสผ่าน".to_string(),
            AuthError::UnknownRole(role) => format!("ไม่รู้จักสิทธิ์ผู้ใช้: {role}"),
            AuthError::SessionUnavailable => "เกิดข้อผิดพลาด".to_string(),
            AuthError::Api(ApiError::Malformed { .. }) => MSG_MALFORMED.to_string(),
            AuthError::Api(e) if e.is_transport() => MSG_BACKEND_DOWN.to_string(),
            AuthError::Api(e) => e.user_message(MSG_BAD_CREDENTIALS),
        }
    }
}

/// Post credentials and build a [`Session`] from the reply.
pub async fn login<B: ClinicBackend>(
    backend: &B,
    username: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let credentials = Credentials::new(username, password);
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let reply = backend.login(&credentials).await?;
    let role = Role::from_str(&reply.role).map_err(|_| AuthError::UnknownRole(reply.role.clone()))?;

    tracing::info!(username = %credentials.username, role = role.as_str(), "Login succeeded");
    Ok(Session {
        name: reply.user.name,
        role,
        user_id: reply.user.id,
        username: credentials.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::EP_LOGIN;
    use crate::api::MockBackend;

    #[tokio::test]
    async fn doctor_login_builds_session() {
        let backend = MockBackend::new().with_account("doctor1", "1234", "Dr. Somchai", "doctor");
        let session = login(&backend, "doctor1", "1234").await.unwrap();
        assert_eq!(session.name, "Dr. Somchai");
        assert_eq!(session.role, Role::Doctor);
    }

    #[tokio::test]
    async fn wrong_password_uses_server_message() {
        let backend = MockBackend::new().with_account("doctor1", "1234", "Dr. Somchai", "doctor");
        let err = login(&backend, "doctor1", "0000").await.unwrap_err();
        assert_eq!(err.user_message(), MSG_BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_backend() {
        let backend = MockBackend::new();
        let err = login(&backend, "  ", "1234").await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials);
        assert_eq!(backend.calls(EP_LOGIN), 0);
    }

    #[tokio::test]
    async fn unknown_role_is_refused() {
        let backend = MockBackend::new().with_account("nurse1", "1234", "Nurse", "nurse");
        let err = login(&backend, "nurse1", "1234").await.unwrap_err();
        assert_eq!(err, AuthError::UnknownRole("nurse".into()));
    }

    #[tokio::test]
    async fn transport_failure_reports_backend_down() {
        let backend = MockBackend::new();
        backend.fail(
            EP_LOGIN,
            ApiError::Transport {
                endpoint: "login",
                detail: "refused".into(),
            },
        );
        let err = login(&backend, "doctor1", "1234").await.unwrap_err();
        assert_eq!(err.user_message(), MSG_BACKEND_DOWN);
    }
}
