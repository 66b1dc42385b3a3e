//! Client-side API error types and their user-facing messages.

/// Shown when the request never completed (connection refused, timeout, DNS).
pub const MSG_UNREACHABLE: &str = "เชื่อมต่อเซิร์ฟเวอร์ไม่ได้";
/// Shown when the server answered with something that is not the expected shape.
pub const MSG_MALFORMED: &str = "ข้อมูลจากเซิร์ฟเวอร์ไม่ถูกต้อง";

/// Failure of one backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request did not reach the server or the body could not be read.
    #[error("Transport error on {endpoint}: {detail}")]
    Transport { endpoint: &'static str, detail: String },
    /// Non-2xx status, or a body whose `status` is not `"success"`.
    #[error("{endpoint} rejected with HTTP {status}: {}", .message.as_deref().unwrap_or("-"))]
    Rejected {
        endpoint: &'static str,
        status: u16,
        message: Option<String>,
    },
    /// 2xx response whose body does not match the endpoint schema.
    #[error("Malformed response from {endpoint}: {detail}")]
    Malformed { endpoint: &'static str, detail: String },
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Localized message for the view. Server-supplied messages win over
    /// `fallback`, which names what failed ("could not load patients").
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport { .. } | ApiError::Config(_) => MSG_UNREACHABLE.to_string(),
            ApiError::Rejected { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback)
                .to_string(),
            ApiError::Malformed { .. } => MSG_MALFORMED.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Config(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
