use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Clinic Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend base URL used when no override is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Per-request timeout, so a hung request cannot pin a loading flag.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "CLINIC_DESK_API_URL";
const ENV_TIMEOUT: &str = "CLINIC_DESK_TIMEOUT_SECS";
const ENV_EXPORTS_DIR: &str = "CLINIC_DESK_EXPORTS_DIR";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "clinic_desk=info,warn"
}

/// Connection settings for the clinic backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    /// Build from `CLINIC_DESK_API_URL` / `CLINIC_DESK_TIMEOUT_SECS`,
    /// falling back to the compiled-in defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_secs = match lookup(ENV_TIMEOUT) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid {ENV_TIMEOUT}");
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(base_url.trim(), timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS)
    }
}

/// Get the application data directory (~/ClinicDesk/).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ClinicDesk")
}

/// Directory printed reports are written to.
pub fn exports_dir() -> PathBuf {
    match std::env::var(ENV_EXPORTS_DIR) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => app_data_dir().join("exports"),
    }
}
