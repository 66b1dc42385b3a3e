//! Command layer.
//!
//! Every command takes the shared [`AppState`] and returns
//! `Result<T, String>` where the error is the localized message a front-end
//! shows as-is. Views are serializable so a webview shell can pass them
//! straight through.

pub mod doctor;
pub mod owner;
pub mod session;
pub mod staff;

use std::str::FromStr;

use serde::Serialize;

use crate::config;
use crate::directory::LoadState;
use crate::models::Keyed;

#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl AppInfo {
    /// First line the shell prints.
    pub fn banner(&self) -> String {
        format!("{} v{} (help = คำสั่งทั้งหมด)", self.name, self.version)
    }
}

pub fn app_info() -> AppInfo {
    AppInfo {
        name: config::APP_NAME,
        version: config::APP_VERSION,
    }
}

/// A successful local or remote write plus the confirmation text.
#[derive(Debug, Clone, Serialize)]
pub struct Saved<T> {
    pub message: &'static str,
    pub item: T,
}

impl<T> Saved<T> {
    pub fn new(message: &'static str, item: T) -> Self {
        Self { message, item }
    }
}

/// A remote list as a view renders it: spinner, error line, rows.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub rows: Vec<T>,
}

impl<T: Clone> ListView<T> {
    /// Rows straight from the load state.
    pub fn from_state(state: &LoadState<Vec<T>>) -> Self {
        Self::with_rows(state, state.items().to_vec())
    }

    /// Load flags from `state`, rows already filtered by the caller.
    pub fn with_rows<S>(state: &LoadState<S>, rows: Vec<T>) -> Self {
        Self {
            loading: state.is_loading(),
            error: state.error().map(str::to_string),
            rows,
        }
    }
}

/// Parse a tab or enum argument given by key or label. The error lists
/// the accepted keys.
pub(crate) fn parse_arg<T: Keyed + FromStr>(kind: &str, value: &str) -> Result<T, String> {
    T::from_str(value).map_err(|_| format!("ไม่รู้จัก{kind}: {value} (ใช้ได้: {})", T::keys()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffTab;

    #[test]
    fn list_view_of_failed_state_is_empty_with_error() {
        let state: LoadState<Vec<u32>> = LoadState::Failed("โหลดไม่สำเร็จ".into());
        let view = ListView::from_state(&state);
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some("โหลดไม่สำเร็จ"));
        assert!(view.rows.is_empty());
    }

    #[test]
    fn parse_arg_accepts_key_and_label() {
        assert_eq!(parse_arg::<StaffTab>("แท็บ", "payment"), Ok(StaffTab::Payment));
        assert_eq!(parse_arg::<StaffTab>("แท็บ", "ชำระเงิน"), Ok(StaffTab::Payment));
        let err = parse_arg::<StaffTab>("แท็บ", "lab").unwrap_err();
        assert_eq!(
            err,
            "ไม่รู้จักแท็บ: lab (ใช้ได้: patients, appointments, payment)"
        );
    }

    #[test]
    fn banner_names_app_and_version() {
        let banner = app_info().banner();
        assert!(banner.starts_with(config::APP_NAME));
        assert!(banner.contains(config::APP_VERSION));
    }
}
