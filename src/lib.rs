pub mod api;
pub mod app_state;
pub mod auth;
pub mod collections;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod directory;
pub mod forms;
pub mod models;
pub mod record_cache;
pub mod report;
pub mod search;
pub mod shell;

use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiError, ClinicBackend, HttpBackend, MockBackend};
use crate::app_state::AppState;
use crate::config::ClientConfig;
use crate::report::FilePrintSurface;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Backend client: {0}")]
    Client(#[from] ApiError),
    #[error("Terminal I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Start options parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Use the in-memory demo clinic instead of the HTTP backend.
    pub offline: bool,
}

impl Options {
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        Self {
            offline: args.into_iter().any(|a| a == "--offline"),
        }
    }
}

pub fn init_tracing() {
    // Logs go to stderr so they never interleave with shell output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run(options: Options) -> Result<(), StartupError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if options.offline {
        tracing::info!("Offline mode: using the demo clinic");
        serve(MockBackend::demo()).await
    } else {
        let client_config = ClientConfig::from_env();
        tracing::info!(base_url = %client_config.base_url, "Using clinic backend");
        serve(HttpBackend::new(&client_config)?).await
    }
}

async fn serve<B: ClinicBackend>(backend: B) -> Result<(), StartupError> {
    let surface = FilePrintSurface::from_config();
    tracing::debug!(dir = %surface.dir().display(), "Print surface ready");

    let state = Arc::new(AppState::new(Arc::new(backend), Arc::new(surface)));
    let shell = shell::Shell::new(state);

    println!("{}", commands::app_info().banner());
    shell::run(&shell, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}
