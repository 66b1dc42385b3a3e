use std::process::ExitCode;

use clinic_desk::Options;

#[tokio::main]
async fn main() -> ExitCode {
    let options = Options::from_args(std::env::args().skip(1));
    match clinic_desk::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Clinic Desk stopped");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
