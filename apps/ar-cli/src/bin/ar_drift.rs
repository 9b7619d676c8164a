use std::process::ExitCode;

use clap::Parser;

use ar_cli::commands::drift::{self, DriftArgs};

fn main() -> ExitCode {
    if let Err(e) = ar_cli::init_tracing() {
        eprintln!("failed to initialise logging: {:#}", e);
    }
    let args = DriftArgs::parse();

    let mut stdout = std::io::stdout().lock();
    match drift::execute(&args, &mut stdout) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "drift run failed");
            eprintln!("drift detection failed: {}", message);
            ExitCode::from(drift::FAILURE_EXIT_CODE)
        }
    }
}
