use std::process::ExitCode;

use clap::Parser;

use ar_cli::commands::exec::{self, ExecArgs};

fn main() -> ExitCode {
    if let Err(e) = ar_cli::init_tracing() {
        eprintln!("failed to initialise logging: {:#}", e);
    }
    let args = ExecArgs::parse();

    let outcome =
        exec::read_payload(args.payload.as_deref()).and_then(|input| exec::execute(&args, &input));
    match outcome {
        Ok(output) => {
            println!("{}", output.to_json());
            ExitCode::from(output.exit_code())
        }
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::error!(error = %message, "task could not start");
            println!("{}", exec::error_json(&message));
            ExitCode::from(1)
        }
    }
}
