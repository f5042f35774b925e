//! Binary entrypoint for the `wheelpin` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; settings fall back to defaults.
    let _ = dotenvy::dotenv();
    match wheelpin::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
