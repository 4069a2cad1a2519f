//! data-keeper - Entry Point
//!
//! Command line access to a sandboxed blob store.

use std::process::ExitCode;

use data_keeper::cli;
use data_keeper::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match cli::run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("data-keeper: {}", e);
            if matches!(e, CliError::Usage(_)) {
                eprintln!("{}", cli::USAGE);
            }
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
