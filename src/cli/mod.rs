//! Command line front end
//!
//! Parses arguments, loads configuration and runs one command against the
//! configured storage backend.

pub mod handlers;
pub mod parser;

pub use handlers::{execute, exit_code};
pub use parser::{Command, USAGE, parse_args};

use log::info;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::error::handlers::handle_error;
use crate::logging::setup_logging;
use crate::service::FileService;

/// Runs one command with stdin as upload body and stdout as output.
pub async fn run(args: &[String]) -> Result<(), CliError> {
    let command = parse_args(args)?;
    let config = AppConfig::load()?;
    setup_logging(&config);

    info!(
        "Starting data-keeper ({:?}, {:?} driver)",
        config.env, config.storage.driver
    );

    let service = FileService::from_config(&config.storage)?;
    let result = execute(&service, command, tokio::io::stdin(), &mut tokio::io::stdout()).await;

    if let Err(CliError::Transport(ref e)) = result {
        handle_error(e);
    }
    result
}
