//! Logging setup
//!
//! `env_logger` on stderr; `RUST_LOG` overrides the configured level.

use env_logger::Env;

use crate::config::AppConfig;

/// Setup logging for the process
pub fn setup_logging(config: &AppConfig) {
    let env = Env::default().default_filter_or(config.log_level());
    // A second call (e.g. from tests) keeps the first logger.
    let _ = env_logger::Builder::from_env(env).try_init();
}
