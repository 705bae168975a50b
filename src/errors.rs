use pigcoin_config::ConfigError;
use pigcoin_core::CoreError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Failures that end a shell session.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
