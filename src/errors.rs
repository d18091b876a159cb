use thiserror::Error;

use envelope_config::ConfigError;
use envelope_core::CoreError;

/// Error type for session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid balance payload: {0}")]
    Decode(#[from] serde_json::Error),
}
