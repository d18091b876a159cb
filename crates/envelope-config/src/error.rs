use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not access config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode config: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ConfigError::Io { path, source }
    }

    /// File the failure refers to, when there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Encode(_) | ConfigError::NoConfigDir => None,
        }
    }
}
