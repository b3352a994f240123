//! Error taxonomy shared by the volume controller, the coordinator and the relays

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for a single invocation
///
/// Backend output that cannot be parsed is not an error: it is logged and
/// turned into an absent reading instead.
#[derive(Error, Debug)]
pub enum VolumenError {
    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Coordination file {path} could not be {action}: {source}")]
    Coordination {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Desktop notification failed: {0}")]
    Notification(String),

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, VolumenError>;

impl VolumenError {
    pub(crate) fn coordination(
        path: impl Into<PathBuf>,
        action: &'static str,
        source: std::io::Error,
    ) -> Self {
        VolumenError::Coordination {
            path: path.into(),
            action,
            source,
        }
    }
}
