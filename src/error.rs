use std::io;

use thiserror::Error;

/// Errors that stop the server from starting or keep it from serving.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}
