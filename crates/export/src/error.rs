use thiserror::Error;

/// Errors raised while writing artifacts to disk.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to move '{path}' into place: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
