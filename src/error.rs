use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode participants: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Participant name is required.")]
    BlankName,
}

pub type StoreResult<T> = Result<T, StoreError>;
