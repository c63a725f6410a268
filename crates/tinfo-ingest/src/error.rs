use thiserror::Error;
use tinfo_core::ConfigError;
use tinfo_db::DbError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("fetch failed for {target}: {message}")]
    Fetch { target: String, message: String },

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("post {0} is already stored")]
    DuplicateKey(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DbError> for IngestError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateShortcode(shortcode) => IngestError::DuplicateKey(shortcode),
            e if e.is_unavailable() => IngestError::StorageUnavailable(e.to_string()),
            e => IngestError::Storage(e.to_string()),
        }
    }
}
