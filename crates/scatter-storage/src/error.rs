use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Returned by create calls when the target already exists. The resolver
    /// treats this as success.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backing service could not be reached or answered with a server
    /// error. Never means "absent".
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("write rejected for {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 HeadBucket error: {0}")]
    HeadBucket(String),

    #[error("S3 CreateBucket error: {0}")]
    CreateBucket(String),

    #[error("S3 PutPublicAccessBlock error: {0}")]
    PutPublicAccessBlock(String),

    #[error("S3 PutObject error: {0}")]
    PutObject(String),

    #[error("Azure storage error: {0}")]
    Azure(String),
}

impl StorageError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
