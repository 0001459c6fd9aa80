use thiserror::Error;

/// Pre-flight validation failures. Everything here is detected before any
/// network call and is fatal for the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("invalid partition date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("partition depth is 0 but unpartitioned keys are not allowed")]
    ZeroDepth,

    #[error("{field} must be at least 1")]
    ZeroWidth { field: &'static str },

    #[error("hash prefix needs {requested} hex characters but {algorithm} only has {available}")]
    PrefixTooLong {
        algorithm: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
