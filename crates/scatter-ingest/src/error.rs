use std::path::PathBuf;

use scatter_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source directory {path:?} is not readable")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not prepare target directory {path}")]
    Directory {
        path: String,
        #[source]
        source: StorageError,
    },
}
