//! scatter-ingest
//!
//! Batch upload of local files into a provisioned container under
//! hash-partitioned keys.
//!
//! Files are processed one at a time in name order. A failing file is
//! recorded and the batch moves on; only the target-directory step can
//! abort a batch.

pub mod error;
pub mod progress;
pub mod source;
pub mod upload;

pub use crate::error::IngestError;
pub use crate::progress::{NoProgress, ProgressSink};
pub use crate::source::{ContentSource, SourceFile, list_source_dir};
pub use crate::upload::{UploadPlan, upload_all, upload_one};
