//! scatter-core
//!
//! Pure domain types: naming rules, hash-prefix key partitioning, data-lake
//! partition paths, creation intents and upload summaries.
//! No SDK or filesystem dependency.

pub mod config;
pub mod error;
pub mod intent;
pub mod lake_path;
pub mod names;
pub mod partition;
pub mod report;

pub use crate::error::CoreError;
pub use crate::intent::{CreationIntent, IntentDecision, ResourceState, UserChoice, resolve_intent};
pub use crate::lake_path::{PartitionPath, build_path};
pub use crate::names::{ObjectName, ResourceDescriptor};
pub use crate::partition::{HashAlgorithm, PartitionConfig, PrefixScheme, StorageKey, compute_key};
pub use crate::report::{Outcome, UploadResult, UploadSummary, summarize};
