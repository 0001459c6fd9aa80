//! Per-file upload outcomes and the end-of-run summary.

use serde::Serialize;

use crate::names::ObjectName;

/// Number of destination keys quoted in a summary.
pub const SUMMARY_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub name: ObjectName,
    /// Destination path. `None` when the key could not be computed.
    pub key: Option<String>,
    pub outcome: Outcome,
}

impl UploadResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub name: ObjectName,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedUpload>,
    /// First few destination keys of successful uploads, in upload order.
    pub sample_keys: Vec<String>,
}

impl UploadSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

pub fn summarize(results: &[UploadResult]) -> UploadSummary {
    let mut summary = UploadSummary {
        total: results.len(),
        ..UploadSummary::default()
    };

    for result in results {
        match &result.outcome {
            Outcome::Succeeded => {
                summary.succeeded += 1;
                if summary.sample_keys.len() < SUMMARY_SAMPLE_SIZE
                    && let Some(key) = &result.key
                {
                    summary.sample_keys.push(key.clone());
                }
            }
            Outcome::Failed { reason } => summary.failed.push(FailedUpload {
                name: result.name.clone(),
                reason: reason.clone(),
            }),
        }
    }

    summary
}
