use scatter_core::report::{Outcome, UploadResult};
use scatter_core::{PartitionConfig, PartitionPath, compute_key};
use scatter_storage::Container;

use crate::error::IngestError;
use crate::progress::ProgressSink;
use crate::source::SourceFile;

/// Where a batch lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub partition: PartitionConfig,
    /// Objects are written as `target_dir/key` when set.
    pub target_dir: Option<PartitionPath>,
}

impl UploadPlan {
    pub fn new(partition: PartitionConfig, target_dir: Option<PartitionPath>) -> Self {
        Self {
            partition,
            target_dir,
        }
    }

    fn object_path(&self, file: &SourceFile) -> Result<String, String> {
        let key = compute_key(&file.name, &self.partition).map_err(|e| e.to_string())?;
        Ok(match &self.target_dir {
            Some(dir) => key.under(dir.as_str()),
            None => key.as_str().to_string(),
        })
    }
}

/// Upload a single file. Never fails the caller; every problem becomes a
/// `Failed` result carrying the reason.
pub async fn upload_one(container: &dyn Container, file: &SourceFile, plan: &UploadPlan) -> UploadResult {
    let path = match plan.object_path(file) {
        Ok(path) => path,
        Err(reason) => return failed(file, None, reason),
    };

    let body = match file.source.read().await {
        Ok(body) => body,
        Err(e) => return failed(file, Some(path), format!("read failed: {e}")),
    };

    let bytes = body.len();
    match container.write_object(&path, body, true).await {
        Ok(()) => {
            tracing::info!(name = %file.name, key = %path, bytes, "uploaded");
            UploadResult {
                name: file.name.clone(),
                key: Some(path),
                outcome: Outcome::Succeeded,
            }
        }
        Err(e) => failed(file, Some(path), format!("write failed: {e}")),
    }
}

fn failed(file: &SourceFile, key: Option<String>, reason: String) -> UploadResult {
    tracing::warn!(name = %file.name, reason = %reason, "upload failed");
    UploadResult {
        name: file.name.clone(),
        key,
        outcome: Outcome::Failed { reason },
    }
}

/// Upload a batch in name order, one file at a time.
///
/// Results come back in the same order. Only a failure to prepare the
/// target directory returns `Err`; per-file failures are results.
pub async fn upload_all(
    container: &dyn Container,
    mut files: Vec<SourceFile>,
    plan: &UploadPlan,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<UploadResult>, IngestError> {
    files.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(dir) = &plan.target_dir {
        ensure_directory(container, dir.as_str()).await?;
    }

    let total = files.len();
    let mut results = Vec::with_capacity(total);
    for (index, file) in files.iter().enumerate() {
        results.push(upload_one(container, file, plan).await);
        progress.on_progress(index + 1, total, file.name.as_str());
    }

    let failed = results.iter().filter(|r| !r.succeeded()).count();
    tracing::info!(
        container = %container.name(),
        total,
        failed,
        "batch finished"
    );
    Ok(results)
}

/// Flat-namespace containers have no directories to create.
async fn ensure_directory(container: &dyn Container, path: &str) -> Result<(), IngestError> {
    if !container.is_hierarchical() {
        return Ok(());
    }

    let directory = |source| IngestError::Directory {
        path: path.to_string(),
        source,
    };

    if container.directory_exists(path).await.map_err(directory)? {
        tracing::debug!(path = %path, "target directory exists");
        return Ok(());
    }
    match container.create_directory(path).await {
        Ok(()) => {
            tracing::info!(path = %path, "target directory created");
            Ok(())
        }
        Err(e) if e.is_already_exists() => Ok(()),
        Err(e) => Err(directory(e)),
    }
}
