use std::path::{Path, PathBuf};

use scatter_core::ObjectName;

use crate::error::IngestError;

/// Where a file's bytes come from. Contents are read at upload time, so an
/// unreadable path only fails its own upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ContentSource {
    pub(crate) async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Path(path) => tokio::fs::read(path).await,
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: ObjectName,
    pub source: ContentSource,
}

impl SourceFile {
    pub fn from_bytes(name: ObjectName, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            source: ContentSource::Bytes(bytes.into()),
        }
    }
}

/// Regular files directly under `dir`, sorted by name. Symlinks to files
/// are followed.
///
/// Subdirectories are not descended into. Entries whose name is not a valid
/// object name are skipped with a warning.
pub async fn list_source_dir(dir: &Path) -> Result<Vec<SourceFile>, IngestError> {
    let source_dir = |source| IngestError::SourceDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(source_dir)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(source_dir)? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(source_dir)?;
        let is_file = if file_type.is_symlink() {
            // Follow the link; a dangling one is skipped.
            match tokio::fs::metadata(&path).await {
                Ok(meta) => meta.is_file(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping broken symlink");
                    false
                }
            }
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        let Some(raw) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            continue;
        };
        match ObjectName::new(raw) {
            Ok(name) => files.push(SourceFile {
                name,
                source: ContentSource::Path(path),
            }),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping file"),
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %dir.display(), count = files.len(), "listed source files");
    Ok(files)
}
