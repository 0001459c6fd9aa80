//! Filesystem-emulated cloud.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<group>/                         resource group (created out-of-band)
//! <root>/<group>/<account>/account.json   storage account record + keys
//! <root>/<group>/<account>/<container>/   container
//! <root>/<group>/<account>/<container>/<key>
//! ```
//!
//! Useful for dry runs and integration tests; it enforces the same
//! create-vs-exists and key-auth behavior a real provider does.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::service::{
    AccountKey, AccountParams, BoxFuture, Container, ContainerParams, DataCredential, DataPlane,
    ManagementPlane, validate_object_key,
};

const ACCOUNT_RECORD: &str = "account.json";

#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    params: AccountParams,
    keys: Vec<AccountKey>,
}

pub struct LocalCloud {
    root: PathBuf,
}

impl LocalCloud {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a resource group directory. Resource groups are never created
    /// by a provisioning pass; this exists for setup scripts and tests.
    pub async fn create_resource_group(&self, group: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(self.root.join(group)).await?;
        Ok(())
    }

    fn account_dir(&self, group: &str, account: &str) -> PathBuf {
        self.root.join(group).join(account)
    }
}

async fn is_dir(path: &Path) -> Result<bool, StorageError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::Io(e)),
    }
}

async fn read_record(account_dir: &Path) -> Result<AccountRecord, StorageError> {
    match tokio::fs::read(account_dir.join(ACCOUNT_RECORD)).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(format!(
            "storage account {}",
            account_dir.display()
        ))),
        Err(e) => Err(StorageError::Io(e)),
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::InvalidKey {
            key: path.display().to_string(),
            reason: "no file name".into(),
        })?;
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));
    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

fn generate_key(name: &str) -> AccountKey {
    AccountKey {
        name: name.to_string(),
        value: hex::encode(rand::random::<[u8; 32]>()),
    }
}

impl ManagementPlane for LocalCloud {
    fn resource_group_exists<'a>(&'a self, group: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move { is_dir(&self.root.join(group)).await })
    }

    fn account_exists<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            let record = self.account_dir(group, account).join(ACCOUNT_RECORD);
            Ok(tokio::fs::try_exists(&record).await?)
        })
    }

    fn create_account<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
        params: &'a AccountParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            if !is_dir(&self.root.join(group)).await? {
                return Err(StorageError::NotFound(format!("resource group {group}")));
            }

            let dir = self.account_dir(group, account);
            if let Err(e) = tokio::fs::create_dir(&dir).await {
                if e.kind() != ErrorKind::AlreadyExists {
                    return Err(StorageError::Io(e));
                }
                // A directory without a record is a half-finished create; finish it.
                if tokio::fs::try_exists(dir.join(ACCOUNT_RECORD)).await? {
                    return Err(StorageError::AlreadyExists(format!("storage account {account}")));
                }
            }

            let record = AccountRecord {
                params: params.clone(),
                keys: vec![generate_key("key1"), generate_key("key2")],
            };
            write_atomic(&dir.join(ACCOUNT_RECORD), &serde_json::to_vec_pretty(&record)?).await?;

            tracing::debug!(path = %dir.display(), "local storage account written");
            Ok(())
        })
    }

    fn list_account_keys<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AccountKey>, StorageError>> {
        Box::pin(async move { Ok(read_record(&self.account_dir(group, account)).await?.keys) })
    }

    fn data_plane(
        &self,
        group: &str,
        account: &str,
        credential: DataCredential,
    ) -> Result<Arc<dyn DataPlane>, StorageError> {
        Ok(Arc::new(LocalDataPlane {
            account: account.to_string(),
            dir: self.account_dir(group, account),
            credential,
        }))
    }
}

pub struct LocalDataPlane {
    account: String,
    dir: PathBuf,
    credential: DataCredential,
}

impl LocalDataPlane {
    /// Check the bound credential against the account record.
    async fn authorize(&self) -> Result<AccountRecord, StorageError> {
        let record = read_record(&self.dir).await?;
        self.check_credential(&record)?;
        Ok(record)
    }

    fn check_credential(&self, record: &AccountRecord) -> Result<(), StorageError> {
        if let DataCredential::AccountKey(key) = &self.credential
            && !record.keys.iter().any(|k| k.value == key.value)
        {
            return Err(StorageError::Unauthorized(format!(
                "key {} is not valid for account {}",
                key.name, self.account
            )));
        }
        Ok(())
    }
}

impl DataPlane for LocalDataPlane {
    fn container_exists<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.authorize().await?;
            is_dir(&self.dir.join(container)).await
        })
    }

    fn create_container<'a>(
        &'a self,
        container: &'a str,
        _params: &'a ContainerParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.authorize().await?;
            match tokio::fs::create_dir(self.dir.join(container)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    Err(StorageError::AlreadyExists(format!("container {container}")))
                }
                Err(e) => Err(StorageError::Io(e)),
            }
        })
    }

    // Opening is synchronous, so the account record is read with std::fs.
    // The record is a few hundred bytes.
    fn open_container(&self, container: &str) -> Result<Arc<dyn Container>, StorageError> {
        let bytes = std::fs::read(self.dir.join(ACCOUNT_RECORD))?;
        let record: AccountRecord = serde_json::from_slice(&bytes)?;
        self.check_credential(&record)?;
        Ok(Arc::new(LocalContainer {
            name: container.to_string(),
            dir: self.dir.join(container),
            hierarchical: record.params.hierarchical_namespace,
        }))
    }
}

pub struct LocalContainer {
    name: String,
    dir: PathBuf,
    hierarchical: bool,
}

impl Container for LocalContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_hierarchical(&self) -> bool {
        self.hierarchical
    }

    fn directory_exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            is_dir(&self.dir.join(path)).await
        })
    }

    fn create_directory<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            let dir = self.dir.join(path);
            if is_dir(&dir).await? {
                return Err(StorageError::AlreadyExists(format!("directory {path}")));
            }
            tokio::fs::create_dir_all(&dir).await?;
            Ok(())
        })
    }

    fn write_object<'a>(
        &'a self,
        key: &'a str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(key)?;
            let path = self.dir.join(key);
            if !overwrite && tokio::fs::try_exists(&path).await? {
                return Err(StorageError::AlreadyExists(format!("object {key}")));
            }
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            write_atomic(&path, &body).await?;
            tracing::debug!(container = %self.name, key = %key, bytes = body.len(), "object written");
            Ok(())
        })
    }
}
