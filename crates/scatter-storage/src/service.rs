//! The backing object store, as the rest of scatter sees it.
//!
//! Three layers, each reached through the one above it:
//!
//! - [`ManagementPlane`]: resource groups and storage accounts.
//! - [`DataPlane`]: containers inside one account, bound to a credential.
//! - [`Container`]: directories and object writes inside one container.
//!
//! Methods return boxed futures for dyn compatibility. Create methods return
//! [`StorageError::AlreadyExists`] when the target exists; they are not
//! assumed idempotent by the backend.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Parameters for a new storage account. Ignored when the account exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountParams {
    pub location: String,
    pub sku: String,
    pub kind: String,
    pub hierarchical_namespace: bool,
    pub minimum_tls_version: String,
    pub allow_blob_public_access: bool,
}

impl Default for AccountParams {
    fn default() -> Self {
        Self {
            location: "eastus".into(),
            sku: "Standard_LRS".into(),
            kind: "StorageV2".into(),
            hierarchical_namespace: true,
            minimum_tls_version: "TLS1_2".into(),
            allow_blob_public_access: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicAccess {
    #[default]
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerParams {
    pub public_access: PublicAccess,
}

/// An account access key as returned by the management plane.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    pub name: String,
    pub value: String,
}

impl std::fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKey")
            .field("name", &self.name)
            .field("value", &"****")
            .finish()
    }
}

/// How the data plane authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataCredential {
    AccountKey(AccountKey),
    /// Whatever the environment provides (managed identity, CLI login, ...).
    Ambient,
}

pub trait ManagementPlane: Send + Sync {
    /// Read-only probe. Errs (rather than returning `false`) when the service
    /// cannot be reached.
    fn resource_group_exists<'a>(&'a self, group: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn account_exists<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn create_account<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
        params: &'a AccountParams,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn list_account_keys<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AccountKey>, StorageError>>;

    /// Bind a data-plane client to one account. Credentials are checked on
    /// first use, not here.
    fn data_plane(
        &self,
        group: &str,
        account: &str,
        credential: DataCredential,
    ) -> Result<Arc<dyn DataPlane>, StorageError>;
}

pub trait DataPlane: Send + Sync {
    fn container_exists<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    fn create_container<'a>(
        &'a self,
        container: &'a str,
        params: &'a ContainerParams,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Handle to an existing container. Does not probe.
    fn open_container(&self, container: &str) -> Result<Arc<dyn Container>, StorageError>;
}

pub trait Container: Send + Sync {
    fn name(&self) -> &str;

    /// True when directories are real entities (hierarchical namespace).
    fn is_hierarchical(&self) -> bool;

    fn directory_exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool, StorageError>>;

    /// Create `path` and any missing parents. `AlreadyExists` when `path`
    /// itself exists.
    fn create_directory<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Write `body` to `key`. With `overwrite` an existing object is
    /// replaced; without it an existing object is `AlreadyExists`.
    fn write_object<'a>(
        &'a self,
        key: &'a str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Reject keys that could escape a container when mapped onto a filesystem.
pub fn validate_object_key(key: &str) -> Result<(), StorageError> {
    let reason = if key.is_empty() {
        Some("must not be empty")
    } else if key.starts_with('/') {
        Some("must be relative")
    } else if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        Some("must not contain empty, '.' or '..' segments")
    } else if key.contains('\\') {
        Some("must not contain backslashes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StorageError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
