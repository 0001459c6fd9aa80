//! Azure Blob Storage data plane. The storage account is fixed when the
//! client is built; containers (file systems on an HNS account) are the only
//! tier managed here.
//!
//! Directories on a hierarchical-namespace account are created by writing an
//! empty blob flagged with `hdi_isfolder`, which the service turns into a
//! real directory. Parent directories are created implicitly.

use std::sync::Arc;

use azure_core::request_options::{IfMatchCondition, Metadata};
use azure_storage::{ConnectionString, StorageCredentials};
use azure_storage_blobs::prelude::{BlobServiceClient, ContainerClient, PublicAccess};
use bytes::Bytes;

use crate::error::StorageError;
use crate::service::{BoxFuture, Container, ContainerParams, DataCredential, DataPlane, validate_object_key};

const FOLDER_MARKER: &str = "hdi_isfolder";

/// How the client authenticates.
#[derive(Debug, Clone)]
pub enum AzureAuth {
    /// A full connection string. Its `AccountName` wins over the configured
    /// account.
    ConnectionString(String),
    Credential(DataCredential),
}

pub struct AzureDataPlane {
    service: BlobServiceClient,
    account: String,
    hierarchical: bool,
}

impl AzureDataPlane {
    /// Build a client for `account`. Nothing is sent until the first call.
    pub fn connect(account: &str, auth: AzureAuth, hierarchical: bool) -> Result<Self, StorageError> {
        let (account, credentials) = match auth {
            AzureAuth::ConnectionString(raw) => {
                let parsed = ConnectionString::new(&raw).map_err(|e| {
                    StorageError::Unauthorized(format!("invalid connection string: {e}"))
                })?;
                let Some(named) = parsed.account_name else {
                    return Err(StorageError::Unauthorized(
                        "connection string has no AccountName".into(),
                    ));
                };
                if named != account {
                    tracing::warn!(
                        configured = %account,
                        connection_string = %named,
                        "connection string names a different storage account; using it"
                    );
                }
                let credentials = parsed.storage_credentials().map_err(|e| {
                    StorageError::Unauthorized(format!("connection string credentials: {e}"))
                })?;
                (named.to_string(), credentials)
            }
            AzureAuth::Credential(DataCredential::AccountKey(key)) => (
                account.to_string(),
                StorageCredentials::access_key(account.to_string(), key.value),
            ),
            AzureAuth::Credential(DataCredential::Ambient) => {
                let credential = azure_identity::create_credential().map_err(|e| {
                    StorageError::Unauthorized(format!("default Azure credential: {e}"))
                })?;
                (account.to_string(), StorageCredentials::token_credential(credential))
            }
        };

        tracing::debug!(account = %account, hierarchical, "Azure blob client built");
        Ok(Self {
            service: BlobServiceClient::new(account.clone(), credentials),
            account,
            hierarchical,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

fn http_status(err: &azure_core::Error) -> Option<u16> {
    err.as_http_error().map(|e| e.status() as u16)
}

/// Map a service error. `what` names the resource for the message.
fn map_error(err: azure_core::Error, what: &str) -> StorageError {
    match http_status(&err) {
        Some(401 | 403) => StorageError::Unauthorized(format!("{what}: {err}")),
        Some(404) => StorageError::NotFound(what.to_string()),
        Some(409 | 412) => StorageError::AlreadyExists(what.to_string()),
        Some(status) if status >= 500 => StorageError::Unavailable(format!("{what}: {err}")),
        Some(_) => StorageError::Azure(format!("{what}: {err}")),
        // No response at all: transport or credential acquisition failed.
        None => StorageError::Unavailable(format!("{what}: {err}")),
    }
}

impl DataPlane for AzureDataPlane {
    fn container_exists<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            self.service
                .container_client(container)
                .exists()
                .await
                .map_err(|e| map_error(e, &format!("container {container}")))
        })
    }

    fn create_container<'a>(
        &'a self,
        container: &'a str,
        _params: &'a ContainerParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            // Anonymous access is never granted.
            self.service
                .container_client(container)
                .create()
                .public_access(PublicAccess::None)
                .await
                .map_err(|e| map_error(e, &format!("container {container}")))?;

            tracing::info!(account = %self.account, container = %container, "Azure container created");
            Ok(())
        })
    }

    fn open_container(&self, container: &str) -> Result<Arc<dyn Container>, StorageError> {
        Ok(Arc::new(AzureContainer {
            client: self.service.container_client(container),
            name: container.to_string(),
            hierarchical: self.hierarchical,
        }))
    }
}

pub struct AzureContainer {
    client: ContainerClient,
    name: String,
    hierarchical: bool,
}

impl Container for AzureContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_hierarchical(&self) -> bool {
        self.hierarchical
    }

    fn directory_exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            if !self.hierarchical {
                return Ok(true);
            }
            self.client
                .blob_client(path)
                .exists()
                .await
                .map_err(|e| map_error(e, &format!("directory {path}")))
        })
    }

    fn create_directory<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            if !self.hierarchical {
                return Ok(());
            }

            let mut metadata = Metadata::new();
            metadata.insert(FOLDER_MARKER, "true");
            self.client
                .blob_client(path)
                .put_block_blob(Bytes::new())
                .metadata(metadata)
                .if_match(IfMatchCondition::NotMatch("*".into()))
                .await
                .map_err(|e| map_error(e, &format!("directory {path}")))?;

            tracing::debug!(container = %self.name, path = %path, "Azure directory created");
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
            let mut req = self.client.blob_client(key).put_block_blob(Bytes::from(body));
            if !overwrite {
                req = req.if_match(IfMatchCondition::NotMatch("*".into()));
            }

            req.await.map_err(|e| match map_error(e, &format!("object {key}")) {
                StorageError::Azure(reason) => StorageError::WriteRejected {
                    key: key.to_string(),
                    reason,
                },
                other => other,
            })?;
            Ok(())
        })
    }
}
