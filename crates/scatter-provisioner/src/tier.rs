use std::fmt;

use scatter_storage::StorageError;
use scatter_storage::service::BoxFuture;
use serde::{Deserialize, Serialize};

/// Provisioning tiers, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    ResourceGroup,
    StorageAccount,
    Container,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::ResourceGroup => "resource group",
            Self::StorageAccount => "storage account",
            Self::Container => "container",
        })
    }
}

/// One resource the resolver can probe and, where supported, create.
///
/// Each tier (resource group, storage account, container) implements this
/// trait over its backing operations. Methods return boxed futures for dyn
/// compatibility.
pub trait TierResource: Send + Sync {
    fn tier(&self) -> Tier;

    /// The resource name, whether or not it exists yet.
    fn name(&self) -> &str;

    /// Read-only existence probe.
    fn exists(&self) -> BoxFuture<'_, Result<bool, StorageError>>;

    /// Issue the creation call. `None` when this tier is never created by
    /// scatter. The call may return `AlreadyExists` if another actor won.
    fn create(&self) -> Option<BoxFuture<'_, Result<(), StorageError>>>;
}
