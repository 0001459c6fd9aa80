use scatter_storage::service::BoxFuture;
use scatter_storage::{AccountParams, ManagementPlane, StorageError};

use crate::tier::{Tier, TierResource};

pub struct StorageAccountResource<'a> {
    plane: &'a dyn ManagementPlane,
    group: &'a str,
    account: &'a str,
    params: &'a AccountParams,
}

impl<'a> StorageAccountResource<'a> {
    pub fn new(
        plane: &'a dyn ManagementPlane,
        group: &'a str,
        account: &'a str,
        params: &'a AccountParams,
    ) -> Self {
        Self {
            plane,
            group,
            account,
            params,
        }
    }
}

impl TierResource for StorageAccountResource<'_> {
    fn tier(&self) -> Tier {
        Tier::StorageAccount
    }

    fn name(&self) -> &str {
        self.account
    }

    fn exists(&self) -> BoxFuture<'_, Result<bool, StorageError>> {
        self.plane.account_exists(self.group, self.account)
    }

    fn create(&self) -> Option<BoxFuture<'_, Result<(), StorageError>>> {
        Some(Box::pin(async move {
            self.plane
                .create_account(self.group, self.account, self.params)
                .await?;
            tracing::info!(
                account = %self.account,
                location = %self.params.location,
                sku = %self.params.sku,
                hierarchical_namespace = self.params.hierarchical_namespace,
                "storage account created"
            );
            Ok(())
        }))
    }
}
