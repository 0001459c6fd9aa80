use scatter_storage::service::BoxFuture;
use scatter_storage::{ManagementPlane, StorageError};

use crate::tier::{Tier, TierResource};

/// Resource groups are a precondition: probed, never created.
pub struct ResourceGroupResource<'a> {
    plane: &'a dyn ManagementPlane,
    group: &'a str,
}

impl<'a> ResourceGroupResource<'a> {
    pub fn new(plane: &'a dyn ManagementPlane, group: &'a str) -> Self {
        Self { plane, group }
    }
}

impl TierResource for ResourceGroupResource<'_> {
    fn tier(&self) -> Tier {
        Tier::ResourceGroup
    }

    fn name(&self) -> &str {
        self.group
    }

    fn exists(&self) -> BoxFuture<'_, Result<bool, StorageError>> {
        self.plane.resource_group_exists(self.group)
    }

    fn create(&self) -> Option<BoxFuture<'_, Result<(), StorageError>>> {
        None
    }
}
