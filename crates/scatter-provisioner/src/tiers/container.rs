use scatter_storage::service::BoxFuture;
use scatter_storage::{ContainerParams, DataPlane, StorageError};

use crate::tier::{Tier, TierResource};

/// A container (blob container, ADLS filesystem, or S3 bucket).
pub struct ContainerResource<'a> {
    plane: &'a dyn DataPlane,
    container: &'a str,
    params: &'a ContainerParams,
}

impl<'a> ContainerResource<'a> {
    pub fn new(plane: &'a dyn DataPlane, container: &'a str, params: &'a ContainerParams) -> Self {
        Self {
            plane,
            container,
            params,
        }
    }
}

impl TierResource for ContainerResource<'_> {
    fn tier(&self) -> Tier {
        Tier::Container
    }

    fn name(&self) -> &str {
        self.container
    }

    fn exists(&self) -> BoxFuture<'_, Result<bool, StorageError>> {
        self.plane.container_exists(self.container)
    }

    fn create(&self) -> Option<BoxFuture<'_, Result<(), StorageError>>> {
        Some(self.plane.create_container(self.container, self.params))
    }
}
