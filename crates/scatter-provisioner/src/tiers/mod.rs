pub mod container;
pub mod resource_group;
pub mod storage_account;

pub use container::ContainerResource;
pub use resource_group::ResourceGroupResource;
pub use storage_account::StorageAccountResource;
