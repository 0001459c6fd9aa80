//! scatter-storage
//!
//! The backing object store behind three traits, plus the backends that
//! implement them: a filesystem-emulated cloud, an in-memory double, S3 and
//! Azure Blob Storage.

pub mod azure;
pub mod error;
pub mod local;
pub mod memory;
pub mod s3;
pub mod service;

pub use crate::error::StorageError;
pub use crate::service::{
    AccountKey, AccountParams, Container, ContainerParams, DataCredential, DataPlane,
    ManagementPlane, PublicAccess,
};
