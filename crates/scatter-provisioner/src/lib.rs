//! scatter-provisioner
//!
//! Create-or-reuse resolution for storage resources.
//!
//! Public API:
//! - `ensure()`: probe one tier and create it if the intent allows
//! - `provision()`: resource group → storage account → container
//! - `provision_container()`: container tier alone (S3 targets)
//!
//! Every pass re-probes every tier. Re-running after a partial failure is
//! the recovery path; nothing is rolled back.

pub mod error;
pub mod orchestrate;
pub mod resolve;
pub mod tier;
pub mod tiers;

pub use crate::error::{ProvisionerError, format_err_chain};
pub use crate::orchestrate::{
    AccessPath, FallbackDecider, FixedChoice, ProvisionRequest, Provisioned, ensure_with_fallback,
    provision, provision_container,
};
pub use crate::resolve::{Resolution, ResolveAction, ensure};
pub use crate::tier::{Tier, TierResource};
