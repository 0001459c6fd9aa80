use scatter_core::CoreError;
use scatter_storage::StorageError;
use thiserror::Error;

use crate::tier::Tier;

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("{tier} {name} not found")]
    NotFound { tier: Tier, name: String },

    #[error("{tier} {name} does not exist and creation was declined")]
    Declined { tier: Tier, name: String },

    #[error("{tier} {name} is not created by scatter; create it first")]
    CreateUnsupported { tier: Tier, name: String },

    #[error("{tier} {name}: request to backing service failed")]
    Service {
        tier: Tier,
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("{tier} {name}: creation failed")]
    CreateFailed {
        tier: Tier,
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("storage account {account}: access keys unavailable")]
    AccountKeys {
        account: String,
        #[source]
        source: StorageError,
    },
}

impl ProvisionerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Walk the full error chain and join all causes into one string.
///
/// SDK errors often have terse `Display` impls (e.g. "service error")
/// but useful detail in the source chain.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
