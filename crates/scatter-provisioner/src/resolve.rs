use scatter_core::{CreationIntent, ResourceState};
use serde::Serialize;

use crate::error::ProvisionerError;
use crate::tier::{Tier, TierResource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    /// Already present; no creation call issued.
    Reused,
    Created,
    /// Absent at probe time, but another actor created it before us.
    CreatedConcurrently,
}

/// Outcome of resolving one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub tier: Tier,
    pub name: String,
    pub state: ResourceState,
    pub action: ResolveAction,
}

/// Bring one resource to `Present` without touching an existing one.
///
/// The probe runs first, every time. A creation call is only issued for an
/// absent resource under `CreateIfAbsent`; `AlreadyExists` from that call is
/// a lost race and counts as success. Configuration differences are not
/// reconciled.
pub async fn ensure(
    resource: &dyn TierResource,
    intent: CreationIntent,
) -> Result<Resolution, ProvisionerError> {
    let tier = resource.tier();
    let name = resource.name().to_string();

    let exists = resource
        .exists()
        .await
        .map_err(|source| ProvisionerError::Service {
            tier,
            name: name.clone(),
            source,
        })?;

    let action = match (intent, exists) {
        (_, true) => {
            tracing::info!(tier = %tier, name = %name, "reusing existing resource");
            ResolveAction::Reused
        }
        (CreationIntent::UseExisting, false) => {
            return Err(ProvisionerError::NotFound { tier, name });
        }
        (CreationIntent::CreateIfAbsent, false) => {
            let Some(create) = resource.create() else {
                return Err(ProvisionerError::CreateUnsupported { tier, name });
            };

            tracing::info!(tier = %tier, name = %name, "creating resource");
            match create.await {
                Ok(()) => ResolveAction::Created,
                Err(e) if e.is_already_exists() => {
                    tracing::info!(
                        tier = %tier,
                        name = %name,
                        "resource was created concurrently, using it"
                    );
                    ResolveAction::CreatedConcurrently
                }
                Err(source) => {
                    return Err(ProvisionerError::CreateFailed { tier, name, source });
                }
            }
        }
    };

    Ok(Resolution {
        tier,
        name,
        state: ResourceState::Present,
        action,
    })
}
