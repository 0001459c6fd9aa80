use std::sync::Arc;

use scatter_core::config::KeyFallback;
use scatter_core::{
    CreationIntent, IntentDecision, ResourceDescriptor, ResourceState, UserChoice, resolve_intent,
};
use scatter_storage::{
    AccountParams, Container, ContainerParams, DataCredential, DataPlane, ManagementPlane,
    StorageError,
};
use serde::Serialize;

use crate::error::ProvisionerError;
use crate::resolve::{Resolution, ensure};
use crate::tier::{Tier, TierResource};
use crate::tiers::{ContainerResource, ResourceGroupResource, StorageAccountResource};

/// Asked when a tier resolved under `UseExisting` turns out to be absent.
///
/// The CLI implements this with a terminal prompt or a fixed policy; the
/// resolver only ever sees the returned choice.
pub trait FallbackDecider: Send + Sync {
    fn on_missing(&self, tier: Tier, name: &str) -> UserChoice;
}

/// A decider that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub UserChoice);

impl FallbackDecider for FixedChoice {
    fn on_missing(&self, _tier: Tier, _name: &str) -> UserChoice {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub descriptor: ResourceDescriptor,
    pub account_intent: CreationIntent,
    pub container_intent: CreationIntent,
    pub account_params: AccountParams,
    pub container_params: ContainerParams,
    pub key_fallback: KeyFallback,
}

/// How the data plane ended up authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessPath {
    AccountKey { key_name: String },
    /// Key listing failed and the configuration allowed the downgrade.
    Ambient { reason: String },
}

pub struct Provisioned {
    pub container: Arc<dyn Container>,
    /// One entry per tier, in resolution order.
    pub resolutions: Vec<Resolution>,
    /// `None` for targets without an account tier.
    pub access: Option<AccessPath>,
}

/// Resolve group → account → keys → container and hand back a ready
/// container handle.
///
/// A failure at any tier aborts the remaining tiers. Nothing already created
/// is rolled back; the next run picks up where this one stopped.
pub async fn provision(
    plane: &dyn ManagementPlane,
    request: &ProvisionRequest,
    decider: &dyn FallbackDecider,
) -> Result<Provisioned, ProvisionerError> {
    let descriptor = &request.descriptor;
    let group = descriptor.resource_group();
    let account = descriptor.account();
    let mut resolutions = Vec::with_capacity(3);

    let group_resource = ResourceGroupResource::new(plane, group);
    resolutions.push(ensure(&group_resource, CreationIntent::UseExisting).await?);

    let account_resource = StorageAccountResource::new(plane, group, account, &request.account_params);
    resolutions.push(ensure_with_fallback(&account_resource, request.account_intent, decider).await?);

    let (credential, access) = account_access(plane, group, account, request.key_fallback).await?;
    let data_plane = plane
        .data_plane(group, account, credential)
        .map_err(|source| ProvisionerError::Service {
            tier: Tier::StorageAccount,
            name: account.to_string(),
            source,
        })?;

    let (container, resolution) = provision_container(
        data_plane.as_ref(),
        descriptor.container(),
        request.container_intent,
        &request.container_params,
        decider,
    )
    .await?;
    resolutions.push(resolution);

    tracing::info!(
        resource_group = %group,
        account = %account,
        container = %container.name(),
        "storage ready"
    );

    Ok(Provisioned {
        container,
        resolutions,
        access: Some(access),
    })
}

/// Run the container tier alone, for targets that have no group or account
/// tier (S3) or whose account is already resolved.
pub async fn provision_container(
    data_plane: &dyn DataPlane,
    container: &str,
    intent: CreationIntent,
    params: &ContainerParams,
    decider: &dyn FallbackDecider,
) -> Result<(Arc<dyn Container>, Resolution), ProvisionerError> {
    let resource = ContainerResource::new(data_plane, container, params);
    let resolution = ensure_with_fallback(&resource, intent, decider).await?;

    let handle = data_plane
        .open_container(container)
        .map_err(|source| ProvisionerError::Service {
            tier: Tier::Container,
            name: container.to_string(),
            source,
        })?;

    Ok((handle, resolution))
}

/// [`ensure`], with a second chance when `UseExisting` finds nothing.
pub async fn ensure_with_fallback(
    resource: &dyn TierResource,
    intent: CreationIntent,
    decider: &dyn FallbackDecider,
) -> Result<Resolution, ProvisionerError> {
    match ensure(resource, intent).await {
        Err(ProvisionerError::NotFound { tier, name }) => {
            let choice = decider.on_missing(tier, &name);
            match resolve_intent(choice, ResourceState::Absent) {
                IntentDecision::Proceed(CreationIntent::CreateIfAbsent) => {
                    tracing::info!(tier = %tier, name = %name, "not found, falling back to creation");
                    ensure(resource, CreationIntent::CreateIfAbsent).await
                }
                IntentDecision::Proceed(CreationIntent::UseExisting) | IntentDecision::Abort => {
                    Err(ProvisionerError::Declined { tier, name })
                }
            }
        }
        other => other,
    }
}

/// Pick the data-plane credential for an account.
///
/// Account keys are preferred. Falling back to the ambient credential is a
/// capability change, so it happens only when configured and is logged.
async fn account_access(
    plane: &dyn ManagementPlane,
    group: &str,
    account: &str,
    fallback: KeyFallback,
) -> Result<(DataCredential, AccessPath), ProvisionerError> {
    let listed = plane.list_account_keys(group, account).await.and_then(|keys| {
        keys.into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(format!("access keys for {account}")))
    });

    match (listed, fallback) {
        (Ok(key), _) => {
            tracing::debug!(account = %account, key = %key.name, "using account key");
            let access = AccessPath::AccountKey {
                key_name: key.name.clone(),
            };
            Ok((DataCredential::AccountKey(key), access))
        }
        (Err(source), KeyFallback::Deny) => Err(ProvisionerError::AccountKeys {
            account: account.to_string(),
            source,
        }),
        (Err(e), KeyFallback::AmbientCredential) => {
            tracing::warn!(
                account = %account,
                error = %e,
                "account keys unavailable, continuing with ambient credential; \
                 permissions may differ from key-based access"
            );
            Ok((
                DataCredential::Ambient,
                AccessPath::Ambient {
                    reason: e.to_string(),
                },
            ))
        }
    }
}
