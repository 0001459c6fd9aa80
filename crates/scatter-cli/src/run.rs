use std::sync::Arc;

use scatter_core::config::{ScatterConfig, Target};
use scatter_core::{ObjectName, PartitionPath, UploadSummary, compute_key, summarize};
use scatter_ingest::{UploadPlan, list_source_dir, upload_all};
use scatter_provisioner::{
    FallbackDecider, ProvisionRequest, Resolution, ResolveAction, format_err_chain, provision,
    provision_container,
};
use scatter_storage::azure::{AzureAuth, AzureDataPlane};
use scatter_storage::local::LocalCloud;
use scatter_storage::s3::S3DataPlane;
use scatter_storage::{AccountParams, Container, ContainerParams, DataCredential, DataPlane};

/// Overrides the default Azure credential when set.
pub const AZURE_CONNECTION_STRING_VAR: &str = "AZURE_STORAGE_CONNECTION_STRING";

pub fn account_params(config: &ScatterConfig) -> AccountParams {
    AccountParams {
        location: config.location.clone(),
        sku: config.redundancy_sku.clone(),
        hierarchical_namespace: config.enable_hierarchical_namespace,
        minimum_tls_version: config.minimum_tls_version.clone(),
        ..AccountParams::default()
    }
}

/// A connection string wins; otherwise the default credential chain
/// (environment, managed identity, CLI login).
pub fn azure_auth<F>(lookup: F) -> AzureAuth
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(AZURE_CONNECTION_STRING_VAR).filter(|v| !v.trim().is_empty()) {
        Some(raw) => AzureAuth::ConnectionString(raw),
        None => AzureAuth::Credential(DataCredential::Ambient),
    }
}

pub fn today() -> jiff::civil::Date {
    jiff::Zoned::now().date()
}

pub fn target_dir(config: &ScatterConfig) -> eyre::Result<Option<PartitionPath>> {
    Ok(config.partition_path(today())?)
}

/// Provision, then upload every file in the source directory.
///
/// Returns the summary even when some files failed; the caller decides what
/// to print. Validation, provisioning and listing failures are errors.
pub async fn upload(config: &ScatterConfig, decider: &dyn FallbackDecider) -> eyre::Result<UploadSummary> {
    config.validate()?;
    let plan = UploadPlan::new(config.partition(), target_dir(config)?);

    // Listing first: a bad source directory should not provision anything.
    let files = list_source_dir(&config.source_directory).await?;
    if files.is_empty() {
        tracing::warn!(dir = %config.source_directory.display(), "source directory has no files");
    }

    let container = open_target(config, decider).await?;

    let mut progress = |current: usize, total: usize, label: &str| {
        eprintln!("[{current}/{total}] {label}");
    };
    let results = upload_all(container.as_ref(), files, &plan, &mut progress).await?;

    Ok(summarize(&results))
}

async fn open_target(
    config: &ScatterConfig,
    decider: &dyn FallbackDecider,
) -> eyre::Result<Arc<dyn Container>> {
    match config.target {
        Target::Local => {
            let cloud = LocalCloud::new(&config.local_root);
            let request = ProvisionRequest {
                descriptor: config.descriptor()?,
                account_intent: config.account_intent,
                container_intent: config.container_intent,
                account_params: account_params(config),
                container_params: ContainerParams::default(),
                key_fallback: config.key_fallback,
            };
            let ready = provision(&cloud, &request, decider)
                .await
                .map_err(|e| eyre::eyre!("provisioning failed: {}", format_err_chain(&e)))?;
            report_resolutions(&ready.resolutions);
            Ok(ready.container)
        }
        Target::S3 => {
            let plane = S3DataPlane::from_env(&config.region).await;
            open_container_only(&plane, config, decider).await
        }
        Target::Azure => {
            let auth = azure_auth(|var| std::env::var(var).ok());
            let plane = AzureDataPlane::connect(
                &config.account_name,
                auth,
                config.enable_hierarchical_namespace,
            )?;
            tracing::info!(account = %plane.account(), "using Azure storage account");
            open_container_only(&plane, config, decider).await
        }
    }
}

/// Targets without resource group or account tiers.
async fn open_container_only(
    plane: &dyn DataPlane,
    config: &ScatterConfig,
    decider: &dyn FallbackDecider,
) -> eyre::Result<Arc<dyn Container>> {
    let (container, resolution) = provision_container(
        plane,
        &config.container_name,
        config.container_intent,
        &ContainerParams::default(),
        decider,
    )
    .await
    .map_err(|e| eyre::eyre!("provisioning failed: {}", format_err_chain(&e)))?;
    report_resolutions(std::slice::from_ref(&resolution));
    Ok(container)
}

fn report_resolutions(resolutions: &[Resolution]) {
    for r in resolutions {
        let verb = match r.action {
            ResolveAction::Reused => "using existing",
            ResolveAction::Created => "created",
            ResolveAction::CreatedConcurrently => "using concurrently created",
        };
        eprintln!("{verb} {} {}", r.tier, r.name);
    }
}

/// Full object path for each name under the current configuration.
pub fn keys_for(config: &ScatterConfig, names: &[String]) -> eyre::Result<Vec<String>> {
    let partition = config.partition();
    partition.validate()?;
    let dir = target_dir(config)?;

    names
        .iter()
        .map(|raw| -> eyre::Result<String> {
            let name = ObjectName::new(raw.as_str())?;
            let key = compute_key(&name, &partition)?;
            Ok(match &dir {
                Some(dir) => key.under(dir.as_str()),
                None => key.as_str().to_string(),
            })
        })
        .collect()
}

pub fn print_summary(summary: &UploadSummary, container: &str) {
    println!(
        "Uploaded {} of {} files to {container}",
        summary.succeeded, summary.total
    );
    if !summary.sample_keys.is_empty() {
        println!("Sample keys:");
        for key in &summary.sample_keys {
            println!("  {key}");
        }
    }
    if !summary.failed.is_empty() {
        println!("Failed ({}):", summary.failed_count());
        for failure in &summary.failed {
            println!("  {}: {}", failure.name, failure.reason);
        }
    }
}
