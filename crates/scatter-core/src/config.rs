//! Run configuration.
//!
//! One explicit struct, passed by value into the components that need it.
//! Nothing in the library crates reads the process environment; the binary
//! layers env vars on top via [`ScatterConfig::apply_env`].

use std::path::PathBuf;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::intent::CreationIntent;
use crate::lake_path::{self, PartitionPath};
use crate::names::{self, ResourceDescriptor};
use crate::partition::{HashAlgorithm, PartitionConfig, PrefixScheme};

pub const MINIMUM_TLS_VERSIONS: &[&str] = &["TLS1_0", "TLS1_1", "TLS1_2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Filesystem-emulated cloud under `local_root`.
    #[default]
    Local,
    /// AWS S3. Only the container (bucket) tier exists.
    S3,
    /// Azure Blob Storage on an existing account. Only the container (file
    /// system) tier is provisioned.
    Azure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    #[default]
    Nested,
    Flat,
}

/// What to do when account keys cannot be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFallback {
    /// Abort the run. Key access and ambient access may carry different
    /// permissions, so switching needs to be opted into.
    #[default]
    Deny,
    /// Continue with the ambient credential and log the downgrade.
    AmbientCredential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub config_version: u32,

    pub target: Target,
    pub local_root: PathBuf,
    pub region: String,

    pub resource_group: String,
    pub account_name: String,
    pub container_name: String,
    pub account_intent: CreationIntent,
    pub container_intent: CreationIntent,

    pub source_directory: PathBuf,

    pub prefix_scheme: SchemeKind,
    pub partition_depth: usize,
    pub chars_per_level: usize,
    pub flat_prefix_length: usize,
    pub hash_algorithm: HashAlgorithm,
    pub allow_unpartitioned: bool,

    pub use_partition_path: bool,
    pub zone: String,
    pub domain: String,
    /// `YYYY-MM-DD`. `None` means today.
    pub date: Option<String>,

    pub location: String,
    pub redundancy_sku: String,
    pub enable_hierarchical_namespace: bool,
    pub minimum_tls_version: String,
    pub key_fallback: KeyFallback,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            config_version: Self::VERSION,
            target: Target::Local,
            local_root: PathBuf::from("./.scatter-cloud"),
            region: "us-east-1".into(),
            resource_group: "rg-datalake".into(),
            account_name: "mystorageacct".into(),
            container_name: "datalake".into(),
            account_intent: CreationIntent::CreateIfAbsent,
            container_intent: CreationIntent::CreateIfAbsent,
            source_directory: PathBuf::from("./sample-data"),
            prefix_scheme: SchemeKind::Nested,
            partition_depth: 2,
            chars_per_level: 2,
            flat_prefix_length: 4,
            hash_algorithm: HashAlgorithm::Md5,
            allow_unpartitioned: false,
            use_partition_path: true,
            zone: "raw".into(),
            domain: "sales".into(),
            date: None,
            location: "eastus".into(),
            redundancy_sku: "Standard_LRS".into(),
            enable_hierarchical_namespace: true,
            minimum_tls_version: "TLS1_2".into(),
            key_fallback: KeyFallback::Deny,
        }
    }
}

impl ScatterConfig {
    /// Bump when adding, removing, or renaming fields.
    pub const VERSION: u32 = 1;

    /// Overlay values from environment-style lookups. Unparseable numeric or
    /// enum values are reported rather than ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SCATTER_TARGET") {
            self.target = parse_enum("SCATTER_TARGET", &v)?;
        }
        if let Some(v) = lookup("SCATTER_LOCAL_ROOT") {
            self.local_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("AWS_REGION") {
            self.region = v;
        }
        if let Some(v) = lookup("AZURE_RESOURCE_GROUP") {
            self.resource_group = v;
        }
        if let Some(v) = lookup("AZURE_STORAGE_ACCOUNT") {
            self.account_name = v;
        }
        if let Some(v) = lookup("AZURE_STORAGE_FILESYSTEM") {
            self.container_name = v;
        }
        if let Some(v) = lookup("CREATION_INTENT") {
            let intent = parse_enum("CREATION_INTENT", &v)?;
            self.account_intent = intent;
            self.container_intent = intent;
        }
        if let Some(v) = lookup("SOURCE_DIR") {
            self.source_directory = PathBuf::from(v);
        }
        if let Some(v) = lookup("PREFIX_SCHEME") {
            self.prefix_scheme = parse_enum("PREFIX_SCHEME", &v)?;
        }
        if let Some(v) = lookup("PARTITION_DEPTH") {
            self.partition_depth = parse_number("PARTITION_DEPTH", &v)?;
        }
        if let Some(v) = lookup("CHARS_PER_LEVEL") {
            self.chars_per_level = parse_number("CHARS_PER_LEVEL", &v)?;
        }
        if let Some(v) = lookup("HASH_PREFIX_LEN") {
            self.flat_prefix_length = parse_number("HASH_PREFIX_LEN", &v)?;
        }
        if let Some(v) = lookup("HASH_ALGORITHM") {
            self.hash_algorithm = parse_enum("HASH_ALGORITHM", &v)?;
        }
        if let Some(v) = lookup("DATA_LAKE_ZONE") {
            self.zone = v;
        }
        if let Some(v) = lookup("DATA_LAKE_DOMAIN") {
            self.domain = v;
        }
        if let Some(v) = lookup("PARTITION_DATE") {
            self.date = Some(v);
        }
        if let Some(v) = lookup("AZURE_LOCATION") {
            self.location = v;
        }
        if let Some(v) = lookup("AZURE_STORAGE_SKU") {
            self.redundancy_sku = v;
        }
        Ok(())
    }

    pub fn partition(&self) -> PartitionConfig {
        let scheme = match self.prefix_scheme {
            SchemeKind::Nested => PrefixScheme::Nested {
                depth: self.partition_depth,
                chars_per_level: self.chars_per_level,
            },
            SchemeKind::Flat => PrefixScheme::Flat {
                length: self.flat_prefix_length,
            },
        };
        PartitionConfig {
            scheme,
            algorithm: self.hash_algorithm,
            allow_unpartitioned: self.allow_unpartitioned,
        }
    }

    pub fn descriptor(&self) -> Result<ResourceDescriptor, CoreError> {
        ResourceDescriptor::new(
            self.resource_group.clone(),
            self.account_name.clone(),
            self.container_name.clone(),
        )
    }

    /// Target directory for the batch, or `None` when partition paths are off.
    pub fn partition_path(&self, today: Date) -> Result<Option<PartitionPath>, CoreError> {
        if !self.use_partition_path {
            return Ok(None);
        }
        let date = match &self.date {
            Some(iso) => lake_path::parse_iso_date(iso)?,
            None => today,
        };
        lake_path::build_path_for(&self.zone, &self.domain, date).map(Some)
    }

    /// Every pre-flight check. Run once before touching any backend.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.partition().validate()?;

        match self.target {
            Target::Local => {
                self.descriptor()?;
            }
            Target::S3 => {
                names::validate_bucket(&self.container_name)?;
                if self.region.is_empty() {
                    return Err(CoreError::InvalidConfig("region must not be empty".into()));
                }
            }
            Target::Azure => {
                names::validate_account(&self.account_name)?;
                names::validate_container(&self.container_name)?;
            }
        }

        if let Some(iso) = &self.date {
            lake_path::parse_iso_date(iso)?;
        }
        if self.use_partition_path {
            // The date does not affect segment validation.
            lake_path::build_path_for(&self.zone, &self.domain, Date::constant(2000, 1, 1))?;
        }

        if self.redundancy_sku.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "redundancy_sku must not be empty".into(),
            ));
        }
        if !MINIMUM_TLS_VERSIONS.contains(&self.minimum_tls_version.as_str()) {
            return Err(CoreError::InvalidConfig(format!(
                "minimum_tls_version must be one of {MINIMUM_TLS_VERSIONS:?}, got {:?}",
                self.minimum_tls_version
            )));
        }
        Ok(())
    }
}

fn parse_number(var: &str, value: &str) -> Result<usize, CoreError> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidConfig(format!("{var} must be a non-negative integer, got {value:?}")))
}

/// Parse a snake_case enum value through serde so env values and the config
/// file accept the same spellings.
fn parse_enum<T: serde::de::DeserializeOwned>(var: &str, value: &str) -> Result<T, CoreError> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| CoreError::InvalidConfig(format!("unrecognized {var} value {value:?}")))
}
