use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scatter_core::config::{KeyFallback, SchemeKind, ScatterConfig, Target};
use scatter_core::{CreationIntent, HashAlgorithm};

#[derive(Debug, Parser)]
#[command(name = "scatter", version, about = "Provision storage and upload files under hash-partitioned keys")]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", global = true, help = "Path to a JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision storage and upload the source directory (default).
    Upload(UploadArgs),
    /// Print the storage key for each name.
    Key {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Print the partition path for the configured zone, domain and date.
    Path,
    /// Print the effective configuration, or write it to a file.
    Config {
        #[arg(long, value_name = "FILE")]
        write: Option<PathBuf>,
    },
    /// Create the resource group directory for the local target.
    SetupLocal,
    /// Generate random sample files.
    Sample(SampleArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct UploadArgs {
    #[arg(short, long, help = "Create missing resources without asking")]
    pub yes: bool,

    #[arg(long, conflicts_with = "yes", help = "Never prompt; decline to create missing resources")]
    pub non_interactive: bool,

    #[arg(long, help = "Print the summary as JSON")]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SampleArgs {
    #[arg(long, value_name = "DIR", help = "Output directory [default: source directory]")]
    pub dir: Option<PathBuf>,

    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    #[arg(long, default_value_t = 20, help = "Rows per file")]
    pub rows: usize,

    #[arg(long, help = "Seed for reproducible output")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Local,
    S3,
    Azure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    Nested,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashArg {
    Md5,
    Sha256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntentArg {
    UseExisting,
    CreateIfAbsent,
}

/// Flags that override the file and environment layers.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    #[arg(long, global = true, value_enum)]
    pub target: Option<TargetArg>,
    #[arg(long, global = true, value_name = "DIR")]
    pub local_root: Option<PathBuf>,
    #[arg(long, global = true)]
    pub region: Option<String>,
    #[arg(long, global = true)]
    pub resource_group: Option<String>,
    #[arg(long, global = true)]
    pub account: Option<String>,
    #[arg(long, global = true)]
    pub container: Option<String>,
    #[arg(long, global = true, value_enum, help = "Intent for both account and container")]
    pub intent: Option<IntentArg>,
    #[arg(long, global = true, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,
    #[arg(long, global = true, value_enum)]
    pub scheme: Option<SchemeArg>,
    #[arg(long, global = true)]
    pub depth: Option<usize>,
    #[arg(long, global = true)]
    pub chars_per_level: Option<usize>,
    #[arg(long, global = true)]
    pub prefix_length: Option<usize>,
    #[arg(long, global = true, value_enum)]
    pub hash: Option<HashArg>,
    #[arg(long, global = true)]
    pub zone: Option<String>,
    #[arg(long, global = true)]
    pub domain: Option<String>,
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,
    #[arg(long, global = true, help = "Upload to the container root instead of a partition path")]
    pub no_partition_path: bool,
    #[arg(long, global = true, help = "Continue with the ambient credential if account keys cannot be listed")]
    pub allow_ambient_credential: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut ScatterConfig) {
        if let Some(target) = self.target {
            config.target = match target {
                TargetArg::Local => Target::Local,
                TargetArg::S3 => Target::S3,
                TargetArg::Azure => Target::Azure,
            };
        }
        if let Some(root) = &self.local_root {
            config.local_root = root.clone();
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(group) = &self.resource_group {
            config.resource_group = group.clone();
        }
        if let Some(account) = &self.account {
            config.account_name = account.clone();
        }
        if let Some(container) = &self.container {
            config.container_name = container.clone();
        }
        if let Some(intent) = self.intent {
            let intent = match intent {
                IntentArg::UseExisting => CreationIntent::UseExisting,
                IntentArg::CreateIfAbsent => CreationIntent::CreateIfAbsent,
            };
            config.account_intent = intent;
            config.container_intent = intent;
        }
        if let Some(dir) = &self.source_dir {
            config.source_directory = dir.clone();
        }
        if let Some(scheme) = self.scheme {
            config.prefix_scheme = match scheme {
                SchemeArg::Nested => SchemeKind::Nested,
                SchemeArg::Flat => SchemeKind::Flat,
            };
        }
        if let Some(depth) = self.depth {
            config.partition_depth = depth;
        }
        if let Some(chars) = self.chars_per_level {
            config.chars_per_level = chars;
        }
        if let Some(length) = self.prefix_length {
            config.flat_prefix_length = length;
        }
        if let Some(hash) = self.hash {
            config.hash_algorithm = match hash {
                HashArg::Md5 => HashAlgorithm::Md5,
                HashArg::Sha256 => HashAlgorithm::Sha256,
            };
        }
        if let Some(zone) = &self.zone {
            config.zone = zone.clone();
        }
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        if let Some(date) = &self.date {
            config.date = Some(date.clone());
        }
        if self.no_partition_path {
            config.use_partition_path = false;
        }
        if self.allow_ambient_credential {
            config.key_fallback = KeyFallback::AmbientCredential;
        }
    }
}
