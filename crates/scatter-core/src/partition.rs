//! Hash-prefix key partitioning.
//!
//! Sequentially named files (`2024-03-07-0001.csv`, `...-0002.csv`) land on
//! lexicographically adjacent keys and therefore on the same storage
//! partition. Prefixing each key with a slice of a digest of the name spreads
//! them across the key space. Pure functions, no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::CoreError;
use crate::names::ObjectName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    /// Number of hex characters in the rendered digest.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 => 64,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Lowercase hex digest of `bytes`.
    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(md5::Md5::digest(bytes)),
            Self::Sha256 => hex::encode(sha2::Sha256::digest(bytes)),
        }
    }
}

/// How digest characters are turned into a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrefixScheme {
    /// `ab/cd/name`: `depth` directory segments of `chars_per_level` each.
    Nested { depth: usize, chars_per_level: usize },
    /// `abcd-name`: one segment joined to the name with `-`.
    Flat { length: usize },
}

impl PrefixScheme {
    /// Total hex characters consumed from the digest.
    pub fn hex_chars(&self) -> usize {
        match *self {
            Self::Nested {
                depth,
                chars_per_level,
            } => depth.saturating_mul(chars_per_level),
            Self::Flat { length } => length,
        }
    }
}

impl Default for PrefixScheme {
    fn default() -> Self {
        Self::Nested {
            depth: 2,
            chars_per_level: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartitionConfig {
    #[serde(default)]
    pub scheme: PrefixScheme,
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Permit `Nested { depth: 0 }`, which leaves keys unprefixed.
    #[serde(default)]
    pub allow_unpartitioned: bool,
}

impl PartitionConfig {
    pub fn nested(depth: usize, chars_per_level: usize) -> Self {
        Self {
            scheme: PrefixScheme::Nested {
                depth,
                chars_per_level,
            },
            ..Self::default()
        }
    }

    pub fn flat(length: usize, algorithm: HashAlgorithm) -> Self {
        Self {
            scheme: PrefixScheme::Flat { length },
            algorithm,
            allow_unpartitioned: false,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self.scheme {
            PrefixScheme::Nested { depth: 0, .. } if !self.allow_unpartitioned => {
                return Err(CoreError::ZeroDepth);
            }
            PrefixScheme::Nested { depth: 0, .. } => return Ok(()),
            PrefixScheme::Nested {
                chars_per_level: 0, ..
            } => {
                return Err(CoreError::ZeroWidth {
                    field: "chars_per_level",
                });
            }
            PrefixScheme::Flat { length: 0 } => {
                return Err(CoreError::ZeroWidth {
                    field: "flat_prefix_length",
                });
            }
            _ => {}
        }

        let requested = self.scheme.hex_chars();
        let available = self.algorithm.hex_len();
        if requested > available {
            return Err(CoreError::PrefixTooLong {
                algorithm: self.algorithm.label(),
                requested,
                available,
            });
        }
        Ok(())
    }
}

/// Full object key: hash prefix segments followed by the object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StorageKey {
    #[serde(rename = "key")]
    rendered: String,
    #[serde(skip)]
    prefix: Vec<String>,
    #[serde(skip)]
    name: ObjectName,
}

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// The hash prefix segments, in order.
    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.name
    }

    /// Key placed under a directory path, e.g. a partition path.
    pub fn under(&self, dir: &str) -> String {
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            self.rendered.clone()
        } else {
            format!("{dir}/{}", self.rendered)
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Map an object name to its partitioned key.
///
/// Same name and config always give the same key. Prefixes may collide
/// between names; the full key never does because it ends with the name.
pub fn compute_key(name: &ObjectName, config: &PartitionConfig) -> Result<StorageKey, CoreError> {
    config.validate()?;
    let digest = config.algorithm.hex_digest(name.as_str().as_bytes());

    let (prefix, rendered) = match config.scheme {
        PrefixScheme::Nested {
            depth,
            chars_per_level,
        } => {
            let prefix: Vec<String> = (0..depth)
                .map(|level| {
                    let start = level * chars_per_level;
                    digest[start..start + chars_per_level].to_string()
                })
                .collect();
            let mut rendered = String::with_capacity(digest.len() + name.as_str().len());
            for segment in &prefix {
                rendered.push_str(segment);
                rendered.push('/');
            }
            rendered.push_str(name.as_str());
            (prefix, rendered)
        }
        PrefixScheme::Flat { length } => {
            let segment = digest[..length].to_string();
            let rendered = format!("{segment}-{name}");
            (vec![segment], rendered)
        }
    };

    Ok(StorageKey {
        rendered,
        prefix,
        name: name.clone(),
    })
}

/// Recover the object name from a rendered key produced with `scheme`.
///
/// Returns `None` when the key does not carry a well-formed prefix for that
/// scheme.
pub fn strip_prefix(key: &str, scheme: &PrefixScheme) -> Option<ObjectName> {
    let is_hex = |s: &str| s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));

    let rest = match *scheme {
        PrefixScheme::Nested {
            depth,
            chars_per_level,
        } => {
            let mut rest = key;
            for _ in 0..depth {
                let (segment, tail) = rest.split_once('/')?;
                if segment.len() != chars_per_level || !is_hex(segment) {
                    return None;
                }
                rest = tail;
            }
            rest
        }
        PrefixScheme::Flat { length } => {
            let (segment, tail) = key.split_once('-')?;
            if segment.len() != length || !is_hex(segment) {
                return None;
            }
            tail
        }
    };

    ObjectName::new(rest).ok()
}
