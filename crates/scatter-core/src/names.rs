//! Validated names.
//!
//! Provider naming rules are checked here, once, before any component talks
//! to a backing service. Nothing downstream re-validates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base name of a local file. Never empty, never contains a path separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.contains('/') || name.contains('\\') {
            Some("must not contain path separators")
        } else if name == "." || name == ".." {
            Some("must not be a relative path component")
        } else if name.chars().any(char::is_control) {
            Some("must not contain control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidName {
                kind: "object",
                name,
                reason: reason.to_string(),
            }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectName> for String {
    fn from(value: ObjectName) -> Self {
        value.0
    }
}

/// The three names a provisioning pass works on. Validated on construction
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    resource_group: String,
    account: String,
    container: String,
}

impl ResourceDescriptor {
    pub fn new(
        resource_group: impl Into<String>,
        account: impl Into<String>,
        container: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let resource_group = resource_group.into();
        let account = account.into();
        let container = container.into();

        validate_resource_group(&resource_group)?;
        validate_account(&account)?;
        validate_container(&container)?;

        Ok(Self {
            resource_group,
            account,
            container,
        })
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// 1-90 characters of alphanumerics, `-`, `_`, `.`, `(`, `)`; no trailing `.`.
pub fn validate_resource_group(name: &str) -> Result<(), CoreError> {
    const KIND: &str = "resource group";
    let len = name.chars().count();
    if !(1..=90).contains(&len) {
        return Err(invalid(KIND, name, "must be 1-90 characters"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')')))
    {
        return Err(invalid(KIND, name, format!("character {c:?} is not allowed")));
    }
    if name.ends_with('.') {
        return Err(invalid(KIND, name, "must not end with '.'"));
    }
    Ok(())
}

/// 3-24 characters, lowercase letters and digits only.
pub fn validate_account(name: &str) -> Result<(), CoreError> {
    const KIND: &str = "storage account";
    if !(3..=24).contains(&name.len()) {
        return Err(invalid(KIND, name, "must be 3-24 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(invalid(KIND, name, "only lowercase letters and digits are allowed"));
    }
    Ok(())
}

/// 3-63 characters of lowercase letters, digits and `-`. Starts and ends with
/// a letter or digit, no `--`.
pub fn validate_container(name: &str) -> Result<(), CoreError> {
    validate_dns_label("container", name, &['-'])
}

/// S3 bucket names: the container rule, with `.` also allowed inside.
pub fn validate_bucket(name: &str) -> Result<(), CoreError> {
    validate_dns_label("bucket", name, &['-', '.'])
}

fn validate_dns_label(kind: &'static str, name: &str, inner: &[char]) -> Result<(), CoreError> {
    if !(3..=63).contains(&name.len()) {
        return Err(invalid(kind, name, "must be 3-63 characters"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || inner.contains(c)))
    {
        return Err(invalid(kind, name, format!("character {c:?} is not allowed")));
    }
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return Err(invalid(kind, name, "must start and end with a letter or digit"));
    }
    if name.contains("--") {
        return Err(invalid(kind, name, "must not contain consecutive hyphens"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_rejects_separators_and_empty() {
        assert!(ObjectName::new("").is_err());
        assert!(ObjectName::new("a/b.csv").is_err());
        assert!(ObjectName::new("a\\b.csv").is_err());
        assert!(ObjectName::new("..").is_err());
        assert_eq!(ObjectName::new("orders.csv").unwrap().as_str(), "orders.csv");
    }

    #[test]
    fn account_rules() {
        assert!(validate_account("mystorageacct").is_ok());
        assert!(validate_account("ab").is_err());
        assert!(validate_account("MyStorage").is_err());
        assert!(validate_account("my-storage").is_err());
        assert!(validate_account(&"a".repeat(25)).is_err());
    }

    #[test]
    fn container_rules() {
        assert!(validate_container("datalake").is_ok());
        assert!(validate_container("raw-zone-01").is_ok());
        assert!(validate_container("-raw").is_err());
        assert!(validate_container("raw-").is_err());
        assert!(validate_container("raw--zone").is_err());
        assert!(validate_container("Raw").is_err());
        assert!(validate_container("my.bucket").is_err());
        assert!(validate_bucket("my.bucket").is_ok());
    }

    #[test]
    fn resource_group_rules() {
        assert!(validate_resource_group("rg-datalake_(prod).east").is_ok());
        assert!(validate_resource_group("").is_err());
        assert!(validate_resource_group("rg.").is_err());
        assert!(validate_resource_group("rg datalake").is_err());
    }

    #[test]
    fn descriptor_validates_every_tier() {
        let err = ResourceDescriptor::new("rg", "BadAccount", "datalake").unwrap_err();
        assert!(matches!(err, CoreError::InvalidName { kind: "storage account", .. }));
        let ok = ResourceDescriptor::new("rg", "acct01", "datalake").unwrap();
        assert_eq!(ok.container(), "datalake");
    }
}
