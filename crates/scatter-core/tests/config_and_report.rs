use std::collections::HashMap;

use jiff::civil::Date;
use scatter_core::config::{KeyFallback, SchemeKind, ScatterConfig, Target};
use scatter_core::report::{Outcome, SUMMARY_SAMPLE_SIZE, UploadResult, summarize};
use scatter_core::{CoreError, CreationIntent, ObjectName, PrefixScheme};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let config = ScatterConfig::default();
    config.validate().unwrap();
    assert_eq!(config.target, Target::Local);
    assert_eq!(config.key_fallback, KeyFallback::Deny);
    assert_eq!(
        config.partition().scheme,
        PrefixScheme::Nested {
            depth: 2,
            chars_per_level: 2
        }
    );
}

#[test]
fn env_overrides_defaults() {
    let mut config = ScatterConfig::default();
    config
        .apply_env(env(&[
            ("AZURE_STORAGE_ACCOUNT", "lakeacct01"),
            ("PREFIX_SCHEME", "flat"),
            ("HASH_PREFIX_LEN", "6"),
            ("HASH_ALGORITHM", "SHA256"),
            ("CREATION_INTENT", "use-existing"),
            ("PARTITION_DATE", "2024-03-07"),
        ]))
        .unwrap();

    assert_eq!(config.account_name, "lakeacct01");
    assert_eq!(config.prefix_scheme, SchemeKind::Flat);
    assert_eq!(config.partition().scheme, PrefixScheme::Flat { length: 6 });
    assert_eq!(config.account_intent, CreationIntent::UseExisting);
    assert_eq!(config.container_intent, CreationIntent::UseExisting);
    config.validate().unwrap();
}

#[test]
fn bad_env_values_are_reported() {
    let mut config = ScatterConfig::default();
    let err = config.apply_env(env(&[("PARTITION_DEPTH", "two")])).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig(_)));

    let err = config.apply_env(env(&[("SCATTER_TARGET", "gcs")])).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig(_)));
}

#[test]
fn validate_catches_preflight_problems() {
    let config = ScatterConfig {
        account_name: "Not_Valid".into(),
        ..ScatterConfig::default()
    };
    assert!(matches!(config.validate(), Err(CoreError::InvalidName { .. })));

    let config = ScatterConfig {
        date: Some("2024-13-01".into()),
        ..ScatterConfig::default()
    };
    assert!(matches!(config.validate(), Err(CoreError::InvalidDate { .. })));

    let config = ScatterConfig {
        minimum_tls_version: "TLS9".into(),
        ..ScatterConfig::default()
    };
    assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));

    let config = ScatterConfig {
        partition_depth: 20,
        ..ScatterConfig::default()
    };
    assert!(matches!(config.validate(), Err(CoreError::PrefixTooLong { .. })));
}

#[test]
fn s3_target_checks_bucket_rule_only() {
    let config = ScatterConfig {
        target: Target::S3,
        account_name: "ignored for s3".into(),
        container_name: "my.data.bucket".into(),
        ..ScatterConfig::default()
    };
    config.validate().unwrap();
}

#[test]
fn azure_target_checks_account_and_container_names() {
    let config = ScatterConfig {
        target: Target::Azure,
        resource_group: String::new(),
        account_name: "lakeacct".into(),
        container_name: "bronze".into(),
        ..ScatterConfig::default()
    };
    config.validate().unwrap();

    let bad_account = ScatterConfig {
        account_name: "Lake_Acct".into(),
        ..config.clone()
    };
    assert!(bad_account.validate().is_err());

    let bad_container = ScatterConfig {
        container_name: "my.data.bucket".into(),
        ..config
    };
    assert!(bad_container.validate().is_err());
}

#[test]
fn azure_target_parses_from_env() {
    let mut config = ScatterConfig::default();
    config
        .apply_env(|var| (var == "SCATTER_TARGET").then(|| "Azure".to_string()))
        .unwrap();
    assert_eq!(config.target, Target::Azure);
}

#[test]
fn partition_path_uses_configured_date_or_today() {
    let today = Date::constant(2025, 1, 9);
    let config = ScatterConfig::default();
    assert_eq!(
        config.partition_path(today).unwrap().unwrap().as_str(),
        "raw/sales/year=2025/month=01/day=09"
    );

    let config = ScatterConfig {
        date: Some("2024-03-07".into()),
        ..ScatterConfig::default()
    };
    assert_eq!(
        config.partition_path(today).unwrap().unwrap().as_str(),
        "raw/sales/year=2024/month=03/day=07"
    );

    let config = ScatterConfig {
        use_partition_path: false,
        ..ScatterConfig::default()
    };
    assert!(config.partition_path(today).unwrap().is_none());
}

#[test]
fn config_file_fields_default_individually() {
    let config: ScatterConfig =
        serde_json::from_str(r#"{"account_name": "lakeacct01", "hash_algorithm": "sha256"}"#).unwrap();
    assert_eq!(config.account_name, "lakeacct01");
    assert_eq!(config.container_name, "datalake");
    assert_eq!(config.partition().algorithm, scatter_core::HashAlgorithm::Sha256);
}

fn result(name: &str, ok: bool) -> UploadResult {
    UploadResult {
        name: ObjectName::new(name).unwrap(),
        key: Some(format!("ab/{name}")),
        outcome: if ok {
            Outcome::Succeeded
        } else {
            Outcome::Failed {
                reason: "write rejected".into(),
            }
        },
    }
}

#[test]
fn summary_counts_and_samples() {
    let results: Vec<UploadResult> = (0..8)
        .map(|i| result(&format!("f{i}.csv"), i != 2))
        .collect();
    let summary = summarize(&results);

    assert_eq!(summary.total, 8);
    assert_eq!(summary.succeeded, 7);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failed[0].name.as_str(), "f2.csv");
    assert_eq!(summary.sample_keys.len(), SUMMARY_SAMPLE_SIZE);
    assert_eq!(summary.sample_keys[0], "ab/f0.csv");
    assert_eq!(summary.sample_keys[2], "ab/f3.csv");
}

#[test]
fn empty_summary() {
    let summary = summarize(&[]);
    assert_eq!(summary.total, 0);
    assert!(summary.sample_keys.is_empty());
}
