use scatter_core::partition::{HashAlgorithm, PartitionConfig, PrefixScheme, compute_key, strip_prefix};
use scatter_core::{CoreError, ObjectName};

fn name(s: &str) -> ObjectName {
    ObjectName::new(s).unwrap()
}

#[test]
fn nested_md5_key_matches_known_digest() {
    // md5("example_file.parquet") = ace43630c0202495b5ccca0e44818a50
    let key = compute_key(&name("example_file.parquet"), &PartitionConfig::nested(2, 2)).unwrap();
    assert_eq!(key.as_str(), "ac/e4/example_file.parquet");
    assert_eq!(key.prefix(), ["ac", "e4"]);
    assert_eq!(key.object_name().as_str(), "example_file.parquet");
}

#[test]
fn flat_sha256_key_matches_known_digest() {
    // sha256("orders.csv") starts with 0eb8b631
    let config = PartitionConfig::flat(4, HashAlgorithm::Sha256);
    let key = compute_key(&name("orders.csv"), &config).unwrap();
    assert_eq!(key.as_str(), "0eb8-orders.csv");
}

#[test]
fn keys_are_deterministic() {
    let configs = [
        PartitionConfig::nested(1, 1),
        PartitionConfig::nested(3, 4),
        PartitionConfig::flat(6, HashAlgorithm::Md5),
        PartitionConfig {
            algorithm: HashAlgorithm::Sha256,
            ..PartitionConfig::nested(8, 8)
        },
    ];
    for config in configs {
        for n in ["a", "2024-03-07-0001.csv", "ünïcødé.json"] {
            let first = compute_key(&name(n), &config).unwrap();
            let second = compute_key(&name(n), &config).unwrap();
            assert_eq!(first, second);
        }
    }
}

#[test]
fn distinct_names_never_share_a_key() {
    let config = PartitionConfig::nested(1, 1);
    let keys: std::collections::HashSet<String> = (0..500)
        .map(|i| {
            compute_key(&name(&format!("part-{i:05}.csv")), &config)
                .unwrap()
                .as_str()
                .to_string()
        })
        .collect();
    // With one hex char of prefix collisions are certain, full keys still differ.
    assert_eq!(keys.len(), 500);
}

#[test]
fn sequential_names_spread_across_prefixes() {
    let config = PartitionConfig::nested(1, 1);
    let prefixes: std::collections::HashSet<String> = (0..200)
        .map(|i| {
            compute_key(&name(&format!("2024-03-07-{i:04}.csv")), &config)
                .unwrap()
                .prefix()[0]
                .clone()
        })
        .collect();
    assert!(prefixes.len() > 8, "only {} distinct prefixes", prefixes.len());
}

#[test]
fn prefix_longer_than_digest_is_a_config_error() {
    let err = compute_key(&name("a.csv"), &PartitionConfig::nested(9, 4)).unwrap_err();
    assert_eq!(
        err,
        CoreError::PrefixTooLong {
            algorithm: "md5",
            requested: 36,
            available: 32
        }
    );

    let sha = PartitionConfig {
        algorithm: HashAlgorithm::Sha256,
        ..PartitionConfig::nested(8, 8)
    };
    assert!(compute_key(&name("a.csv"), &sha).is_ok());
}

#[test]
fn zero_depth_requires_opt_in() {
    let config = PartitionConfig::nested(0, 2);
    assert_eq!(compute_key(&name("a.csv"), &config).unwrap_err(), CoreError::ZeroDepth);

    let allowed = PartitionConfig {
        allow_unpartitioned: true,
        ..config
    };
    assert_eq!(compute_key(&name("a.csv"), &allowed).unwrap().as_str(), "a.csv");
}

#[test]
fn zero_width_segments_are_rejected() {
    assert!(matches!(
        compute_key(&name("a.csv"), &PartitionConfig::nested(2, 0)),
        Err(CoreError::ZeroWidth { .. })
    ));
    assert!(matches!(
        compute_key(&name("a.csv"), &PartitionConfig::flat(0, HashAlgorithm::Md5)),
        Err(CoreError::ZeroWidth { .. })
    ));
}

#[test]
fn rendered_keys_reverse_to_the_object_name() {
    let schemes = [
        PartitionConfig::nested(2, 2),
        PartitionConfig::nested(3, 1),
        PartitionConfig::flat(4, HashAlgorithm::Sha256),
    ];
    for config in schemes {
        let key = compute_key(&name("report-final.v2.csv"), &config).unwrap();
        let recovered = strip_prefix(key.as_str(), &config.scheme).unwrap();
        assert_eq!(recovered.as_str(), "report-final.v2.csv");
    }
}

#[test]
fn strip_prefix_rejects_foreign_keys() {
    let scheme = PrefixScheme::Nested {
        depth: 2,
        chars_per_level: 2,
    };
    assert!(strip_prefix("plain.csv", &scheme).is_none());
    assert!(strip_prefix("zz/e4/plain.csv", &scheme).is_none());
    assert!(strip_prefix("ace/4/plain.csv", &scheme).is_none());
}

#[test]
fn key_under_partition_path() {
    let key = compute_key(&name("example_file.parquet"), &PartitionConfig::nested(2, 2)).unwrap();
    assert_eq!(
        key.under("raw/sales/year=2024/month=03/day=07/"),
        "raw/sales/year=2024/month=03/day=07/ac/e4/example_file.parquet"
    );
    assert_eq!(key.under(""), "ac/e4/example_file.parquet");
}
