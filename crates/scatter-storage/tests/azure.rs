//! Client construction and local checks. Nothing here reaches the network.

use scatter_storage::azure::{AzureAuth, AzureDataPlane};
use scatter_storage::{AccountKey, DataCredential, DataPlane, StorageError};

const CONNECTION_STRING: &str = "DefaultEndpointsProtocol=https;AccountName=otheracct;\
AccountKey=c2VjcmV0;EndpointSuffix=core.windows.net";

fn keyed(hierarchical: bool) -> AzureDataPlane {
    AzureDataPlane::connect(
        "lakeacct",
        AzureAuth::Credential(DataCredential::AccountKey(AccountKey {
            name: "key1".into(),
            value: "c2VjcmV0".into(),
        })),
        hierarchical,
    )
    .unwrap()
}

#[test]
fn connection_string_names_the_account() {
    let plane = AzureDataPlane::connect(
        "lakeacct",
        AzureAuth::ConnectionString(CONNECTION_STRING.into()),
        true,
    )
    .unwrap();
    assert_eq!(plane.account(), "otheracct");
}

#[test]
fn connection_string_without_account_is_rejected() {
    let result = AzureDataPlane::connect(
        "lakeacct",
        AzureAuth::ConnectionString("AccountKey=c2VjcmV0".into()),
        true,
    );
    assert!(matches!(result, Err(StorageError::Unauthorized(_))));
}

#[test]
fn account_key_keeps_configured_account() {
    assert_eq!(keyed(true).account(), "lakeacct");
}

#[test]
fn container_handle_reports_namespace_kind() {
    let hns = keyed(true).open_container("bronze").unwrap();
    assert_eq!(hns.name(), "bronze");
    assert!(hns.is_hierarchical());

    let flat = keyed(false).open_container("bronze").unwrap();
    assert!(!flat.is_hierarchical());
}

#[tokio::test]
async fn invalid_keys_fail_before_any_request() {
    let container = keyed(true).open_container("bronze").unwrap();

    let err = container
        .write_object("raw/../escape.csv", b"x".to_vec(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));

    let err = container.create_directory("/abs").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));
}

#[tokio::test]
async fn flat_namespace_has_implicit_directories() {
    let container = keyed(false).open_container("bronze").unwrap();
    assert!(container.directory_exists("raw/sales").await.unwrap());
    container.create_directory("raw/sales").await.unwrap();
}
