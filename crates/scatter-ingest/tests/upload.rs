use std::path::PathBuf;
use std::sync::Arc;

use scatter_core::report::Outcome;
use scatter_core::{ObjectName, PartitionConfig, build_path, summarize};
use scatter_ingest::{
    ContentSource, IngestError, NoProgress, SourceFile, UploadPlan, list_source_dir, upload_all,
    upload_one,
};
use scatter_storage::memory::MemoryCloud;
use scatter_storage::{AccountParams, Container, DataCredential, ManagementPlane};

fn container(cloud: &MemoryCloud, hierarchical: bool) -> Arc<dyn Container> {
    let params = AccountParams {
        hierarchical_namespace: hierarchical,
        ..AccountParams::default()
    };
    cloud
        .add_resource_group("rg-datalake")
        .add_account("rg-datalake", "lakeacct", params)
        .add_container("lakeacct", "datalake");
    cloud
        .data_plane("rg-datalake", "lakeacct", DataCredential::Ambient)
        .unwrap()
        .open_container("datalake")
        .unwrap()
}

fn file(name: &str, body: &str) -> SourceFile {
    SourceFile::from_bytes(ObjectName::new(name).unwrap(), body.as_bytes().to_vec())
}

fn plan() -> UploadPlan {
    UploadPlan::new(
        PartitionConfig::nested(2, 2),
        Some(build_path("raw", "sales", "2024-03-07").unwrap()),
    )
}

#[tokio::test]
async fn upload_one_writes_under_partition_path() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);

    let result = upload_one(container.as_ref(), &file("example_file.parquet", "pq"), &plan()).await;

    let key = "raw/sales/year=2024/month=03/day=07/ac/e4/example_file.parquet";
    assert_eq!(result.outcome, Outcome::Succeeded);
    assert_eq!(result.key.as_deref(), Some(key));
    assert_eq!(cloud.object("lakeacct", "datalake", key), Some(b"pq".to_vec()));
}

#[tokio::test]
async fn unreadable_file_fails_alone_and_order_is_kept() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    let files = vec![
        file("e.csv", "5"),
        file("a.csv", "1"),
        SourceFile {
            name: ObjectName::new("c.csv").unwrap(),
            source: ContentSource::Path(PathBuf::from("/nonexistent/scatter/c.csv")),
        },
        file("d.csv", "4"),
        file("b.csv", "2"),
    ];

    let results = upload_all(container.as_ref(), files, &plan(), &mut NoProgress)
        .await
        .unwrap();

    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a.csv", "b.csv", "c.csv", "d.csv", "e.csv"]);
    let failed: Vec<_> = results.iter().filter(|r| !r.succeeded()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name.as_str(), "c.csv");
    assert!(matches!(&failed[0].outcome, Outcome::Failed { reason } if reason.starts_with("read failed")));

    let summary = summarize(&results);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(cloud.object_keys("lakeacct", "datalake").len(), 4);
}

#[tokio::test]
async fn rerun_overwrites_identical_keys() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    let batch = || vec![file("a.csv", "old"), file("b.csv", "old")];

    let first = upload_all(container.as_ref(), batch(), &plan(), &mut NoProgress)
        .await
        .unwrap();
    let second = upload_all(
        container.as_ref(),
        vec![file("a.csv", "new"), file("b.csv", "new")],
        &plan(),
        &mut NoProgress,
    )
    .await
    .unwrap();

    let keys = |results: &[scatter_core::UploadResult]| -> Vec<Option<String>> {
        results.iter().map(|r| r.key.clone()).collect()
    };
    assert_eq!(keys(first.as_slice()), keys(second.as_slice()));
    assert!(second.iter().all(|r| r.succeeded()));

    let stored = cloud.object_keys("lakeacct", "datalake");
    assert_eq!(stored.len(), 2);
    for key in stored {
        assert_eq!(cloud.object("lakeacct", "datalake", &key), Some(b"new".to_vec()));
    }
}

#[tokio::test]
async fn target_directory_is_created_once() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);

    for _ in 0..2 {
        upload_all(container.as_ref(), vec![file("a.csv", "1")], &plan(), &mut NoProgress)
            .await
            .unwrap();
    }

    assert_eq!(cloud.calls().directory_creates, 1);
    assert!(cloud.has_directory("lakeacct", "datalake", "raw/sales/year=2024/month=03/day=07"));
}

#[tokio::test]
async fn flat_namespace_skips_directory_creation() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, false);

    let results = upload_all(container.as_ref(), vec![file("a.csv", "1")], &plan(), &mut NoProgress)
        .await
        .unwrap();

    assert!(results[0].succeeded());
    assert_eq!(cloud.calls().directory_creates, 0);
}

#[tokio::test]
async fn rejected_write_is_isolated() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    cloud.reject_writes_ending_with("/b.csv");

    let files = vec![file("a.csv", "1"), file("b.csv", "2"), file("c.csv", "3")];
    let results = upload_all(container.as_ref(), files, &plan(), &mut NoProgress)
        .await
        .unwrap();

    let ok: Vec<_> = results.iter().map(|r| r.succeeded()).collect();
    assert_eq!(ok, [true, false, true]);
    // The key is known even though the write failed.
    assert!(results[1].key.as_deref().is_some_and(|k| k.ends_with("/b.csv")));
    assert_eq!(cloud.calls().object_writes, 3);
}

#[tokio::test]
async fn directory_failure_aborts_before_any_write() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    cloud.set_unreachable(true);

    let err = upload_all(container.as_ref(), vec![file("a.csv", "1")], &plan(), &mut NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Directory { .. }));
    assert_eq!(cloud.calls().object_writes, 0);
}

#[tokio::test]
async fn progress_reports_every_file() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    let mut seen = Vec::new();
    let mut record = |current: usize, total: usize, label: &str| {
        seen.push((current, total, label.to_string()));
    };

    upload_all(
        container.as_ref(),
        vec![file("b.csv", "2"), file("a.csv", "1")],
        &plan(),
        &mut record,
    )
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![(1, 2, "a.csv".to_string()), (2, 2, "b.csv".to_string())]
    );
}

#[tokio::test]
async fn without_partition_path_keys_sit_at_container_root() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    let plan = UploadPlan::new(PartitionConfig::nested(2, 2), None);

    let result = upload_one(container.as_ref(), &file("example_file.parquet", "pq"), &plan).await;

    assert_eq!(result.key.as_deref(), Some("ac/e4/example_file.parquet"));
    assert_eq!(cloud.calls().directory_creates, 0);
}

#[tokio::test]
async fn invalid_partition_config_fails_each_file_without_key() {
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);
    let plan = UploadPlan::new(PartitionConfig::nested(0, 2), None);

    let result = upload_one(container.as_ref(), &file("a.csv", "1"), &plan).await;

    assert!(!result.succeeded());
    assert_eq!(result.key, None);
    assert_eq!(cloud.calls().object_writes, 0);
}

#[tokio::test]
async fn source_dir_listing_is_sorted_and_files_only() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("b.json"), "{}").unwrap();
    std::fs::write(tmp.path().join("a.csv"), "x").unwrap();
    std::fs::create_dir(tmp.path().join("nested")).unwrap();
    std::fs::write(tmp.path().join("nested/inner.csv"), "y").unwrap();

    let files = list_source_dir(tmp.path()).await.unwrap();

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a.csv", "b.json"]);
    assert_eq!(files[0].source, ContentSource::Path(tmp.path().join("a.csv")));
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_files_are_listed() {
    let tmp = tempfile::tempdir().unwrap();
    let real = tmp.path().join("real");
    let source = tmp.path().join("source");
    std::fs::create_dir_all(&real).unwrap();
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(real.join("target.csv"), "id\n1\n").unwrap();
    std::fs::write(source.join("a.csv"), "x").unwrap();
    std::os::unix::fs::symlink("../real/target.csv", source.join("linked.csv")).unwrap();
    std::os::unix::fs::symlink("../real", source.join("linked-dir")).unwrap();
    std::os::unix::fs::symlink("../real/gone.csv", source.join("dangling.csv")).unwrap();

    let files = list_source_dir(&source).await.unwrap();

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a.csv", "linked.csv"]);
    assert_eq!(files[1].source, ContentSource::Path(source.join("linked.csv")));
}

#[tokio::test]
async fn missing_source_dir_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();

    let err = list_source_dir(&tmp.path().join("absent")).await.unwrap_err();

    assert!(matches!(err, IngestError::SourceDir { .. }));
}

#[tokio::test]
async fn listed_files_upload_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("orders.csv"), "id\n1\n").unwrap();
    let cloud = MemoryCloud::new();
    let container = container(&cloud, true);

    let files = list_source_dir(tmp.path()).await.unwrap();
    let results = upload_all(container.as_ref(), files, &plan(), &mut NoProgress)
        .await
        .unwrap();

    let key = "raw/sales/year=2024/month=03/day=07/50/72/orders.csv";
    assert_eq!(results[0].key.as_deref(), Some(key));
    assert_eq!(cloud.object("lakeacct", "datalake", key), Some(b"id\n1\n".to_vec()));
}
