use std::collections::HashSet;
use std::fs::write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use s3_deploy_core::contract::{MockStorageClient, StorageClient, UploadRequest};
use s3_deploy_core::error::{BoxError, DeployError};
use s3_deploy_core::options::FilesOptions;
use s3_deploy_core::pipeline::run_pipeline;
use s3_deploy_core::uploader::{ProgressState, UploadContext};
use tempfile::tempdir;

/// Storage fake that sleeps per upload and records the peak number of concurrent calls.
#[derive(Default)]
struct SlowStorage {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    fail_key: Option<String>,
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl StorageClient for SlowStorage {
    async fn upload(&self, request: UploadRequest) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_key.as_deref() == Some(request.key.as_str()) {
            return Err(format!("rejected {}", request.key).into());
        }
        self.keys.lock().unwrap().push(request.key.clone());
        Ok(format!("https://bucket.example/{}", request.key))
    }
}

fn write_files(root: &Path, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let name = format!("file{i}.txt");
            write(root.join(&name), format!("content {i}")).unwrap();
            name
        })
        .collect()
}

fn context(root: &Path) -> Arc<UploadContext> {
    Arc::new(UploadContext {
        root: root.to_path_buf(),
        bucket: "bucket".into(),
        defaults: Default::default(),
        files_options: FilesOptions::new(),
    })
}

#[tokio::test]
async fn never_exceeds_the_concurrency_ceiling() {
    let tmp = tempdir().unwrap();
    let files = write_files(tmp.path(), 10);
    let storage = Arc::new(SlowStorage::default());
    let progress = Arc::new(ProgressState::new(files.len()));

    let results = run_pipeline(
        Arc::clone(&storage),
        context(tmp.path()),
        files.clone(),
        2,
        Arc::clone(&progress),
    )
    .await
    .expect("pipeline should succeed");

    assert_eq!(results.len(), 10);
    assert!(storage.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(storage.peak.load(Ordering::SeqCst), 2);
    assert_eq!(progress.completed(), 10);

    let uploaded: HashSet<_> = results.iter().map(|r| r.file.clone()).collect();
    let expected: HashSet<_> = files.into_iter().collect();
    assert_eq!(uploaded, expected);
    for result in &results {
        assert_eq!(result.location, format!("https://bucket.example/{}", result.key));
    }
}

#[tokio::test]
async fn zero_concurrency_is_clamped_to_one() {
    let tmp = tempdir().unwrap();
    let files = write_files(tmp.path(), 3);
    let storage = Arc::new(SlowStorage::default());

    let results = run_pipeline(
        Arc::clone(&storage),
        context(tmp.path()),
        files,
        0,
        Arc::new(ProgressState::new(3)),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(storage.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_failure_stops_admitting_new_work() {
    let tmp = tempdir().unwrap();
    let files = write_files(tmp.path(), 10);
    let storage = Arc::new(SlowStorage {
        fail_key: Some("file0.txt".into()),
        ..Default::default()
    });
    let progress = Arc::new(ProgressState::new(files.len()));

    let err = run_pipeline(
        Arc::clone(&storage),
        context(tmp.path()),
        files,
        1,
        Arc::clone(&progress),
    )
    .await
    .unwrap_err();

    match err {
        DeployError::Upload { file, source } => {
            assert_eq!(file, "file0.txt");
            assert!(source.to_string().contains("rejected file0.txt"));
        }
        other => panic!("expected Upload error, got {other:?}"),
    }
    assert_eq!(storage.calls.load(Ordering::SeqCst), 1);
    assert_eq!(progress.completed(), 0);
}

#[tokio::test]
async fn unreadable_file_is_a_file_read_error() {
    let tmp = tempdir().unwrap();
    let mut storage = MockStorageClient::new();
    storage.expect_upload().times(0);

    let err = run_pipeline(
        Arc::new(storage),
        context(tmp.path()),
        vec!["vanished.txt".to_string()],
        4,
        Arc::new(ProgressState::new(1)),
    )
    .await
    .unwrap_err();

    match err {
        DeployError::FileRead { path, .. } => assert!(path.ends_with("vanished.txt")),
        other => panic!("expected FileRead error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_worklist_uploads_nothing() {
    let tmp = tempdir().unwrap();
    let mut storage = MockStorageClient::new();
    storage.expect_upload().times(0);

    let results = run_pipeline(
        Arc::new(storage),
        context(tmp.path()),
        vec![],
        100,
        Arc::new(ProgressState::new(0)),
    )
    .await
    .unwrap();
    assert!(results.is_empty());
}
