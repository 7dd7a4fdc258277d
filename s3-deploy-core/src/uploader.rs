//! Uploads a single file: read bytes, resolve metadata, call the storage client.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error, info};

use crate::contract::{StorageClient, UploadRequest, UploadResult};
use crate::error::DeployError;
use crate::metadata::resolve_object_metadata;
use crate::options::{resolve_file_options, FilesOptions, ObjectOptions};

/// Completed-upload counter shared by all workers.
#[derive(Debug)]
pub struct ProgressState {
    total: usize,
    completed: AtomicUsize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }

    /// Records one completed upload and returns the new count.
    pub fn tick(&self) -> usize {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let percent = if self.total == 0 {
            100
        } else {
            completed * 100 / self.total
        };
        info!(completed, total = self.total, percent, "Uploading");
        completed
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Read-only inputs shared by every upload of a run.
#[derive(Debug, Clone)]
pub struct UploadContext {
    pub root: PathBuf,
    pub bucket: String,
    pub defaults: ObjectOptions,
    pub files_options: FilesOptions,
}

impl UploadContext {
    /// Builds the request for `file` from its bytes. Pure: no I/O.
    pub fn upload_request(&self, file: &str, body: Vec<u8>) -> UploadRequest {
        let options = resolve_file_options(&self.defaults, &self.files_options, file);
        let metadata = resolve_object_metadata(file, &options);
        UploadRequest {
            bucket: self.bucket.clone(),
            key: metadata.key,
            body,
            acl: options.acl,
            cache_control: options.cache_control,
            content_encoding: metadata.content_encoding.map(str::to_string),
            content_type: metadata.content_type.to_string(),
            expires: options.expires,
        }
    }
}

/// Uploads `file` (relative to `context.root`). No retry: the client error is returned as is.
pub async fn upload_file<S>(
    storage: &S,
    context: &UploadContext,
    file: &str,
    progress: &ProgressState,
) -> Result<UploadResult, DeployError>
where
    S: StorageClient + ?Sized,
{
    let path = context.root.join(file);
    let body = tokio::fs::read(&path).await.map_err(|source| {
        error!(file, error = %source, "Failed to read file for upload");
        DeployError::FileRead {
            path: path.clone(),
            source,
        }
    })?;

    let request = context.upload_request(file, body);
    let key = request.key.clone();
    debug!(
        file,
        key = %key,
        content_type = %request.content_type,
        content_encoding = ?request.content_encoding,
        bytes = request.body.len(),
        "Uploading file"
    );

    match storage.upload(request).await {
        Ok(location) => {
            progress.tick();
            Ok(UploadResult {
                file: file.to_string(),
                key,
                location,
            })
        }
        Err(source) => {
            error!(file, key = %key, error = %source, "Upload failed");
            Err(DeployError::Upload {
                file: file.to_string(),
                source,
            })
        }
    }
}
