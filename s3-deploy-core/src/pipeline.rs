//! Bounded-concurrency upload pipeline.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::contract::{StorageClient, UploadResult};
use crate::error::DeployError;
use crate::uploader::{upload_file, ProgressState, UploadContext};

/// Default ceiling on simultaneous in-flight uploads.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Uploads every file in `files`, keeping at most `concurrency` uploads in flight.
///
/// Results come back in completion order. On the first failure no further
/// uploads are started; uploads already in flight are detached and left to
/// finish in the background, and that first error is returned.
pub async fn run_pipeline<S>(
    storage: Arc<S>,
    context: Arc<UploadContext>,
    files: Vec<String>,
    concurrency: usize,
    progress: Arc<ProgressState>,
) -> Result<Vec<UploadResult>, DeployError>
where
    S: StorageClient + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    info!(
        files = files.len(),
        concurrency, "[network] Upload files..."
    );

    let mut queue = files.into_iter();
    let mut joinset = JoinSet::new();
    let mut uploaded = Vec::with_capacity(queue.len());

    loop {
        while joinset.len() < concurrency {
            let Some(file) = queue.next() else {
                break;
            };
            debug!(file = %file, in_flight = joinset.len(), "Starting upload");
            let storage = Arc::clone(&storage);
            let context = Arc::clone(&context);
            let progress = Arc::clone(&progress);
            joinset.spawn(async move {
                upload_file(storage.as_ref(), &context, &file, &progress).await
            });
        }

        let Some(joined) = joinset.join_next().await else {
            break;
        };

        let outcome = joined
            .map_err(|e| DeployError::Task(e.to_string()))
            .and_then(|result| result);
        match outcome {
            Ok(result) => uploaded.push(result),
            Err(e) => {
                error!(
                    error = %e,
                    in_flight = joinset.len(),
                    pending = queue.len(),
                    "Upload failed; not starting remaining uploads"
                );
                joinset.detach_all();
                return Err(e);
            }
        }
    }

    info!(uploaded = uploaded.len(), "All files uploaded successfully");
    Ok(uploaded)
}
