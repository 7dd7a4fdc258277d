//! High-level pipeline: orchestrates discover → upload → invalidate for one directory.
//!
//! This module provides the top-level entrypoint used by the CLI and by
//! integration tests. A run:
//!   - Validates include/exclude rules, so a bad rule fails before any I/O
//!   - Discovers and filters files under the root directory ([`walker`](crate::walker))
//!   - Uploads them with bounded concurrency ([`pipeline`](crate::pipeline))
//!   - Plans and, when warranted, creates one CDN invalidation ([`invalidation`](crate::invalidation))
//!
//! # Error Handling
//! Fail-fast: the first error of any step is the run's error. Uploads that
//! completed before a failure are not rolled back, and no invalidation is
//! attempted unless every upload succeeded.
//!
//! # Navigation
//! - Main entrypoint: [`deploy`]
//! - Supporting types: [`DeployConfig`], [`DeployReport`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::contract::{CdnClient, InvalidationCheck, StorageClient, UploadResult};
use crate::error::DeployError;
use crate::invalidation::{plan_invalidation, trigger_invalidation, InvalidationConfig};
use crate::options::{FilesOptions, Options};
use crate::pipeline::{run_pipeline, DEFAULT_CONCURRENCY};
use crate::uploader::{ProgressState, UploadContext};
use crate::walker::discover;

/// Everything one deploy run needs, apart from the collaborators.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub directory: PathBuf,
    pub bucket: String,
    pub options: Options,
    pub files_options: FilesOptions,
    pub invalidation: Option<InvalidationConfig>,
    pub concurrency: usize,
}

impl DeployConfig {
    pub fn new(directory: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            bucket: bucket.into(),
            options: Options::default(),
            files_options: FilesOptions::new(),
            invalidation: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            directory = %self.directory.display(),
            bucket = %self.bucket,
            concurrency = self.concurrency,
            file_overrides = self.files_options.len(),
            invalidation = self.invalidation.is_some(),
            "Loaded DeployConfig"
        );
        debug!(?self, "DeployConfig loaded (full debug)");
    }
}

#[derive(Debug)]
pub struct DeployReport {
    /// Uploaded files in completion order.
    pub uploaded: Vec<UploadResult>,
    pub invalidation_id: Option<String>,
}

impl DeployReport {
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.uploaded.iter().map(|r| r.location.as_str())
    }
}

pub async fn deploy<S, C>(
    config: &DeployConfig,
    storage: Arc<S>,
    cdn: &C,
    check: &dyn InvalidationCheck,
) -> Result<DeployReport, DeployError>
where
    S: StorageClient + ?Sized + 'static,
    C: CdnClient + ?Sized,
{
    info!(directory = %config.directory.display(), bucket = %config.bucket, "[DEPLOY] Starting deploy");

    for rule in [&config.options.include, &config.options.exclude]
        .into_iter()
        .flatten()
    {
        rule.validate().map_err(|e| {
            error!(error = %e, "[DEPLOY][ERROR] Invalid include / exclude rule");
            e
        })?;
    }

    let worklist = discover(&config.directory, &config.options)?;

    let context = Arc::new(UploadContext {
        root: config.directory.clone(),
        bucket: config.bucket.clone(),
        defaults: config.options.defaults.clone(),
        files_options: config.files_options.clone(),
    });
    let progress = Arc::new(ProgressState::new(worklist.len()));

    let uploaded = run_pipeline(
        storage,
        context,
        worklist.files.clone(),
        config.concurrency,
        Arc::clone(&progress),
    )
    .await?;

    for result in &uploaded {
        match serde_json::to_string(result) {
            Ok(json) => debug!(json = %json, "[result] Uploaded file"),
            Err(e) => error!(file = %result.file, error = ?e, "Failed to serialize UploadResult as JSON"),
        }
    }
    info!(
        urls = %uploaded.iter().map(|r| r.location.as_str()).collect::<Vec<_>>().join("\n"),
        "[result] URLs of uploaded files"
    );

    let invalidation_id = match plan_invalidation(
        config.invalidation.as_ref(),
        check,
        &worklist.invalidation_paths,
    ) {
        Some(request) => Some(trigger_invalidation(cdn, request).await?),
        None => {
            info!("[DEPLOY] No CDN invalidation requested");
            None
        }
    };

    Ok(DeployReport {
        uploaded,
        invalidation_id,
    })
}
