//! # contract: collaborator interfaces for the deploy pipeline
//!
//! The core never talks to a cloud provider directly. It drives two narrow,
//! async collaborators:
//! - [`StorageClient`]: stores one object per call and returns its public location.
//! - [`CdnClient`]: creates one cache invalidation per run, at most.
//!
//! and one synchronous policy hook, [`InvalidationCheck`], which decides whether
//! the configured invalidation carries an explicit path list.
//!
//! ## Mocking & Testing
//! - Both async traits are annotated for `mockall` (`MockStorageClient`,
//!   `MockCdnClient`), exported under the `test-export-mocks` feature.
//! - Errors are boxed trait objects; the core wraps them into
//!   [`DeployError`](crate::error::DeployError) without altering them.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

use crate::error::BoxError;
use crate::invalidation::{InvalidationConfig, InvalidationPath};

/// Fully resolved parameters for one object upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub acl: String,
    pub cache_control: String,
    /// Set only when the file carries a compression suffix.
    pub content_encoding: Option<String>,
    pub content_type: String,
    /// Expiry in seconds from upload time.
    pub expires: u64,
}

/// Outcome of one successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Relative path of the local file.
    pub file: String,
    pub key: String,
    /// Public URL / location reported by the storage client.
    pub location: String,
}

/// One CDN invalidation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub paths: Vec<String>,
}

/// Object storage the files are uploaded to.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload one object, returning its public location.
    async fn upload(&self, request: UploadRequest) -> Result<String, BoxError>;
}

/// CDN whose edge cache is invalidated after a successful upload.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CdnClient: Send + Sync {
    /// Create an invalidation, returning its identifier.
    async fn create_invalidation(&self, request: InvalidationRequest) -> Result<String, BoxError>;
}

/// Decides whether an invalidation config explicitly names what to invalidate.
///
/// Checked before the `auto` sentinel. Closures of the right shape implement it.
pub trait InvalidationCheck: Send + Sync {
    fn is_explicit(&self, config: &InvalidationConfig) -> bool;
}

impl<F> InvalidationCheck for F
where
    F: Fn(&InvalidationConfig) -> bool + Send + Sync,
{
    fn is_explicit(&self, config: &InvalidationConfig) -> bool {
        self(config)
    }
}

/// Passes when a distribution id and a non-empty explicit path list are both configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitPathsCheck;

impl InvalidationCheck for ExplicitPathsCheck {
    fn is_explicit(&self, config: &InvalidationConfig) -> bool {
        let has_distribution = config
            .distribution_id
            .as_deref()
            .is_some_and(|id| !id.is_empty());
        let has_paths = matches!(
            &config.invalidation_path,
            Some(InvalidationPath::Paths(paths)) if !paths.is_empty()
        );
        has_distribution && has_paths
    }
}
