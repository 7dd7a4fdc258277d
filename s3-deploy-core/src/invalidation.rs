//! Decides whether, and for which paths, to invalidate the CDN after a run.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::contract::{CdnClient, InvalidationCheck, InvalidationRequest};
use crate::error::DeployError;

/// Sentinel meaning "invalidate exactly what was uploaded".
pub const AUTO_SENTINEL: &str = "auto";

/// What to invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInvalidationPath", into = "RawInvalidationPath")]
pub enum InvalidationPath {
    Auto,
    Paths(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawInvalidationPath {
    Single(String),
    List(Vec<String>),
}

impl From<RawInvalidationPath> for InvalidationPath {
    fn from(raw: RawInvalidationPath) -> Self {
        match raw {
            RawInvalidationPath::Single(s) if s == AUTO_SENTINEL => InvalidationPath::Auto,
            RawInvalidationPath::Single(s) => InvalidationPath::Paths(vec![s]),
            RawInvalidationPath::List(paths) => InvalidationPath::Paths(paths),
        }
    }
}

impl From<InvalidationPath> for RawInvalidationPath {
    fn from(path: InvalidationPath) -> Self {
        match path {
            InvalidationPath::Auto => RawInvalidationPath::Single(AUTO_SENTINEL.to_string()),
            InvalidationPath::Paths(paths) => RawInvalidationPath::List(paths),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidationConfig {
    pub distribution_id: Option<String>,
    pub invalidation_path: Option<InvalidationPath>,
}

/// Builds the invalidation request for a successful upload phase, if any.
///
/// Branches, first match wins:
/// 1. `check` passes: the explicit list (recorded paths if the setting is `auto`).
/// 2. distribution id set, setting is `auto`, and something was recorded: the recorded paths.
/// 3. otherwise nothing.
pub fn plan_invalidation(
    config: Option<&InvalidationConfig>,
    check: &dyn InvalidationCheck,
    recorded_paths: &[String],
) -> Option<InvalidationRequest> {
    let config = config?;
    let distribution_id = config.distribution_id.as_deref().filter(|id| !id.is_empty());

    if check.is_explicit(config) {
        let Some(distribution_id) = distribution_id else {
            warn!("Invalidation config passed the explicit check but has no distribution id; skipping");
            return None;
        };
        let paths = match &config.invalidation_path {
            Some(InvalidationPath::Paths(paths)) => paths.clone(),
            Some(InvalidationPath::Auto) | None => recorded_paths.to_vec(),
        };
        return Some(InvalidationRequest {
            distribution_id: distribution_id.to_string(),
            paths,
        });
    }

    match (distribution_id, &config.invalidation_path) {
        (Some(distribution_id), Some(InvalidationPath::Auto)) if !recorded_paths.is_empty() => {
            Some(InvalidationRequest {
                distribution_id: distribution_id.to_string(),
                paths: recorded_paths.to_vec(),
            })
        }
        _ => None,
    }
}

/// Sends one invalidation request and returns the invalidation id.
pub async fn trigger_invalidation<C>(
    cdn: &C,
    request: InvalidationRequest,
) -> Result<String, DeployError>
where
    C: CdnClient + ?Sized,
{
    let distribution_id = request.distribution_id.clone();
    info!(
        distribution_id = %distribution_id,
        paths = request.paths.len(),
        "[network] Creating CDN invalidation"
    );
    match cdn.create_invalidation(request).await {
        Ok(id) => {
            info!(distribution_id = %distribution_id, invalidation_id = %id, "[result] CDN invalidation created");
            Ok(id)
        }
        Err(source) => {
            error!(distribution_id = %distribution_id, error = %source, "CDN invalidation failed");
            Err(DeployError::Invalidation {
                distribution_id,
                source,
            })
        }
    }
}
