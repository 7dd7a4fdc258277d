//! Directory discovery and include/exclude filtering.

use std::path::Path;

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::DeployError;
use crate::options::Options;
use crate::paths::{add_leading_separator, add_trailing_separator};
use crate::rule::test_rule;

/// Files selected for upload, and the CDN path recorded for each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worklist {
    /// Relative, `/`-separated paths in traversal order.
    pub files: Vec<String>,
    /// `/`-prefixed, base-path-prefixed paths, one per entry in `files`.
    pub invalidation_paths: Vec<String>,
}

impl Worklist {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Recursively lists every regular file under `root` (symlinks to files included)
/// and keeps those that pass the include/exclude rules.
///
/// Exclusion wins over inclusion. Any traversal failure aborts discovery.
pub fn discover(root: &Path, options: &Options) -> Result<Worklist, DeployError> {
    info!(root = %root.display(), "[fs] Reading directory...");

    let base_path = options
        .defaults
        .base_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(add_trailing_separator)
        .unwrap_or_default();

    let mut worklist = Worklist::default();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            error!(root = %root.display(), error = %e, "Directory traversal failed");
            DeployError::DirectoryNotFound {
                path: root.to_path_buf(),
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file) = relative_posix_path(root, entry.path())? else {
            debug!(path = %entry.path().display(), "Skipping path outside root");
            continue;
        };

        if let Some(exclude) = &options.exclude {
            if test_rule(exclude, &file)? {
                debug!(file = %file, "Excluded");
                continue;
            }
        }
        if let Some(include) = &options.include {
            if !test_rule(include, &file)? {
                debug!(file = %file, "Not included");
                continue;
            }
        }

        worklist
            .invalidation_paths
            .push(add_leading_separator(&format!("{base_path}{file}")));
        worklist.files.push(file);
    }

    info!(files = worklist.len(), "[fs] Got files to upload");
    Ok(worklist)
}

/// `None` for the root itself or paths outside it.
fn relative_posix_path(root: &Path, path: &Path) -> Result<Option<String>, DeployError> {
    let Ok(relative) = path.strip_prefix(root) else {
        return Ok(None);
    };
    let mut parts = Vec::new();
    for component in relative.components() {
        let Some(part) = component.as_os_str().to_str() else {
            error!(path = %path.display(), "File name is not valid UTF-8");
            return Err(DeployError::NonUtf8Path {
                path: path.to_path_buf(),
            });
        };
        parts.push(part);
    }
    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parts.join("/")))
    }
}
