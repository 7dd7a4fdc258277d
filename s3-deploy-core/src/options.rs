//! Global and per-file upload options.
//!
//! Per-file overrides are merged over the global [`ObjectOptions`] field by field
//! (override wins), then defaults are applied to yield an immutable
//! [`ResolvedOptions`] for that one file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rule::Rule;

pub const DEFAULT_ACL: &str = "public-read";
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";
/// One year, in seconds.
pub const DEFAULT_EXPIRES: u64 = 31_536_000;

/// Object-level settings that may be set globally and overridden per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectOptions {
    pub acl: Option<String>,
    pub cache_control: Option<String>,
    /// Expiry, in seconds from upload time.
    pub expires: Option<u64>,
    pub use_folders_for_file_types: Option<bool>,
    pub base_path: Option<String>,
    pub upload_folder: Option<String>,
}

impl ObjectOptions {
    /// Field-wise merge: any field set on `overrides` replaces the one on `self`.
    pub fn merged_with(&self, overrides: &ObjectOptions) -> ObjectOptions {
        ObjectOptions {
            acl: overrides.acl.clone().or_else(|| self.acl.clone()),
            cache_control: overrides
                .cache_control
                .clone()
                .or_else(|| self.cache_control.clone()),
            expires: overrides.expires.or(self.expires),
            use_folders_for_file_types: overrides
                .use_folders_for_file_types
                .or(self.use_folders_for_file_types),
            base_path: overrides.base_path.clone().or_else(|| self.base_path.clone()),
            upload_folder: overrides
                .upload_folder
                .clone()
                .or_else(|| self.upload_folder.clone()),
        }
    }

    /// Applies defaults. Empty strings and a zero expiry count as unset.
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            acl: non_empty(&self.acl).unwrap_or(DEFAULT_ACL).to_string(),
            cache_control: non_empty(&self.cache_control)
                .unwrap_or(DEFAULT_CACHE_CONTROL)
                .to_string(),
            expires: self.expires.filter(|secs| *secs > 0).unwrap_or(DEFAULT_EXPIRES),
            use_folders_for_file_types: self.use_folders_for_file_types.unwrap_or(false),
            base_path: non_empty(&self.base_path).map(str::to_string),
            upload_folder: non_empty(&self.upload_folder).map(str::to_string),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Fully resolved options for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub acl: String,
    pub cache_control: String,
    pub expires: u64,
    pub use_folders_for_file_types: bool,
    pub base_path: Option<String>,
    pub upload_folder: Option<String>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        ObjectOptions::default().resolve()
    }
}

/// Per-file overrides keyed by the file's relative path.
pub type FilesOptions = HashMap<String, ObjectOptions>;

/// Global options for a run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub defaults: ObjectOptions,
    pub include: Option<Rule>,
    pub exclude: Option<Rule>,
}

/// Merges the override for `file` (if any) over `defaults` and resolves the result.
pub fn resolve_file_options(
    defaults: &ObjectOptions,
    files_options: &FilesOptions,
    file: &str,
) -> ResolvedOptions {
    match files_options.get(file) {
        Some(overrides) => {
            debug!(file, ?overrides, "Applying per-file option overrides");
            defaults.merged_with(overrides).resolve()
        }
        None => defaults.resolve(),
    }
}
