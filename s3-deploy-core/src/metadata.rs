//! Per-file upload metadata: content encoding, content type and storage key.
//!
//! Everything here is a pure function of the file's relative path and its
//! resolved options.

use crate::options::ResolvedOptions;
use crate::paths::add_trailing_separator;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Returns the last extension of the file name, without the dot, or the one
/// before it when `previous` is set (`js` for `app.js.gz`). Missing extensions
/// resolve to `""`.
pub fn resolve_extension(file: &str, previous: bool) -> &str {
    let name = file.rsplit('/').next().unwrap_or(file);
    let parts: Vec<&str> = name.split('.').collect();
    let wanted = if previous { 3 } else { 2 };
    if parts.len() < wanted {
        return "";
    }
    parts[parts.len() + 1 - wanted]
}

/// Maps a compression suffix to its `Content-Encoding` token.
pub fn resolve_content_encoding(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "gz" | "gzip" => Some("gzip"),
        "br" => Some("br"),
        "zz" | "deflate" => Some("deflate"),
        "z" | "compress" => Some("compress"),
        _ => None,
    }
}

/// Logical folder used by the folder-by-type key layout.
pub fn resolve_directory_prefix(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "tif" | "tiff"
        | "avif" => "images",
        "js" | "mjs" | "cjs" | "map" | "ts" => "scripts",
        "css" | "scss" | "sass" | "less" => "styles",
        "woff" | "woff2" | "ttf" | "otf" | "eot" => "fonts",
        _ => "other",
    }
}

/// IANA media type for `extension`, from the `mime_guess` database.
pub fn resolve_mime_type(extension: &str) -> &'static str {
    if extension.is_empty() {
        return DEFAULT_MIME_TYPE;
    }
    mime_guess::from_ext(extension)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Everything the storage call needs to know about one file besides its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub key: String,
    pub content_encoding: Option<&'static str>,
    pub content_type: &'static str,
}

/// Resolves encoding, content type and key for `file`.
///
/// When the last extension is a compression suffix the content type and the
/// folder-by-type prefix come from the extension before it.
pub fn resolve_object_metadata(file: &str, options: &ResolvedOptions) -> ObjectMetadata {
    let mut extension = resolve_extension(file, false);
    let content_encoding = resolve_content_encoding(extension);
    if content_encoding.is_some() {
        extension = resolve_extension(file, true);
    }

    ObjectMetadata {
        key: derive_key(file, extension, options),
        content_encoding,
        content_type: resolve_mime_type(extension),
    }
}

/// `[base_path/][upload_folder/][type_folder/]file`, with one `/` per join.
pub fn derive_key(file: &str, extension: &str, options: &ResolvedOptions) -> String {
    let upload_key = if options.use_folders_for_file_types {
        format!("{}/{}", resolve_directory_prefix(extension), file)
    } else {
        file.to_string()
    };

    let base_path = options
        .base_path
        .as_deref()
        .map(add_trailing_separator)
        .unwrap_or_default();

    match options.upload_folder.as_deref() {
        Some(folder) => format!("{base_path}{folder}/{upload_key}"),
        None => format!("{base_path}{upload_key}"),
    }
}
