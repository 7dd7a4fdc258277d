//! Key-path normalisation helpers.

/// Ensures exactly one `/` sits right before the first `?`/`#` suffix, or at the end
/// when there is none. An empty path is returned unchanged.
pub fn add_trailing_separator(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let suffix_at = path.find(['?', '#']).unwrap_or(path.len());
    let (head, suffix) = path.split_at(suffix_at);
    let head = head.strip_suffix('/').unwrap_or(head);
    format!("{head}/{suffix}")
}

/// Prepends `/` to a non-empty path that does not already start with one.
pub fn add_leading_separator(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
