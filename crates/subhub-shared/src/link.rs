use crate::constants::{DEFAULT_BACKEND, SUB_ROUTE_PREFIX};
use crate::types::FileId;

/// `<base>/api/sub/<id>`, with any trailing slash on `base` dropped.
pub fn subscription_url(base: &str, id: &FileId) -> String {
    format!("{}{}{}", base.trim_end_matches('/'), SUB_ROUTE_PREFIX, id)
}

/// Pull the file ID out of a link previously returned by the upload API.
///
/// The ID is the path segment after `/api/sub/`, up to the next `/`, `?` or
/// `#`. Returns `None` when the link has no such segment or it is not a
/// valid file ID.
pub fn extract_file_id(link: &str) -> Option<FileId> {
    let start = link.find(SUB_ROUTE_PREFIX)? + SUB_ROUTE_PREFIX.len();
    let rest = &link[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    FileId::parse(&rest[..end]).ok()
}

/// Split a pipe-delimited backend list, falling back to the local default.
pub fn parse_backends(raw: Option<&str>) -> Vec<String> {
    let backends: Vec<String> = raw
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if backends.is_empty() {
        vec![DEFAULT_BACKEND.to_string()]
    } else {
        backends
    }
}
