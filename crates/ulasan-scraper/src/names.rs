//! File name sanitizing shared by scrape output and downloads.

use std::path::Path;

/// Replace every char outside `[A-Za-z0-9_.-]` with `_`.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Output file name for a scrape: `"{job_id}-{sanitized filename}"`.
#[must_use]
pub fn job_file_name(job_id: &str, filename: &str) -> String {
    format!("{job_id}-{}", sanitize_file_name(filename))
}

/// Reduce a client-supplied download name to a bare file name.
///
/// Chars outside `[A-Za-z0-9_./-]` become `_`, then only the final path
/// component is kept. Returns `None` when nothing usable remains (for
/// example `..` or a trailing `/`).
#[must_use]
pub fn download_file_name(requested: &str) -> Option<String> {
    let safe: String = requested
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.ends_with('/') {
        return None;
    }
    Path::new(&safe)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
}
