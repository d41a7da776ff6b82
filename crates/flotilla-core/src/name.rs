//! Application name inference
//!
//! Used when the manifest omits its `name` key. A manifest named with the
//! canonical stem (`flotilla.yaml`, `flotilla.yml`) takes its application
//! name from the directory that contains it; anything else uses the file
//! stem.

use std::path::Path;

/// File stem of a canonically named manifest
pub const CANONICAL_STEM: &str = "flotilla";

/// Infer an application name from the manifest's path
pub fn infer_application_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let raw = if stem.eq_ignore_ascii_case(CANONICAL_STEM) {
        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(stem)
    } else {
        stem
    };

    normalize_name(raw)
}

/// Normalize a raw name: lower-case, non-alphanumerics become dashes
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
