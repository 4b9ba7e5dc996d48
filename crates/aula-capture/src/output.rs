//! Recording artifact paths.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Reduce a lecture name to a single safe path component.
///
/// Path separators and NUL are replaced, and names that would escape the
/// storage root (`.`, `..`, empty after trimming) collapse to a placeholder.
/// Everything else — umlauts, spaces, parentheses — passes through, since
/// lecture names become human-browsed directories.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    let trimmed = cleaned.trim();
    match trimmed {
        "" | "." | ".." => "unnamed".to_string(),
        other => other.to_string(),
    }
}

/// `<root>/<lecture>/recording_<room>_<YYYY-MM-DD_HH-MM-SS>.mp4`
///
/// Second-resolution timestamps keep firings of the same job distinct; two
/// firings of one room within the same second is the only collision, which
/// weekly granularity rules out.
pub fn recording_path(root: &Path, lecture: &str, room_id: &str, at: NaiveDateTime) -> PathBuf {
    root.join(sanitize_component(lecture)).join(format!(
        "recording_{}_{}.mp4",
        room_id,
        at.format("%Y-%m-%d_%H-%M-%S")
    ))
}
