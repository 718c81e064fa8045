//! Rename rules for files in the pending list.

/// Extension of `name` including the dot (`"report.tar.gz"` → `".gz"`), or `None` without a dot.
pub fn file_extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|pos| &name[pos..])
}

/// Custom upload name from a user-edited base name: the base is trimmed and
/// the original file's extension re-appended. An empty base means no rename.
pub fn custom_file_name(original: &str, base: &str) -> Option<String> {
    let base = base.trim();
    if base.is_empty() {
        return None;
    }
    Some(match file_extension(original) {
        Some(ext) => format!("{base}{ext}"),
        None => base.to_string(),
    })
}
