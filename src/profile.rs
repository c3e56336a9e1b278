/// Shell profile export persistence.
///
/// Region and account id are persisted as `export KEY=value` lines in the
/// invoking user's shell profile. A re-run updates the existing line in
/// place; the file never accumulates duplicate exports for the same key.
use crate::error::Result;
use std::path::Path;

/// Write `export key=value` into the profile file, replacing any existing
/// export line for the same key. Creates the file if it does not exist.
pub fn persist_export(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let prefix = format!("export {}=", key);
    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| !line.trim_start().starts_with(&prefix))
        .map(String::from)
        .collect();

    lines.push(format!("export {}={}", key, value));

    let mut content = lines.join("\n");
    content.push('\n');

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;

    tracing::info!("[Profile] Persisted export {}={} to {:?}", key, value, path);
    Ok(())
}

/// Count export lines for a key. Used by tests and sanity checks.
pub fn export_count(content: &str, key: &str) -> usize {
    let prefix = format!("export {}=", key);
    content
        .lines()
        .filter(|line| line.trim_start().starts_with(&prefix))
        .count()
}
