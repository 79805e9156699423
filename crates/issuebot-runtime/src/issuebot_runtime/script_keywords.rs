use std::path::Path;

use anyhow::{Context, Result};

/// File names in `dir` ending with `extension`, sorted, for the `scripts` label keywords.
pub(crate) fn script_keywords_from_dir(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read scripts dir {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if !file_type.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        if name.ends_with(extension) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
