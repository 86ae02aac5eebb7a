//! File discovery for finding Rust files that declare models.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::context::ScanSettings;

#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to project root
    pub relative_path: String,
}

/// Discover `.rs` files under the configured search directories that mention
/// the model derive.
///
/// This is a text check; the parser decides which structs actually derive it.
pub fn discover_models(project_root: &Path, settings: &ScanSettings) -> Result<Vec<DiscoveredFile>> {
    let mut discovered = Vec::new();

    for dir in &settings.search_dirs {
        let search_path = project_root.join(dir);
        if !search_path.exists() {
            log::debug!("search dir {} does not exist", search_path.display());
            continue;
        }

        for entry in WalkDir::new(&search_path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }

            // Skip hidden files and directories below the project root
            let relative = path.strip_prefix(project_root).unwrap_or(path);
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            {
                continue;
            }

            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            if content.contains(settings.derive.as_str()) {
                discovered.push(DiscoveredFile {
                    path: path.to_path_buf(),
                    relative_path: relative.to_string_lossy().to_string(),
                });
            }
        }
    }

    // Sort by relative path for consistent ordering
    discovered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    discovered.dedup_by(|a, b| a.relative_path == b.relative_path);

    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_files_mentioning_the_derive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::create_dir_all(root.join("src/.hidden")).unwrap();
        fs::create_dir_all(root.join("tests")).unwrap();
        fs::write(root.join("src/models/user.rs"), "#[derive(WireModel)] struct User {}").unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod models;").unwrap();
        fs::write(root.join("src/.hidden/x.rs"), "#[derive(WireModel)] struct X {}").unwrap();
        fs::write(root.join("src/notes.txt"), "WireModel").unwrap();
        fs::write(root.join("tests/order.rs"), "#[derive(WireModel)] struct Order {}").unwrap();

        let found = discover_models(root, &ScanSettings::default()).unwrap();
        let paths: Vec<_> = found.iter().map(|f| f.relative_path.replace('\\', "/")).collect();
        assert_eq!(paths, ["src/models/user.rs", "tests/order.rs"]);
    }

    #[test]
    fn honours_configured_dirs_and_derive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("crates/api")).unwrap();
        fs::write(root.join("src/a.rs"), "#[derive(WireModel)] struct A {}").unwrap();
        fs::write(root.join("crates/api/b.rs"), "#[derive(Document)] struct B {}").unwrap();

        let settings = ScanSettings {
            search_dirs: vec!["crates".to_string(), "missing".to_string()],
            derive: "Document".to_string(),
        };
        let found = discover_models(root, &settings).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].relative_path.ends_with("b.rs"));
    }
}
