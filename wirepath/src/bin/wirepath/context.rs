use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project context for wirepath operations
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to the config file, whether or not it exists
    pub config_path: PathBuf,
    pub config: WirepathConfig,
}

/// Configuration stored in .wirepath/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WirepathConfig {
    #[serde(default)]
    pub scan: ScanSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Directories searched for models, relative to the project root
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<String>,
    /// Derive name that marks a struct as a model
    #[serde(default = "default_derive")]
    pub derive: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
            derive: default_derive(),
        }
    }
}

fn default_search_dirs() -> Vec<String> {
    vec!["src".to_string(), "tests".to_string()]
}

fn default_derive() -> String {
    "WireModel".to_string()
}

impl ProjectContext {
    /// Load the project at `root`, or the one enclosing the current directory.
    pub fn find(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::from_root(root.to_path_buf()),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                Self::from_root(Self::find_project_root(&current_dir)?)
            }
        }
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        if !project_root.is_dir() {
            anyhow::bail!("Project directory {} does not exist", project_root.display());
        }
        let config_path = project_root.join(".wirepath").join("config.toml");

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            log::debug!("no config at {}, using defaults", config_path.display());
            WirepathConfig::default()
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    /// Find project root by looking for Cargo.toml
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join("Cargo.toml").exists() {
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Pass --project or set WIREPATH_PROJECT."
                );
            }
        }
    }

    pub fn has_config(&self) -> bool {
        self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WirepathConfig::default();
        assert_eq!(config.scan.search_dirs, ["src", "tests"]);
        assert_eq!(config.scan.derive, "WireModel");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: WirepathConfig = toml::from_str("[scan]\nsearch_dirs = [\"crates\"]\n").unwrap();
        assert_eq!(config.scan.search_dirs, ["crates"]);
        assert_eq!(config.scan.derive, "WireModel");
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&WirepathConfig::default()).unwrap();
        assert!(toml_str.contains("search_dirs"));
        assert!(toml_str.contains("derive"));
    }

    #[test]
    fn test_loads_config_from_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".wirepath")).unwrap();
        std::fs::write(
            dir.path().join(".wirepath/config.toml"),
            "[scan]\nderive = \"Document\"\n",
        )
        .unwrap();

        let ctx = ProjectContext::find(Some(dir.path())).unwrap();
        assert!(ctx.has_config());
        assert_eq!(ctx.config.scan.derive, "Document");
        assert_eq!(ctx.config.scan.search_dirs, ["src", "tests"]);
    }

    #[test]
    fn test_missing_project_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProjectContext::find(Some(&dir.path().join("nope"))).is_err());
    }
}
