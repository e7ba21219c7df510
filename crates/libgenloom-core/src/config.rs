use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenloomError;

pub const CONFIG_FILE: &str = "genloom.toml";

/// Project-level configuration stored next to the project file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenloomConfig {
    /// Name used when publishing job results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Options for writing a project out to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Write `.keep` sentinels as real files instead of just empty directories
    pub include_sentinels: bool,
    /// Decode image markers into the raw image bytes
    pub decode_images: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_sentinels: false,
            decode_images: true,
        }
    }
}

impl GenloomConfig {
    /// Project name, falling back to the name of the directory holding `project_file`
    pub fn resolve_project_name(&self, project_file: &Path) -> String {
        if let Some(name) = &self.project_name {
            return name.clone();
        }
        project_file
            .parent()
            .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
            .and_then(|dir| dir.canonicalize().ok())
            .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "untitled".to_string())
    }
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Load config from `<dir>/genloom.toml`
pub fn load_config(dir: &Path) -> Result<Option<GenloomConfig>, GenloomError> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    let config: GenloomConfig = toml::from_str(&content)?;
    Ok(Some(config))
}

/// Save config to `<dir>/genloom.toml`
pub fn save_config(dir: &Path, config: &GenloomConfig) -> Result<(), GenloomError> {
    std::fs::create_dir_all(dir)?;
    let content = toml::to_string_pretty(config)?;
    std::fs::write(config_path(dir), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let config = GenloomConfig {
            project_name: Some("shop".to_string()),
            export: ExportConfig {
                include_sentinels: true,
                decode_images: false,
            },
        };

        save_config(dir.path(), &config).unwrap();
        let loaded = load_config(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_config() {
        let dir = tempdir().unwrap();
        assert!(load_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(config_path(dir.path()), "project_name = \"blog\"\n").unwrap();
        let loaded = load_config(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.project_name.as_deref(), Some("blog"));
        assert_eq!(loaded.export, ExportConfig::default());
    }

    #[test]
    fn test_project_name_fallback() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("my-app");
        std::fs::create_dir_all(&sub).unwrap();
        let config = GenloomConfig::default();
        assert_eq!(config.resolve_project_name(&sub.join("project.json")), "my-app");
    }
}
