use std::path::PathBuf;

use libgenloom_core::store::{load_map_or_default, save_map};
use libgenloom_core::{load_config, save_config, GenloomConfig, GenloomError, ProjectStore};

use crate::cli::Cli;

/// Resolved paths and configuration for one invocation
pub struct AppContext {
    pub project_path: PathBuf,
    pub project_dir: PathBuf,
    pub config: GenloomConfig,
}

impl AppContext {
    pub fn resolve(cli: &Cli) -> Result<Self, GenloomError> {
        let project_path = cli.project.clone();
        if project_path.is_dir() {
            return Err(GenloomError::InvalidArgs(format!(
                "project file {} is a directory",
                project_path.display()
            )));
        }
        let project_dir = match project_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let config = load_config(&project_dir)?.unwrap_or_default();
        tracing::debug!(project = %project_path.display(), "resolved context");

        Ok(Self {
            project_path,
            project_dir,
            config,
        })
    }

    pub fn project_name(&self) -> String {
        self.config.resolve_project_name(&self.project_path)
    }

    /// Load the project; a missing file is an empty project
    pub fn open_store(&self) -> Result<ProjectStore, GenloomError> {
        let files = load_map_or_default(&self.project_path)?;
        Ok(ProjectStore::new(self.project_name(), files)?)
    }

    pub fn save_store(&self, store: &ProjectStore) -> Result<(), GenloomError> {
        save_map(&self.project_path, store.files())?;
        tracing::info!(
            project = %self.project_path.display(),
            entries = store.files().len(),
            "saved project"
        );
        Ok(())
    }

    pub fn save_config(&self) -> Result<(), GenloomError> {
        save_config(&self.project_dir, &self.config)
    }

    pub fn config_path(&self) -> PathBuf {
        libgenloom_core::config::config_path(&self.project_dir)
    }
}
