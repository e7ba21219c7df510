use std::path::Path;

use crate::dispatch::ProjectSink;
use crate::error::{GenloomError, ValidationError};
use crate::mutator;
use crate::paths::validate_map;
use crate::tree::{NodeKind, PathNode};
use crate::types::content::FileContentMap;

/// The currently loaded project.
///
/// The file map is only ever replaced as a whole value, so a reader never
/// observes a half-applied mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStore {
    name: String,
    files: FileContentMap,
}

impl ProjectStore {
    /// Open a project from an existing map, rejecting malformed maps
    pub fn new(name: impl Into<String>, files: FileContentMap) -> Result<Self, ValidationError> {
        validate_map(&files)?;
        Ok(Self {
            name: name.into(),
            files,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn files(&self) -> &FileContentMap {
        &self.files
    }

    /// Derive a fresh tree for the current map
    pub fn tree(&self) -> PathNode {
        PathNode::build(&self.files)
    }

    pub fn create(&mut self, parent: &str, name: &str, kind: NodeKind) -> Result<(), ValidationError> {
        self.files = mutator::create(&self.files, parent, name, kind)?;
        Ok(())
    }

    pub fn rename(&mut self, path: &str, new_name: &str, kind: NodeKind) -> Result<(), ValidationError> {
        self.files = mutator::rename(&self.files, path, new_name, kind)?;
        Ok(())
    }

    pub fn delete(&mut self, path: &str, kind: NodeKind) {
        self.files = mutator::delete(&self.files, path, kind);
    }

    /// Replace the project wholesale
    pub fn replace(&mut self, name: impl Into<String>, files: FileContentMap) -> Result<(), ValidationError> {
        validate_map(&files)?;
        self.name = name.into();
        self.files = files;
        Ok(())
    }

    /// Overlay `files` onto the current map
    pub fn patch(&mut self, files: FileContentMap) -> Result<(), ValidationError> {
        let mut merged = self.files.clone();
        merged.extend(files);
        validate_map(&merged)?;
        self.files = merged;
        Ok(())
    }

    /// Discard the loaded project
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl ProjectSink for ProjectStore {
    fn on_project_update(&mut self, content: FileContentMap, project_name: &str, is_new_project: bool) {
        let result = if is_new_project {
            self.replace(project_name, content)
        } else {
            if self.name.is_empty() {
                self.name = project_name.to_string();
            }
            self.patch(content)
        };
        if let Err(e) = result {
            tracing::warn!(project = project_name, error = %e, "rejected project update");
        }
    }
}

/// Load a project map from its JSON wire form
pub fn load_map(path: &Path) -> Result<FileContentMap, GenloomError> {
    let content = std::fs::read_to_string(path)?;
    let map: FileContentMap = serde_json::from_str(&content)?;
    validate_map(&map)?;
    Ok(map)
}

/// Like [`load_map`], but a missing file is an empty project
pub fn load_map_or_default(path: &Path) -> Result<FileContentMap, GenloomError> {
    if !path.exists() {
        return Ok(FileContentMap::new());
    }
    load_map(path)
}

/// Write a project map atomically (temp file, then rename)
pub fn save_map(path: &Path, map: &FileContentMap) -> Result<(), GenloomError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let json = serde_json::to_string_pretty(map)?;
    std::fs::write(&temp_path, json)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn files(entries: &[(&str, &str)]) -> FileContentMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_new_rejects_conflicting_map() {
        let bad = files(&[("a", "x"), ("a/b", "y")]);
        assert!(matches!(
            ProjectStore::new("p", bad),
            Err(ValidationError::Conflict(_))
        ));
    }

    #[test]
    fn test_failed_mutation_leaves_map_untouched() {
        let mut store = ProjectStore::new("p", files(&[("a.txt", "1"), ("b.txt", "2")])).unwrap();
        let before = store.files().clone();
        assert!(store.rename("a.txt", "b.txt", NodeKind::File).is_err());
        assert!(store.create("", "a/b", NodeKind::File).is_err());
        assert_eq!(store.files(), &before);
    }

    #[test]
    fn test_sink_replaces_new_project() {
        let mut store = ProjectStore::new("old", files(&[("old.txt", "")])).unwrap();
        store.on_project_update(files(&[("new.txt", "n")]), "fresh", true);
        assert_eq!(store.name(), "fresh");
        assert_eq!(store.files(), &files(&[("new.txt", "n")]));
    }

    #[test]
    fn test_sink_patches_existing_project() {
        let mut store = ProjectStore::new("app", files(&[("a.rs", "bug"), ("b.rs", "ok")])).unwrap();
        store.on_project_update(files(&[("a.rs", "fixed")]), "app", false);
        assert_eq!(store.files(), &files(&[("a.rs", "fixed"), ("b.rs", "ok")]));
    }

    #[test]
    fn test_sink_rejects_conflicting_patch() {
        let mut store = ProjectStore::new("app", files(&[("lib", "file")])).unwrap();
        store.on_project_update(files(&[("lib/mod.rs", "")]), "app", false);
        assert_eq!(store.files(), &files(&[("lib", "file")]));
    }

    #[test]
    fn test_reset() {
        let mut store = ProjectStore::new("app", files(&[("a", "")])).unwrap();
        store.reset();
        assert_eq!(store.name(), "");
        assert!(store.files().is_empty());
        assert!(store.tree().children().is_empty());
    }

    #[test]
    fn test_save_and_load_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("project.json");
        let map = files(&[("src/.keep", ""), ("src/main.rs", "fn main() {}")]);

        save_map(&path, &map).unwrap();
        assert!(!dir.path().join("nested").join("project.json.tmp").exists());
        assert_eq!(load_map(&path).unwrap(), map);
        assert!(load_map_or_default(&dir.path().join("missing.json")).unwrap().is_empty());
    }
}
