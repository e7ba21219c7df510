//! Validated create/rename/delete over the flat project map.
//!
//! Every operation takes the current map by reference and returns a new one.
//! Validation runs before anything is copied, so a rejected operation never
//! leaves a partially rewritten map behind.

use crate::error::ValidationError;
use crate::paths::{ancestors, join_path, parent_path, validate_name, validate_path};
use crate::tree::NodeKind;
use crate::types::content::FileContentMap;

/// Reject `path` if it is already taken, in any of three ways: as a key, as a
/// directory prefix of other keys, or because one of its ancestors is a file.
///
/// Keys for which `is_source` returns true are ignored (the item being renamed).
fn check_vacant(
    map: &FileContentMap,
    path: &str,
    is_source: impl Fn(&str) -> bool,
) -> Result<(), ValidationError> {
    if map.is_file(path) && !is_source(path) {
        return Err(ValidationError::ItemExists(path.to_string()));
    }
    if map.descendants(path).any(|(key, _)| !is_source(key)) {
        return Err(ValidationError::ItemExists(path.to_string()));
    }
    if let Some(file) = ancestors(path).find(|dir| map.is_file(dir) && !is_source(dir)) {
        return Err(ValidationError::ItemExists(file.to_string()));
    }
    Ok(())
}

/// The parent of a new item must be an existing directory
fn check_parent(map: &FileContentMap, parent: &str) -> Result<(), ValidationError> {
    if parent.is_empty() {
        return Ok(());
    }
    validate_path(parent)?;
    if map.is_file(parent) {
        return Err(ValidationError::ItemExists(parent.to_string()));
    }
    if !map.is_directory(parent) {
        return Err(ValidationError::NotFound(parent.to_string()));
    }
    Ok(())
}

fn check_source(map: &FileContentMap, path: &str, kind: NodeKind) -> Result<(), ValidationError> {
    validate_path(path)?;
    let present = match kind {
        NodeKind::File => map.is_file(path),
        NodeKind::Directory => map.is_directory(path),
    };
    if present {
        Ok(())
    } else {
        Err(ValidationError::NotFound(path.to_string()))
    }
}

/// Create an empty file, or an empty directory witnessed by its sentinel
pub fn create(
    map: &FileContentMap,
    parent: &str,
    name: &str,
    kind: NodeKind,
) -> Result<FileContentMap, ValidationError> {
    validate_name(name)?;
    check_parent(map, parent)?;
    let new_path = join_path(parent, name);
    check_vacant(map, &new_path, |_| false)?;

    let mut next = map.clone();
    match kind {
        NodeKind::File => {
            next.insert(new_path.clone(), "");
        }
        NodeKind::Directory => next.insert_sentinel(&new_path),
    }
    tracing::debug!(path = %new_path, ?kind, "created item");
    Ok(next)
}

/// Rename the last segment of `old_path`. Directories move with all of their
/// entries, sentinel included.
pub fn rename(
    map: &FileContentMap,
    old_path: &str,
    new_name: &str,
    kind: NodeKind,
) -> Result<FileContentMap, ValidationError> {
    validate_name(new_name)?;
    check_source(map, old_path, kind)?;

    let new_path = join_path(parent_path(old_path), new_name);
    if new_path == old_path {
        return Ok(map.clone());
    }

    let old_prefix = format!("{}/", old_path);
    let is_source = |key: &str| match kind {
        NodeKind::File => key == old_path,
        NodeKind::Directory => key.starts_with(&old_prefix),
    };
    check_vacant(map, &new_path, is_source)?;

    let mut next = map.clone();
    match kind {
        NodeKind::File => {
            if let Some(content) = next.remove(old_path) {
                next.insert(new_path.clone(), content);
            }
        }
        NodeKind::Directory => {
            let moved: Vec<(String, String)> = map
                .descendants(old_path)
                .map(|(key, content)| {
                    (
                        format!("{}/{}", new_path, &key[old_prefix.len()..]),
                        content.to_string(),
                    )
                })
                .collect();
            let old_keys: Vec<String> = map.descendants(old_path).map(|(k, _)| k.to_string()).collect();
            for key in &old_keys {
                next.remove(key);
            }
            next.extend(moved);
        }
    }
    tracing::debug!(from = old_path, to = %new_path, ?kind, "renamed item");
    Ok(next)
}

/// Remove a file, or a directory with everything under it.
/// Deleting something that does not exist is a no-op.
pub fn delete(map: &FileContentMap, path: &str, kind: NodeKind) -> FileContentMap {
    let mut next = map.clone();
    match kind {
        NodeKind::File => {
            next.remove(path);
        }
        NodeKind::Directory => {
            let doomed: Vec<String> = map.descendants(path).map(|(k, _)| k.to_string()).collect();
            for key in &doomed {
                next.remove(key);
            }
        }
    }
    tracing::debug!(path, ?kind, removed = map.len() - next.len(), "deleted item");
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> FileContentMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_walkthrough() {
        let m = FileContentMap::new();
        let m = create(&m, "", "src", NodeKind::Directory).unwrap();
        assert_eq!(m, map(&[("src/.keep", "")]));

        let m = create(&m, "src", "index.ts", NodeKind::File).unwrap();
        assert_eq!(m, map(&[("src/.keep", ""), ("src/index.ts", "")]));

        let m = rename(&m, "src/index.ts", "main.ts", NodeKind::File).unwrap();
        assert_eq!(m, map(&[("src/.keep", ""), ("src/main.ts", "")]));

        let m = delete(&m, "src", NodeKind::Directory);
        assert!(m.is_empty());
    }

    #[test]
    fn test_create_rejects_bad_names() {
        let m = FileContentMap::new();
        for name in ["", "a/b", "..", "a..b", ".keep"] {
            let err = create(&m, "", name, NodeKind::File).unwrap_err();
            assert_eq!(err.code(), "invalidName", "name {:?}", name);
        }
    }

    #[test]
    fn test_create_collisions() {
        let m = map(&[("a.txt", "x"), ("lib/mod.rs", "")]);

        // Same key
        assert!(matches!(
            create(&m, "", "a.txt", NodeKind::Directory),
            Err(ValidationError::ItemExists(_))
        ));
        // Existing directory
        assert!(matches!(
            create(&m, "", "lib", NodeKind::File),
            Err(ValidationError::ItemExists(_))
        ));
        // Parent is a file
        assert!(matches!(
            create(&m, "a.txt", "inner", NodeKind::File),
            Err(ValidationError::ItemExists(_))
        ));
        // Parent missing
        assert!(matches!(
            create(&m, "nope", "x", NodeKind::File),
            Err(ValidationError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_then_delete_restores_map() {
        let original = map(&[("a.txt", "x"), ("lib/mod.rs", "pub mod a;")]);

        let with_file = create(&original, "lib", "b.rs", NodeKind::File).unwrap();
        assert_eq!(delete(&with_file, "lib/b.rs", NodeKind::File), original);

        let with_dir = create(&original, "lib", "nested", NodeKind::Directory).unwrap();
        assert_eq!(delete(&with_dir, "lib/nested", NodeKind::Directory), original);
    }

    #[test]
    fn test_rename_directory_moves_everything() {
        let m = map(&[
            ("app/.keep", ""),
            ("app/main.rs", "fn main() {}"),
            ("app/ui/view.rs", "view"),
            ("apple.txt", "fruit"),
            ("app.toml", "cfg"),
        ]);
        let renamed = rename(&m, "app", "core", NodeKind::Directory).unwrap();
        assert_eq!(
            renamed,
            map(&[
                ("core/.keep", ""),
                ("core/main.rs", "fn main() {}"),
                ("core/ui/view.rs", "view"),
                ("apple.txt", "fruit"),
                ("app.toml", "cfg"),
            ])
        );
    }

    #[test]
    fn test_rename_nested_directory() {
        let m = map(&[("a/b/c.txt", "1"), ("a/d.txt", "2")]);
        let renamed = rename(&m, "a/b", "z", NodeKind::Directory).unwrap();
        assert_eq!(renamed, map(&[("a/z/c.txt", "1"), ("a/d.txt", "2")]));
    }

    #[test]
    fn test_rename_onto_existing_is_rejected() {
        let m = map(&[("a.txt", "1"), ("b.txt", "2"), ("dir/x", "")]);
        assert!(matches!(
            rename(&m, "a.txt", "b.txt", NodeKind::File),
            Err(ValidationError::ItemExists(_))
        ));
        assert!(matches!(
            rename(&m, "a.txt", "dir", NodeKind::File),
            Err(ValidationError::ItemExists(_))
        ));
        assert!(matches!(
            rename(&m, "dir", "a.txt", NodeKind::Directory),
            Err(ValidationError::ItemExists(_))
        ));
    }

    #[test]
    fn test_rename_missing_source() {
        let m = map(&[("a.txt", "1"), ("dir/x", "")]);
        assert!(matches!(
            rename(&m, "ghost.txt", "b.txt", NodeKind::File),
            Err(ValidationError::NotFound(_))
        ));
        // Kind mismatch counts as missing
        assert!(matches!(
            rename(&m, "dir", "other", NodeKind::File),
            Err(ValidationError::NotFound(_))
        ));
        assert!(matches!(
            rename(&m, "a.txt", "b.txt", NodeKind::Directory),
            Err(ValidationError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_onto_sentinel_name_is_rejected() {
        let m = map(&[("src/x.txt", "1")]);
        let err = rename(&m, "src/x.txt", ".keep", NodeKind::File).unwrap_err();
        assert_eq!(err, ValidationError::InvalidName(".keep".to_string()));
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let m = map(&[("a.txt", "1")]);
        assert_eq!(rename(&m, "a.txt", "a.txt", NodeKind::File).unwrap(), m);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let m = map(&[("a.txt", "1")]);
        assert_eq!(delete(&m, "b.txt", NodeKind::File), m);
        assert_eq!(delete(&m, "nodir", NodeKind::Directory), m);
    }

    #[test]
    fn test_delete_directory_leaves_similar_prefixes() {
        let m = map(&[("src/a.rs", ""), ("src/.keep", ""), ("src2/b.rs", ""), ("src.md", "")]);
        assert_eq!(
            delete(&m, "src", NodeKind::Directory),
            map(&[("src2/b.rs", ""), ("src.md", "")])
        );
    }
}
