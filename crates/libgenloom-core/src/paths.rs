//! Path helpers for the flat project map.
//!
//! Paths are `/`-separated, relative, and never contain `..` or empty segments.

use crate::error::ValidationError;
use crate::types::content::FileContentMap;

/// File name used to witness an otherwise-empty directory
pub const SENTINEL: &str = ".keep";

/// True for keys of the form `<dir>/.keep`
pub fn is_sentinel(path: &str) -> bool {
    path.strip_suffix(SENTINEL)
        .map(|rest| rest.ends_with('/') && rest.len() > 1)
        .unwrap_or(false)
}

/// Check a single path segment supplied by the user.
/// The sentinel name is reserved for directory markers.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.contains('/') || name.contains("..") || name == SENTINEL {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Check a full relative path (used for imported or generated maps)
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() || path.starts_with('/') {
        return Err(ValidationError::InvalidName(path.to_string()));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(ValidationError::InvalidName(path.to_string()));
    }
    Ok(())
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Parent directory of `path` (`""` for top-level entries)
pub fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Last segment of `path`
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Every proper ancestor of `path`, nearest first, excluding the root
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    let mut current = path;
    std::iter::from_fn(move || {
        let (parent, _) = current.rsplit_once('/')?;
        current = parent;
        Some(parent)
    })
}

/// Find a path that is both a file key and a directory prefix of another key.
///
/// Such maps have no single tree interpretation, so they are rejected before
/// they reach the store.
pub fn find_conflict(map: &FileContentMap) -> Option<String> {
    map.keys()
        .find(|path| map.descendants(path).next().is_some())
        .map(str::to_string)
}

/// Validate every key of a map that arrives from outside the mutator
pub fn validate_map(map: &FileContentMap) -> Result<(), ValidationError> {
    for path in map.keys() {
        validate_path(path)?;
    }
    match find_conflict(map) {
        Some(path) => Err(ValidationError::Conflict(path)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sentinel() {
        assert!(is_sentinel("src/.keep"));
        assert!(is_sentinel("a/b/.keep"));
        assert!(!is_sentinel(".keep"));
        assert!(!is_sentinel("src/x.keep"));
        assert!(!is_sentinel("src/.keeper"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("main.rs").is_ok());
        assert!(validate_name(".env").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("x..y").is_err());
        assert_eq!(
            validate_name(".keep"),
            Err(ValidationError::InvalidName(".keep".to_string()))
        );
        assert!(validate_name(".keeper").is_ok());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("src/lib.rs").is_ok());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("src//lib.rs").is_err());
        assert!(validate_path("src/../lib.rs").is_err());
        assert!(validate_path("src/").is_err());
    }

    #[test]
    fn test_path_parts() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a/b", "c"), "a/b/c");
        assert_eq!(parent_path("a/b/c"), "a/b");
        assert_eq!(parent_path("a"), "");
        assert_eq!(file_name("a/b/c"), "c");
        assert_eq!(file_name("a"), "a");
        let anc: Vec<&str> = ancestors("a/b/c").collect();
        assert_eq!(anc, vec!["a/b", "a"]);
    }

    #[test]
    fn test_find_conflict() {
        let ok: FileContentMap = [("a/b", ""), ("a/.keep", "")].into_iter().collect();
        assert_eq!(find_conflict(&ok), None);

        let bad: FileContentMap = [("a", "file"), ("a/b", "")].into_iter().collect();
        assert_eq!(find_conflict(&bad), Some("a".to_string()));
        assert!(matches!(
            validate_map(&bad),
            Err(ValidationError::Conflict(_))
        ));
    }
}
