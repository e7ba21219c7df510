use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::paths::{is_sentinel, SENTINEL};

/// Flat mapping from project-relative path to file content.
///
/// This is the single source of truth for project state. The hierarchical view
/// is always derived from it (see [`crate::tree::PathNode`]). Iteration order is
/// lexicographic by path, but callers should not depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileContentMap(BTreeMap<String, String>);

impl FileContentMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> Option<String> {
        self.0.insert(path.into(), content.into())
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.0.remove(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key is strictly under `dir` (i.e. prefixed by `dir/`)
    pub fn descendants<'a>(&'a self, dir: &str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let prefix = format!("{}/", dir);
        self.0
            .range(prefix.clone()..)
            .take_while(move |(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A path is a file if it is a key of the map
    pub fn is_file(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// A path is a directory if some key is strictly prefixed by `path/`.
    /// The root (`""`) is always a directory.
    pub fn is_directory(&self, path: &str) -> bool {
        path.is_empty() || self.descendants(path).next().is_some()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.is_file(path) || self.is_directory(path)
    }

    /// Entries excluding directory sentinels
    pub fn visible_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(path, _)| !is_sentinel(path))
    }

    /// Record the existence of `dir` with a sentinel entry
    pub fn insert_sentinel(&mut self, dir: &str) {
        self.0.insert(format!("{}/{}", dir, SENTINEL), String::new());
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for FileContentMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileContentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FileContentMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for FileContentMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// What a content string actually holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    /// `[IMAGE:<mime>;base64,<data>]`
    Image { mime: String },
    /// `[BINARY_FILE:...]`
    Binary,
}

fn image_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\[IMAGE:([^;\]]+);base64,([A-Za-z0-9+/=\s]*)\]$")
            .expect("image marker pattern is valid")
    })
}

impl ContentKind {
    pub fn classify(content: &str) -> Self {
        if let Some(caps) = image_marker_re().captures(content) {
            return ContentKind::Image {
                mime: caps[1].to_string(),
            };
        }
        if content.starts_with("[BINARY_FILE:") && content.ends_with(']') {
            return ContentKind::Binary;
        }
        ContentKind::Text
    }

    /// Only plain text may be edited in place; markers are opaque
    pub fn is_editable(&self) -> bool {
        matches!(self, ContentKind::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image { .. } => "image",
            ContentKind::Binary => "binary",
        }
    }
}

/// Decode an image marker into its mime type and raw bytes.
///
/// Returns `None` for anything that is not a well-formed image marker.
pub fn decode_image(content: &str) -> Option<(String, Vec<u8>)> {
    let caps = image_marker_re().captures(content)?;
    let data: String = caps[2].split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.as_bytes())
        .ok()?;
    Some((caps[1].to_string(), bytes))
}

/// Encode raw image bytes as an image marker
pub fn encode_image(mime: &str, bytes: &[u8]) -> String {
    format!(
        "[IMAGE:{};base64,{}]",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Marker for a binary payload that is kept only as an opaque placeholder
pub fn binary_marker(name: &str, len: usize) -> String {
    format!("[BINARY_FILE:{};{} bytes]", name, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileContentMap {
        [
            ("src/.keep", ""),
            ("src/main.ts", "console.log(1)"),
            ("src/util/fmt.ts", ""),
            ("srcfile.txt", "x"),
            ("README.md", "# hi"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_is_directory_uses_strict_prefix() {
        let map = sample();
        assert!(map.is_directory("src"));
        assert!(map.is_directory("src/util"));
        assert!(map.is_directory(""));
        assert!(!map.is_directory("srcfile.txt"));
        assert!(!map.is_directory("sr"));
    }

    #[test]
    fn test_descendants_skip_similar_prefixes() {
        let map = sample();
        let under_src: Vec<&str> = map.descendants("src").map(|(k, _)| k).collect();
        assert_eq!(under_src, vec!["src/.keep", "src/main.ts", "src/util/fmt.ts"]);
    }

    #[test]
    fn test_visible_files_hide_sentinels() {
        let map = sample();
        assert!(map.visible_files().all(|(k, _)| !k.ends_with("/.keep")));
        assert_eq!(map.visible_files().count(), 4);
    }

    #[test]
    fn test_wire_form_is_plain_object() {
        let map: FileContentMap = [("a.txt", "hello")].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a.txt":"hello"}"#);
        let parsed: FileContentMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_classify_markers() {
        assert_eq!(ContentKind::classify("fn main() {}"), ContentKind::Text);
        assert_eq!(
            ContentKind::classify("[IMAGE:image/png;base64,iVBORw0KGgo=]"),
            ContentKind::Image {
                mime: "image/png".to_string()
            }
        );
        assert_eq!(
            ContentKind::classify("[BINARY_FILE:report.pdf]"),
            ContentKind::Binary
        );
        // Not a full marker, so still editable text
        assert_eq!(ContentKind::classify("[IMAGE: see below"), ContentKind::Text);
        assert!(!ContentKind::Binary.is_editable());
    }

    #[test]
    fn test_image_marker_decodes() {
        let marker = encode_image("image/gif", b"GIF89a");
        let (mime, bytes) = decode_image(&marker).unwrap();
        assert_eq!(mime, "image/gif");
        assert_eq!(bytes, b"GIF89a");
        assert!(decode_image("plain text").is_none());
    }
}
