//! Hierarchical view derived from a flat [`FileContentMap`].
//!
//! The tree is a disposable projection: rebuild it from the map after every
//! mutation instead of holding on to nodes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::paths::{is_sentinel, join_path, validate_path};
use crate::types::content::FileContentMap;

/// Directories sort before files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathNode {
    pub name: String,
    /// `""` for the root, otherwise `parent.path + "/" + name`
    pub path: String,
    pub kind: NodeKind,
    /// Present for directories, presented directory-first then by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PathNode>>,
}

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: BTreeSet<String>,
}

impl DirBuilder {
    fn dir_mut(&mut self, segments: &[&str]) -> &mut DirBuilder {
        let mut current = self;
        for segment in segments {
            current = current.dirs.entry((*segment).to_string()).or_default();
        }
        current
    }

    fn into_node(self, name: String, path: String) -> PathNode {
        let DirBuilder { dirs, files } = self;

        // A name that is also a directory prefix is shown as the directory
        let files: Vec<String> = files
            .into_iter()
            .filter(|file| !dirs.contains_key(file))
            .collect();

        let mut children = Vec::with_capacity(dirs.len() + files.len());
        for (child_name, child) in dirs {
            let child_path = join_path(&path, &child_name);
            children.push(child.into_node(child_name, child_path));
        }
        for file in files {
            children.push(PathNode {
                path: join_path(&path, &file),
                name: file,
                kind: NodeKind::File,
                children: None,
            });
        }

        PathNode {
            name,
            path,
            kind: NodeKind::Directory,
            children: Some(children),
        }
    }
}

impl PathNode {
    /// Derive the root node for `map`
    pub fn build(map: &FileContentMap) -> PathNode {
        let mut root = DirBuilder::default();

        for path in map.keys() {
            if validate_path(path).is_err() {
                tracing::debug!(path, "skipping malformed path in tree projection");
                continue;
            }
            let segments: Vec<&str> = path.split('/').collect();
            let Some((last, dirs)) = segments.split_last() else {
                continue;
            };
            let parent = root.dir_mut(dirs);
            // Sentinels only witness their directory
            if !is_sentinel(path) {
                parent.files.insert((*last).to_string());
            }
        }

        root.into_node(String::new(), String::new())
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &[PathNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Look up a descendant by its full path (`""` is this node)
    pub fn find(&self, path: &str) -> Option<&PathNode> {
        if path == self.path {
            return Some(self);
        }
        self.children()
            .iter()
            .find(|child| path == child.path || path.starts_with(&format!("{}/", child.path)))
            .and_then(|child| child.find(path))
    }

    /// All nodes in depth-first pre-order, starting with this one
    pub fn walk(&self) -> Vec<&PathNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }

    pub fn file_count(&self) -> usize {
        self.walk().iter().filter(|n| !n.is_dir()).count()
    }

    /// Plain-text rendering with box-drawing guides
    pub fn render(&self) -> String {
        let mut out = String::from(".\n");
        render_children(self, "", &mut out);
        out
    }
}

fn render_children(node: &PathNode, prefix: &str, out: &mut String) {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.name);
        if child.is_dir() {
            out.push('/');
        }
        out.push('\n');
        if child.is_dir() {
            let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_children(child, &next, out);
        }
    }
}
