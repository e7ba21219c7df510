//! Property-style checks for the tree projection and the mutator
//!
//! Each property runs over a fixed corpus of maps covering nesting,
//! sentinels, and look-alike prefixes.

use libgenloom_core::mutator::{create, delete, rename};
use libgenloom_core::paths::join_path;
use libgenloom_core::{FileContentMap, NodeKind, PathNode, ValidationError};

fn map(entries: &[(&str, &str)]) -> FileContentMap {
    entries.iter().copied().collect()
}

fn corpus() -> Vec<FileContentMap> {
    vec![
        FileContentMap::new(),
        map(&[("README.md", "# app")]),
        map(&[("src/.keep", "")]),
        map(&[
            ("src/main.rs", "fn main() {}"),
            ("src/lib/mod.rs", "pub mod a;"),
            ("src/lib/a.rs", ""),
            ("src/empty/.keep", ""),
            ("src-old/main.rs", "legacy"),
            ("src.txt", "notes"),
            ("Cargo.toml", "[package]"),
        ]),
        map(&[
            ("a/b/c/d/e.txt", "deep"),
            ("a/b/.keep", ""),
            ("a/x.png", "[IMAGE:image/png;base64,AAAA]"),
        ]),
    ]
}

#[test]
fn test_rebuild_is_deterministic() {
    for m in corpus() {
        assert_eq!(PathNode::build(&m), PathNode::build(&m.clone()));
    }
}

#[test]
fn test_node_paths_extend_parent_paths() {
    for m in corpus() {
        let root = PathNode::build(&m);
        assert_eq!(root.path, "");
        assert_eq!(root.kind, NodeKind::Directory);
        for node in root.walk() {
            for child in node.children() {
                assert_eq!(child.path, join_path(&node.path, &child.name));
            }
        }
    }
}

#[test]
fn test_every_visible_file_is_a_file_node() {
    for m in corpus() {
        let root = PathNode::build(&m);
        for (path, _) in m.visible_files() {
            let node = root.find(path).unwrap_or_else(|| panic!("missing node for {}", path));
            assert_eq!(node.kind, NodeKind::File);
        }
        assert!(root.walk().iter().all(|n| n.name != ".keep"));
    }
}

#[test]
fn test_children_are_directory_first_then_sorted() {
    for m in corpus() {
        let root = PathNode::build(&m);
        for node in root.walk() {
            let keys: Vec<(NodeKind, &str)> = node
                .children()
                .iter()
                .map(|c| (c.kind, c.name.as_str()))
                .collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted);
        }
    }
}

#[test]
fn test_create_then_delete_restores_every_map() {
    for m in corpus() {
        for kind in [NodeKind::File, NodeKind::Directory] {
            let created = create(&m, "", "fresh-item", kind).unwrap();
            assert_ne!(created, m);
            assert_eq!(delete(&created, "fresh-item", kind), m);
        }
    }
}

#[test]
fn test_directory_rename_rewrites_only_its_prefix() {
    let m = corpus().remove(3);
    let renamed = rename(&m, "src", "app", NodeKind::Directory).unwrap();

    for (key, content) in m.iter() {
        match key.strip_prefix("src/") {
            Some(rest) => {
                let moved = format!("app/{}", rest);
                assert_eq!(renamed.get(&moved), Some(content));
                assert!(!renamed.contains_key(key));
            }
            None => assert_eq!(renamed.get(key), Some(content)),
        }
    }
    assert_eq!(renamed.len(), m.len());
}

#[test]
fn test_collisions_leave_map_unchanged() {
    let m = corpus().remove(3);
    let snapshot = m.clone();

    let err = create(&m, "", "src.txt", NodeKind::File).unwrap_err();
    assert_eq!(err, ValidationError::ItemExists("src.txt".to_string()));

    let err = rename(&m, "src-old", "src", NodeKind::Directory).unwrap_err();
    assert_eq!(err.code(), "itemExists");

    let err = rename(&m, "Cargo.toml", "src.txt", NodeKind::File).unwrap_err();
    assert_eq!(err.code(), "itemExists");

    assert_eq!(m, snapshot);
}

#[test]
fn test_scenario_from_empty_project() {
    let m = FileContentMap::new();
    let m = create(&m, "", "src", NodeKind::Directory).unwrap();
    assert_eq!(m, map(&[("src/.keep", "")]));
    let m = create(&m, "src", "index.ts", NodeKind::File).unwrap();
    let m = rename(&m, "src/index.ts", "main.ts", NodeKind::File).unwrap();
    assert_eq!(m, map(&[("src/.keep", ""), ("src/main.ts", "")]));
    let m = delete(&m, "src", NodeKind::Directory);
    assert_eq!(m, FileContentMap::new());
}
