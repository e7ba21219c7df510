use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::ExportConfig;
use crate::error::GenloomError;
use crate::paths::{is_sentinel, parent_path, validate_path, SENTINEL};
use crate::tree::PathNode;
use crate::types::content::{binary_marker, decode_image, encode_image, ContentKind, FileContentMap};

/// Export metadata
#[derive(Debug, Serialize)]
pub struct ExportMeta {
    pub schema_version: u32,
    pub generated_ts: i64,
    pub project_name: String,
    pub file_count: usize,
}

/// JSON export format
#[derive(Debug, Serialize)]
pub struct JsonExport {
    pub meta: ExportMeta,
    pub files: Vec<FileEntryJson>,
    /// Directories that exist only through their sentinel
    pub empty_directories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileEntryJson {
    pub path: String,
    pub kind: &'static str,
    pub size: usize,
    pub sha256: String,
    pub editable: bool,
}

impl FileEntryJson {
    fn new(path: &str, content: &str) -> Self {
        let kind = ContentKind::classify(content);
        Self {
            path: path.to_string(),
            kind: kind.as_str(),
            size: content.len(),
            sha256: hex::encode(Sha256::digest(content.as_bytes())),
            editable: kind.is_editable(),
        }
    }
}

/// Export a manifest of the project to JSON
pub fn export_json(project_name: &str, map: &FileContentMap) -> JsonExport {
    let files: Vec<FileEntryJson> = map
        .visible_files()
        .map(|(path, content)| FileEntryJson::new(path, content))
        .collect();

    let empty_directories: Vec<String> = map
        .keys()
        .filter(|path| is_sentinel(path))
        .map(|path| parent_path(path).to_string())
        .filter(|dir| map.descendants(dir).all(|(key, _)| is_sentinel(key)))
        .collect();

    JsonExport {
        meta: ExportMeta {
            schema_version: 1,
            generated_ts: Utc::now().timestamp_millis(),
            project_name: project_name.to_string(),
            file_count: files.len(),
        },
        files,
        empty_directories,
    }
}

fn fence_language(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => ext,
        _ => "",
    }
}

/// Export to Markdown: the tree followed by every file body
pub fn export_markdown(project_name: &str, map: &FileContentMap) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", project_name));
    md.push_str(&format!("Generated: {}\n\n", Utc::now().to_rfc3339()));

    if map.is_empty() {
        md.push_str("Project is empty.\n");
        return md;
    }

    md.push_str("## Structure\n\n```\n");
    md.push_str(&PathNode::build(map).render());
    md.push_str("```\n\n");

    md.push_str("## Files\n\n");
    for (path, content) in map.visible_files() {
        md.push_str(&format!("### `{}`\n\n", path));
        match ContentKind::classify(content) {
            ContentKind::Text => {
                md.push_str(&format!("```{}\n{}", fence_language(path), content));
                if !content.ends_with('\n') {
                    md.push('\n');
                }
                md.push_str("```\n\n");
            }
            ContentKind::Image { mime } => {
                md.push_str(&format!("_Image ({}), {} bytes encoded._\n\n", mime, content.len()));
            }
            ContentKind::Binary => md.push_str("_Binary file omitted._\n\n"),
        }
    }

    md
}

/// Counts reported by [`write_to_dir`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    pub files_written: usize,
    pub directories_created: usize,
    pub skipped: usize,
}

/// Materialize the project under `dir`.
///
/// Sentinels become empty directories (or `.keep` files with
/// `include_sentinels`). Binary markers carry no payload and are skipped.
pub fn write_to_dir(map: &FileContentMap, dir: &Path, config: &ExportConfig) -> Result<WriteStats, GenloomError> {
    let mut stats = WriteStats::default();
    std::fs::create_dir_all(dir)?;

    for (path, content) in map.iter() {
        if validate_path(path).is_err() {
            tracing::warn!(path, "refusing to export malformed path");
            stats.skipped += 1;
            continue;
        }
        let target = dir.join(path);

        if is_sentinel(path) {
            std::fs::create_dir_all(dir.join(parent_path(path)))?;
            stats.directories_created += 1;
            if config.include_sentinels {
                std::fs::write(&target, "")?;
                stats.files_written += 1;
            }
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match ContentKind::classify(content) {
            ContentKind::Text => std::fs::write(&target, content)?,
            ContentKind::Image { .. } if config.decode_images => match decode_image(content) {
                Some((_, bytes)) => std::fs::write(&target, bytes)?,
                None => {
                    tracing::warn!(path, "image payload does not decode, skipping");
                    stats.skipped += 1;
                    continue;
                }
            },
            ContentKind::Image { .. } => std::fs::write(&target, content)?,
            ContentKind::Binary => {
                tracing::debug!(path, "binary placeholder has no payload, skipping");
                stats.skipped += 1;
                continue;
            }
        }
        stats.files_written += 1;
    }

    Ok(stats)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}

/// Read a directory tree into a project map.
///
/// Empty directories are recorded with a sentinel. Raster images become image
/// markers and other non-UTF-8 files become opaque binary markers.
pub fn read_from_dir(dir: &Path) -> Result<FileContentMap, GenloomError> {
    let mut map = FileContentMap::new();
    read_dir_into(dir, "", &mut map)?;
    Ok(map)
}

fn read_dir_into(dir: &Path, prefix: &str, map: &mut FileContentMap) -> Result<(), GenloomError> {
    let mut saw_entry = false;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        let rel = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };

        if file_type.is_dir() {
            saw_entry = true;
            read_dir_into(&entry.path(), &rel, map)?;
        } else if file_type.is_file() {
            saw_entry = true;
            let path = entry.path();
            let bytes = std::fs::read(&path)?;
            let content = if let Some(mime) = image_mime(&path) {
                encode_image(mime, &bytes)
            } else {
                match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => binary_marker(&name, e.as_bytes().len()),
                }
            };
            map.insert(rel, content);
        }
    }

    if !saw_entry && !prefix.is_empty() {
        map.insert(format!("{}/{}", prefix, SENTINEL), "");
    }
    Ok(())
}
