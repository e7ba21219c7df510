use comfy_table::{presets::UTF8_FULL, Table};
use libgenloom_core::{ContentKind, GenloomError, PathNode};
use serde::Serialize;

use crate::cli::Cli;
use crate::context::AppContext;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct TreeOutput {
    project_name: String,
    file_count: usize,
    root: PathNode,
}

pub fn run_tree(cli: &Cli) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let store = ctx.open_store()?;
    let root = store.tree();

    if cli.json {
        output_success(cli, TreeOutput {
            project_name: store.name().to_string(),
            file_count: root.file_count(),
            root,
        });
    } else if store.files().is_empty() {
        print_human(cli, "Project is empty.");
    } else {
        print_human(cli, root.render().trim_end());
    }
    Ok(())
}

#[derive(Serialize)]
struct FileRow {
    path: String,
    kind: &'static str,
    size: usize,
}

pub fn run_ls(cli: &Cli) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let store = ctx.open_store()?;

    let rows: Vec<FileRow> = store
        .files()
        .visible_files()
        .map(|(path, content)| FileRow {
            path: path.to_string(),
            kind: ContentKind::classify(content).as_str(),
            size: content.len(),
        })
        .collect();

    if cli.json {
        output_success(cli, serde_json::json!({ "files": rows }));
        return Ok(());
    }
    if rows.is_empty() {
        print_human(cli, "No files.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Size"]);
    for row in &rows {
        table.add_row(vec![row.path.clone(), row.kind.to_string(), row.size.to_string()]);
    }
    print_human(cli, &table.to_string());
    Ok(())
}
