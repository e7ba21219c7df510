use libgenloom_core::paths::{file_name, join_path, parent_path};
use libgenloom_core::{FileContentMap, GenloomError, NodeKind, ValidationError};
use serde::Serialize;

use crate::cli::Cli;
use crate::context::AppContext;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct EditOutput {
    action: &'static str,
    path: String,
    kind: NodeKind,
    entries: usize,
}

fn report(cli: &Cli, output: EditOutput) {
    if cli.json {
        output_success(cli, output);
    } else {
        let noun = match output.kind {
            NodeKind::Directory => "directory",
            NodeKind::File => "file",
        };
        print_human(cli, &format!("{} {} {}", output.action, noun, output.path));
    }
}

pub fn run_cat(cli: &Cli, path: &str) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let store = ctx.open_store()?;

    if !store.files().is_file(path) {
        return Err(ValidationError::NotFound(path.to_string()).into());
    }
    let content = store.files().get(path).unwrap_or_default();

    if cli.json {
        output_success(cli, serde_json::json!({ "path": path, "content": content }));
    } else if !cli.quiet {
        print!("{}", content);
    }
    Ok(())
}

fn run_create(cli: &Cli, path: &str, kind: NodeKind) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let mut store = ctx.open_store()?;

    store.create(parent_path(path), file_name(path), kind)?;
    ctx.save_store(&store)?;

    report(cli, EditOutput {
        action: "created",
        path: path.to_string(),
        kind,
        entries: store.files().len(),
    });
    Ok(())
}

pub fn run_touch(cli: &Cli, path: &str) -> Result<(), GenloomError> {
    run_create(cli, path, NodeKind::File)
}

pub fn run_mkdir(cli: &Cli, path: &str) -> Result<(), GenloomError> {
    run_create(cli, path, NodeKind::Directory)
}

/// File unless `--dir` is given or the path only exists as a directory
fn infer_kind(files: &FileContentMap, path: &str, dir: bool) -> NodeKind {
    if dir || (!files.is_file(path) && files.is_directory(path)) {
        NodeKind::Directory
    } else {
        NodeKind::File
    }
}

pub fn run_mv(cli: &Cli, path: &str, new_name: &str, dir: bool) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let mut store = ctx.open_store()?;
    let kind = infer_kind(store.files(), path, dir);

    store.rename(path, new_name, kind)?;
    ctx.save_store(&store)?;

    report(cli, EditOutput {
        action: "renamed",
        path: join_path(parent_path(path), new_name),
        kind,
        entries: store.files().len(),
    });
    Ok(())
}

pub fn run_rm(cli: &Cli, path: &str, dir: bool) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let mut store = ctx.open_store()?;
    let kind = infer_kind(store.files(), path, dir);

    if !store.files().exists(path) {
        tracing::info!(path, "nothing to delete");
    }
    store.delete(path, kind);
    ctx.save_store(&store)?;

    report(cli, EditOutput {
        action: "deleted",
        path: path.to_string(),
        kind,
        entries: store.files().len(),
    });
    Ok(())
}
