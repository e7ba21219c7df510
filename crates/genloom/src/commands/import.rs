use std::path::Path;

use libgenloom_core::export::read_from_dir;
use libgenloom_core::GenloomError;

use crate::cli::Cli;
use crate::context::AppContext;
use crate::output::{output_success, print_human};

pub fn run(cli: &Cli, dir: &Path, force: bool) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let mut store = ctx.open_store()?;

    if !dir.is_dir() {
        return Err(GenloomError::NotFound(dir.display().to_string()));
    }
    if !store.files().is_empty() && !force {
        return Err(GenloomError::InvalidArgs(format!(
            "project {} already has {} entries; pass --force to replace it",
            ctx.project_path.display(),
            store.files().len()
        )));
    }

    let files = read_from_dir(dir)?;
    let name = store.name().to_string();
    store.replace(name, files)?;
    ctx.save_store(&store)?;

    let file_count = store.files().visible_files().count();
    if cli.json {
        output_success(cli, serde_json::json!({
            "source": dir.display().to_string(),
            "file_count": file_count,
            "entries": store.files().len(),
        }));
    } else {
        print_human(cli, &format!("Imported {} files from {}", file_count, dir.display()));
    }
    Ok(())
}
