use std::path::Path;

use libgenloom_core::export::{export_json, export_markdown, write_to_dir};
use libgenloom_core::GenloomError;

use crate::cli::{Cli, ExportFormat};
use crate::context::AppContext;
use crate::output::{output_success, print_human};

pub fn run(cli: &Cli, format: ExportFormat, out: &Path) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;
    let store = ctx.open_store()?;

    match format {
        ExportFormat::Json => {
            let export = export_json(store.name(), store.files());
            let json = serde_json::to_string_pretty(&export)?;
            write_file(out, &json)?;
            report(cli, "json", out, export.meta.file_count);
        }
        ExportFormat::Md => {
            let md = export_markdown(store.name(), store.files());
            write_file(out, &md)?;
            report(cli, "md", out, store.files().visible_files().count());
        }
        ExportFormat::Dir => {
            let stats = write_to_dir(store.files(), out, &ctx.config.export)?;
            if cli.json {
                output_success(cli, serde_json::json!({
                    "format": "dir",
                    "path": out.display().to_string(),
                    "stats": stats,
                }));
            } else {
                print_human(cli, &format!(
                    "Exported to {} ({} files, {} directories, {} skipped)",
                    out.display(),
                    stats.files_written,
                    stats.directories_created,
                    stats.skipped
                ));
            }
        }
    }
    Ok(())
}

fn write_file(out: &Path, content: &str) -> Result<(), GenloomError> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, content)?;
    Ok(())
}

fn report(cli: &Cli, format: &str, out: &Path, file_count: usize) {
    if cli.json {
        output_success(cli, serde_json::json!({
            "format": format,
            "path": out.display().to_string(),
            "file_count": file_count,
        }));
    } else {
        print_human(cli, &format!("Exported {} files to {}", file_count, out.display()));
    }
}
