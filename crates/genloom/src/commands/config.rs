use libgenloom_core::{GenloomError, ValidationError};

use crate::cli::{Cli, ConfigCommand};
use crate::context::AppContext;
use crate::output::{output_success, print_human};

pub fn run(cli: &Cli, cmd: ConfigCommand) -> Result<(), GenloomError> {
    match cmd {
        ConfigCommand::Show => run_show(cli),
        ConfigCommand::SetName { name } => run_set_name(cli, name),
    }
}

fn run_show(cli: &Cli) -> Result<(), GenloomError> {
    let ctx = AppContext::resolve(cli)?;

    if cli.json {
        output_success(cli, serde_json::json!({
            "config_path": ctx.config_path().display().to_string(),
            "project_name": ctx.project_name(),
            "config": ctx.config,
        }));
    } else {
        print_human(cli, &format!("config: {}", ctx.config_path().display()));
        print_human(cli, &format!("project_name: {}", ctx.project_name()));
        print_human(cli, &format!("export.include_sentinels: {}", ctx.config.export.include_sentinels));
        print_human(cli, &format!("export.decode_images: {}", ctx.config.export.decode_images));
    }
    Ok(())
}

fn run_set_name(cli: &Cli, name: String) -> Result<(), GenloomError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(name).into());
    }
    let mut ctx = AppContext::resolve(cli)?;
    ctx.config.project_name = Some(name.clone());
    ctx.save_config()?;

    if cli.json {
        output_success(cli, serde_json::json!({ "project_name": name }));
    } else {
        print_human(cli, &format!("Project name set to {}", name));
    }
    Ok(())
}
