mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match &cli.command {
        Command::Tree => commands::tree::run_tree(&cli),
        Command::Ls => commands::tree::run_ls(&cli),
        Command::Cat { path } => commands::edit::run_cat(&cli, path),
        Command::Touch { path } => commands::edit::run_touch(&cli, path),
        Command::Mkdir { path } => commands::edit::run_mkdir(&cli, path),
        Command::Mv { path, new_name, dir } => commands::edit::run_mv(&cli, path, new_name, *dir),
        Command::Rm { path, dir } => commands::edit::run_rm(&cli, path, *dir),
        Command::Run { kind, updates, name } => {
            commands::run::run(&cli, (*kind).into(), updates, name.clone())
        }
        Command::Export { format, out } => commands::export::run(&cli, *format, out),
        Command::Import { dir, force } => commands::import::run(&cli, dir, *force),
        Command::Config { cmd } => commands::config::run(&cli, cmd.clone()),
    };

    if let Err(e) = result {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}
