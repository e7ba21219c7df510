use clap::{Parser, Subcommand, ValueEnum};
use libgenloom_core::JobKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "genloom", about = "Drive generation jobs and edit the resulting project tree", version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Project file (JSON object of path to content)
    #[arg(long, global = true, default_value = "project.json")]
    pub project: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the project as a tree
    Tree,

    /// List files with their kind and size
    Ls,

    /// Print the content of a file
    Cat {
        /// File path
        path: String,
    },

    /// Create an empty file
    Touch {
        /// Path of the new file, e.g. src/main.rs
        path: String,
    },

    /// Create an empty directory
    Mkdir {
        /// Path of the new directory
        path: String,
    },

    /// Rename a file or directory in place
    Mv {
        /// Existing path
        path: String,

        /// New last path segment
        new_name: String,

        /// Treat the path as a directory
        #[arg(long)]
        dir: bool,
    },

    /// Delete a file or directory
    Rm {
        /// Path to delete
        path: String,

        /// Treat the path as a directory
        #[arg(long)]
        dir: bool,
    },

    /// Run a generation job from a JSON-lines file of update records
    Run {
        /// Job kind
        kind: JobKindArg,

        /// File with one update record per line
        #[arg(long)]
        updates: PathBuf,

        /// Project name to publish the result under
        #[arg(long)]
        name: Option<String>,
    },

    /// Export the project
    Export {
        /// Export format
        #[arg(long)]
        format: ExportFormat,

        /// Output file, or directory for `--format dir`
        #[arg(long)]
        out: PathBuf,
    },

    /// Replace the project with the contents of a directory
    Import {
        /// Directory to read
        dir: PathBuf,

        /// Overwrite a non-empty project
        #[arg(long)]
        force: bool,
    },

    /// Project configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Clone, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Set the project name used when publishing results
    SetName {
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum JobKindArg {
    Generate,
    Debug,
    Scaffold,
    BusinessPlan,
    StartupPlan,
}

impl From<JobKindArg> for JobKind {
    fn from(arg: JobKindArg) -> Self {
        match arg {
            JobKindArg::Generate => JobKind::Generate,
            JobKindArg::Debug => JobKind::Debug,
            JobKindArg::Scaffold => JobKind::Scaffold,
            JobKindArg::BusinessPlan => JobKind::BusinessPlan,
            JobKindArg::StartupPlan => JobKind::StartupPlan,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Md,
    Dir,
}
