pub mod add;
pub mod assimilate;
pub mod completion;
pub mod global;
pub mod history;
pub mod init;
pub mod publish;
pub mod save;
pub mod status;
pub mod watch;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "project-memory",
    author,
    version,
    about = "Project memory - workspace notes for AI coding assistants",
    long_about = "Keeps the project memory and completed-implementations documents in the \
                  workspace rules directory.\n\nEntries are appended from templates, every \
                  save of the memory document is kept as a snapshot, and legacy notes can be \
                  assimilated.\nThe workspace is auto-detected from a .cursor directory or \
                  the enclosing git repository."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Workspace root (defaults to auto-detection)")]
    pub workspace: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (.toml, .yaml or .yml)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding the global memory document")]
    pub global_root: Option<PathBuf>,

    #[arg(long, global = true, help = "Publish the summary whenever a document is saved")]
    pub sync_on_save: bool,

    #[arg(long, global = true, help = "Do not capture history snapshots")]
    pub no_history: bool,

    #[arg(long, global = true, help = "Number of history snapshots to keep")]
    pub max_entries: Option<i64>
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the memory documents and a configuration file")]
    Init(init::InitArgs),

    #[command(about = "Append a templated entry to the memory document")]
    Add(add::AddArgs),

    #[command(about = "List the entry templates")]
    Templates,

    #[command(about = "Run the save handler on a document's current content")]
    Save(save::SaveArgs),

    #[command(about = "List memory snapshots, newest first")]
    History(history::HistoryArgs),

    #[command(about = "Restore the memory document from a snapshot")]
    Restore(history::RestoreArgs),

    #[command(about = "Import legacy AI-MEMORY.md / COMPLETED-IMPLEMENTATIONS.md")]
    Assimilate(assimilate::AssimilateArgs),

    #[command(about = "Write the combined summary document")]
    Publish(publish::PublishArgs),

    #[command(subcommand, about = "Open, copy or locate the global memory document")]
    Global(global::GlobalCommand),

    #[command(about = "Watch the documents and run the save handler on every change")]
    Watch,

    #[command(about = "Show workspace, configuration and document status")]
    Status(status::StatusArgs),

    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionArgs)
}
