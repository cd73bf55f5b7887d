use anyhow::Result;
use clap::Parser;

mod commands;
mod host;
mod output;
mod session;
pub mod ux_error;

use commands::{Cli, Commands};
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let global = cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(global, args).await,
        Commands::Add(args) => commands::add::run(Session::open(&global)?, args).await,
        Commands::Templates => commands::add::run_templates(Session::open(&global)?),
        Commands::Save(args) => commands::save::run(Session::open(&global)?, args).await,
        Commands::History(args) => commands::history::run(Session::open(&global)?, args).await,
        Commands::Restore(args) => {
            commands::history::run_restore(Session::open(&global)?, args).await
        }
        Commands::Assimilate(args) => {
            commands::assimilate::run(Session::open(&global)?, args).await
        }
        Commands::Publish(args) => commands::publish::run(Session::open(&global)?, args).await,
        Commands::Global(cmd) => commands::global::run(Session::open(&global)?, cmd).await,
        Commands::Watch => commands::watch::run(Session::open(&global)?).await,
        Commands::Status(args) => commands::status::run(Session::open(&global)?, args).await,
        Commands::Completion(args) => commands::completion::run(args)
    }
}
