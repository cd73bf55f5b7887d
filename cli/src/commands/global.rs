use anyhow::Result;
use clap::Subcommand;
use memory::{CopyOutcome, GlobalOpen};

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Subcommand)]
pub enum GlobalCommand {
    #[command(about = "Create the global memory document if needed and show where it is")]
    Open,

    #[command(about = "Copy the global memory document into the workspace rules")]
    Copy,

    #[command(about = "Print the location of the global memory document")]
    Path
}

pub async fn run(session: Session, cmd: GlobalCommand) -> Result<()> {
    match cmd {
        GlobalCommand::Open => {
            let opened = session.memory.open_global().await.map_err(ux_error::report)?;
            if let GlobalOpen::Opened { created: true, .. } = opened {
                output::info("Created the global memory document.");
            }
        }
        GlobalCommand::Copy => {
            let copied = session
                .memory
                .copy_global_into_workspace()
                .await
                .map_err(ux_error::report)?;
            if let CopyOutcome::Copied { bytes, .. } = copied {
                output::success(&format!("Copied {}", utils::format_size(bytes)));
            }
        }
        GlobalCommand::Path => {
            if !session.memory.config().global_memory.enabled {
                output::info("Global memory is disabled.");
                return Ok(());
            }
            match session.memory.global_location() {
                Some(location) => println!("{location}"),
                None => {
                    ux_error::no_global_root().display();
                    anyhow::bail!("No global memory directory available");
                }
            }
        }
    }
    Ok(())
}
