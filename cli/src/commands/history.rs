use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Snapshot id, e.g. 2026-10-16T12-34-56-789Z (prompts when omitted)
    pub id: Option<String>
}

pub async fn run(session: Session, args: HistoryArgs) -> Result<()> {
    let entries = session.memory.history().await.map_err(ux_error::report)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        output::info(&format!(
            "No history yet. Save {} to create history.",
            session.memory.layout().memory.file_name()
        ));
        return Ok(());
    }

    output::header("Memory History");
    for entry in &entries {
        println!("  {}  {}", entry.label.cyan(), entry.id.dimmed());
    }
    Ok(())
}

pub async fn run_restore(session: Session, args: RestoreArgs) -> Result<()> {
    let restored = session
        .memory
        .restore(args.id.as_deref())
        .await
        .map_err(ux_error::report)?;

    if let Some(restored) = restored {
        output::success(&format!(
            "Restored {} from {}",
            restored.target, restored.snapshot_id
        ));
    }
    Ok(())
}
