use anyhow::Result;
use clap::{Args, ValueEnum};
use pm_core::DocumentKind;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct SaveArgs {
    #[arg(value_enum, default_value = "memory", help = "Document to save")]
    pub document: DocumentChoice
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DocumentChoice {
    Memory,
    Completed
}

impl From<DocumentChoice> for DocumentKind {
    fn from(choice: DocumentChoice) -> Self {
        match choice {
            DocumentChoice::Memory => DocumentKind::Memory,
            DocumentChoice::Completed => DocumentKind::Completed
        }
    }
}

pub async fn run(session: Session, args: SaveArgs) -> Result<()> {
    let outcome = session
        .memory
        .save(args.document.into())
        .await
        .map_err(ux_error::report)?;

    match &outcome.snapshot {
        Some(snapshot) => {
            output::success(&format!("Snapshot {}", snapshot.id));
            if !snapshot.prune.deleted.is_empty() {
                output::info(&format!(
                    "Pruned {} old snapshot(s)",
                    snapshot.prune.deleted.len()
                ));
            }
            for failed in &snapshot.prune.failed {
                output::warn(&format!("Could not prune {}", failed));
            }
        }
        None => output::info("No snapshot taken")
    }
    if let Some(summary) = &outcome.published {
        output::success(&format!("Published {}", summary.path));
    }
    Ok(())
}
