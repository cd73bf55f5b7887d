use anyhow::Result;
use clap::Args;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct AssimilateArgs {
    #[arg(short, long, help = "Import without asking for confirmation")]
    pub yes: bool
}

pub async fn run(session: Session, args: AssimilateArgs) -> Result<()> {
    let report = session
        .memory
        .assimilate(args.yes)
        .await
        .map_err(ux_error::report)?;

    let Some(report) = report else {
        if !args.yes {
            output::hint("Pass --yes to import without a prompt.");
        }
        return Ok(());
    };

    for source in &report.imported {
        output::success(&format!("Imported {}", source));
    }
    for source in &report.skipped_empty {
        output::info(&format!("Skipped empty {}", source));
    }
    if !report.failed.is_empty() {
        anyhow::bail!("{} document(s) could not be imported", report.failed.len());
    }
    Ok(())
}
