use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct AddArgs {
    /// Template id (prompts when omitted; cancelling uses the first template)
    #[arg(short, long)]
    pub template: Option<String>
}

pub async fn run(session: Session, args: AddArgs) -> Result<()> {
    let entry = session
        .memory
        .add_entry(args.template.as_deref())
        .await
        .map_err(ux_error::report)?;

    output::success(&format!(
        "Added {} entry to {}",
        entry.template_id,
        session.memory.layout().memory
    ));
    Ok(())
}

pub fn run_templates(session: Session) -> Result<()> {
    output::header("Templates");
    for (index, template) in session.memory.templates().iter().enumerate() {
        let marker = if index == 0 { " (default)" } else { "" };
        println!(
            "  {:<10} {}{}",
            template.id.cyan(),
            template.label,
            marker.dimmed()
        );
    }
    Ok(())
}
