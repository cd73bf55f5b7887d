use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub async fn run(session: Session, args: StatusArgs) -> Result<()> {
    let report = if session.memory.has_workspace() {
        Some(session.memory.status().await.map_err(ux_error::report)?)
    } else {
        None
    };

    if args.json {
        let output = json!({
            "workspace": session.workspace.as_ref().map(|w| json!({
                "value": w.value.display().to_string(),
                "source": w.source.to_string()
            })),
            "configFile": session.config_file.as_ref().map(|p| p.display().to_string()),
            "globalRoot": session.global_root.as_ref().map(|g| json!({
                "value": g.value.display().to_string(),
                "source": g.source.to_string()
            })),
            "status": report
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::header("Project Memory Status");
    println!();

    output::subheader("Workspace:");
    match &session.workspace {
        Some(root) => print_value(
            "root",
            &root.value.display().to_string(),
            &root.source.to_string()
        ),
        None => println!("  {:<14} {}", "root:", "(none)".dimmed())
    }
    match &session.config_file {
        Some(path) => output::field("config", &path.display().to_string()),
        None => println!("  {:<14} {}", "config:", "(defaults)".dimmed())
    }

    let Some(report) = report else {
        println!();
        output::hint("Run 'project-memory init' to set up a workspace.");
        return Ok(());
    };
    output::field("mode", &report.mode.to_string());
    output::field("syncOnSave", on_off(report.sync_on_save));

    println!();
    output::subheader("Documents:");
    for doc in &report.documents {
        let state = if doc.exists {
            utils::format_size(doc.bytes).green()
        } else {
            "missing".red()
        };
        println!(
            "  {:<14} {} {}",
            format!("{}:", doc.role),
            doc.path.as_str().cyan(),
            format!("({state})").dimmed()
        );
    }

    println!();
    output::subheader("History:");
    output::field("enabled", on_off(report.history.enabled));
    output::field("dir", report.history.dir.as_str());
    output::field(
        "snapshots",
        &format!("{} of {}", report.history.snapshots, report.history.max_entries)
    );

    println!();
    output::subheader("Global memory:");
    output::field("enabled", on_off(report.global.enabled));
    match (&report.global.location, &session.global_root) {
        (Some(location), Some(root)) => print_value("location", location, &root.source.to_string()),
        (Some(location), None) => output::field("location", location),
        (None, _) => println!("  {:<14} {}", "location:", "(none)".dimmed())
    }

    Ok(())
}

fn print_value(name: &str, value: &str, source: &str) {
    println!(
        "  {:<14} {} {}",
        format!("{name}:"),
        value.cyan(),
        format!("({source})").dimmed()
    );
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}
