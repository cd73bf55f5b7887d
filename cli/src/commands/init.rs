use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use config::{CONFIG_FILE_CANDIDATES, Config};
use context::MARKER_DIR;

use super::GlobalArgs;
use crate::output;
use crate::session::Session;
use crate::ux_error;

#[derive(Args)]
pub struct InitArgs {
    #[arg(short, long, help = "Directory to initialize (defaults to current)")]
    pub path: Option<PathBuf>,

    #[arg(long, help = "Force overwrite existing project-memory.toml")]
    pub force: bool
}

pub async fn run(mut global: GlobalArgs, args: InitArgs) -> Result<()> {
    let target_dir = match args.path.or_else(|| global.workspace.clone()) {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read the current directory")?
    };
    let marker_dir = target_dir.join(MARKER_DIR);
    fs::create_dir_all(&marker_dir)
        .with_context(|| format!("Failed to create {}", marker_dir.display()))?;

    let config_file = target_dir.join(CONFIG_FILE_CANDIDATES[0]);
    let wrote_config = if config_file.exists() && !args.force {
        output::warn(&format!(
            "Config already exists at {}",
            config_file.display()
        ));
        output::info("Use --force to overwrite");
        false
    } else {
        fs::write(&config_file, config_template()?)
            .with_context(|| format!("Failed to write {}", config_file.display()))?;
        true
    };

    global.workspace = Some(target_dir.clone());
    let session = Session::open(&global)?;
    let created = session
        .memory
        .ensure_documents()
        .await
        .map_err(ux_error::report)?;

    println!(
        "{} Initialized project memory at {}",
        "✓".green().bold(),
        target_dir.display()
    );

    println!("\n{}", "Documents:".bold());
    for (kind, path) in session.memory.layout().canonical_documents() {
        let state = if created.contains(path) {
            "created".green()
        } else {
            "kept".dimmed()
        };
        println!("  {:<10} {} ({})", format!("{kind}:"), path.as_str().cyan(), state);
    }
    if wrote_config {
        println!("  {:<10} {}", "config:", config_file.display().to_string().cyan());
    }

    println!(
        "\n{}",
        "Run 'project-memory add' to append your first entry.".dimmed()
    );

    Ok(())
}

fn config_template() -> Result<String> {
    let body = toml::to_string_pretty(&Config::default())
        .context("Failed to render the default configuration")?;
    Ok(format!(
        "# Project memory configuration. Every key is optional.\n\
         # mode = \"published\" keeps AI-MEMORY.md at the root and publishes a rule summary.\n\n{body}"
    ))
}
