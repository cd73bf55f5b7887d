//! Terminal implementations of the host collaborators.

use async_trait::async_trait;
use colored::Colorize;
use console::Term;
use dialoguer::{Select, theme::ColorfulTheme};
use pm_core::{ChangeObserver, ChangeReason, Notifier, PickItem, Picker, Revealer};
use std::io::IsTerminal;
use tracing::debug;

use crate::output;

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn info(&self, message: &str) {
        output::info(message);
    }

    fn warn(&self, message: &str) {
        output::warn(message);
    }
}

/// Selection prompt on stderr. Without a terminal every prompt is answered
/// as cancelled.
#[derive(Debug, Clone, Copy)]
pub struct DialoguerPicker {
    interactive: bool
}

impl DialoguerPicker {
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal() && Term::stderr().is_term()
        }
    }
}

#[async_trait]
impl Picker for DialoguerPicker {
    async fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        if !self.interactive {
            debug!("Not a terminal, cancelling prompt '{}'", title);
            return None;
        }

        let labels: Vec<String> = items
            .iter()
            .map(|item| match &item.description {
                Some(description) => format!("{}  {}", item.label, description.dimmed()),
                None => item.label.clone()
            })
            .collect();
        let title = title.to_string();

        let answer = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(title)
                .items(&labels)
                .default(0)
                .interact_on_opt(&Term::stderr())
        })
        .await;

        match answer {
            Ok(Ok(choice)) => choice,
            Ok(Err(e)) => {
                debug!("Prompt failed: {}", e);
                None
            }
            Err(e) => {
                debug!("Prompt task failed: {}", e);
                None
            }
        }
    }
}

/// Prints `location:line` so terminals and editors can jump to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintRevealer;

#[async_trait]
impl Revealer for PrintRevealer {
    async fn reveal(&self, location: &str, line: Option<usize>) {
        println!("{}", reveal_target(location, line));
    }
}

/// Line numbers are printed 1-based.
pub fn reveal_target(location: &str, line: Option<usize>) -> String {
    match line {
        Some(index) => format!("{}:{}", location, index + 1),
        None => location.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl ChangeObserver for LoggingObserver {
    fn invalidate(&self, reason: &ChangeReason) {
        debug!("Documents changed: {}", reason);
    }
}
