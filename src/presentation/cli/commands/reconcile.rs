use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;

use crate::application::services::WebhookReconciler;
use crate::domain::value_objects::Vendor;
use crate::presentation::cli::{AppContext, OutputFormat};

/// Handler for the reconcile command. Works offline on a saved payload.
pub struct ReconcileCommand {
    pub vendor: Vendor,
    pub branch: String,
    pub pattern: String,
    pub payload: PathBuf,
    pub output: OutputFormat,
}

impl ReconcileCommand {
    pub async fn execute(&self, context: &AppContext) -> Result<()> {
        let contents = tokio::fs::read_to_string(&self.payload)
            .await
            .with_context(|| format!("Failed to read payload {}", self.payload.display()))?;
        let payload: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Payload {} is not valid JSON", self.payload.display()))?;

        let reconciler = WebhookReconciler::new(context.factory.clone());
        let events = reconciler.extract_matching_files(self.vendor, &payload, &self.branch, &self.pattern)?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
            OutputFormat::Text => {
                if events.is_empty() {
                    println!("{}", "No matching files".yellow());
                }
                for event in &events {
                    let short_sha: String = event.commit.sha.chars().take(8).collect();
                    print!("{} {}", short_sha.cyan(), event.file_path.bold());
                    if let Some(author) = &event.commit.author {
                        print!(" ({})", author);
                    }
                    if let Some(message) = &event.commit.message {
                        print!(" {}", message.lines().next().unwrap_or_default().dimmed());
                    }
                    println!();
                }
            }
        }
        Ok(())
    }
}
