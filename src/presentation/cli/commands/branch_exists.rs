use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use crate::application::services::ProviderService;
use crate::presentation::cli::{AppContext, OutputFormat};

/// Handler for the branch-exists command
pub struct BranchExistsCommand {
    pub provider_id: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub output: OutputFormat,
}

impl BranchExistsCommand {
    pub async fn execute(&self, context: &AppContext) -> Result<()> {
        let service = ProviderService::new(
            context.store.clone(),
            context.store.clone(),
            context.factory.clone(),
        );
        let exists = service
            .check_branch_exists(&self.provider_id, &self.owner, &self.repo, &self.branch)
            .await?;

        match self.output {
            OutputFormat::Json => println!(
                "{}",
                json!({
                    "owner": self.owner,
                    "repo": self.repo,
                    "branch": self.branch,
                    "exists": exists,
                })
            ),
            OutputFormat::Text => {
                let target = format!("{}/{}@{}", self.owner, self.repo, self.branch);
                if exists {
                    println!("{} {}", "✓".green(), target);
                } else {
                    println!("{} {} does not exist", "✗".red(), target);
                }
            }
        }
        Ok(())
    }
}
