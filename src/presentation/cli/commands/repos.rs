use anyhow::Result;
use colored::Colorize;

use crate::application::services::ProviderService;
use crate::presentation::cli::{AppContext, OutputFormat};

/// Handler for the repos command
pub struct ReposCommand {
    pub provider_id: String,
    pub output: OutputFormat,
}

impl ReposCommand {
    pub fn new(provider_id: impl Into<String>, output: OutputFormat) -> Self {
        Self {
            provider_id: provider_id.into(),
            output,
        }
    }

    pub async fn execute(&self, context: &AppContext) -> Result<()> {
        let service = ProviderService::new(
            context.store.clone(),
            context.store.clone(),
            context.factory.clone(),
        );
        let repositories = service.list_available_repos(&self.provider_id).await?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&repositories)?),
            OutputFormat::Text => {
                if repositories.is_empty() {
                    println!("{}", "No repositories with push access".yellow());
                }
                for repo in &repositories {
                    let visibility = if repo.private {
                        "private".yellow()
                    } else {
                        "public".green()
                    };
                    print!(
                        "{}/{} [{}] {}",
                        repo.owner,
                        repo.name.bold(),
                        visibility,
                        repo.default_branch.blue()
                    );
                    if let Some(language) = &repo.language {
                        print!(" {}", language.dimmed());
                    }
                    println!(" ★{}", repo.stars);
                }
            }
        }
        Ok(())
    }
}
