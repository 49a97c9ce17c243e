use anyhow::{anyhow, Result};

use crate::application::ports::ProviderStore;
use crate::application::use_cases::RemoteDirectoriesUseCase;
use crate::presentation::cli::{AppContext, OutputFormat};

/// Handler for the dirs command
pub struct DirsCommand {
    pub provider_id: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: Option<String>,
    pub output: OutputFormat,
}

impl DirsCommand {
    pub async fn execute(&self, context: &AppContext) -> Result<()> {
        // The operator acts within the provider's own organization
        let provider = context
            .store
            .find_provider(&self.provider_id)
            .await?
            .ok_or_else(|| anyhow!("Git provider not found: {}", self.provider_id))?;

        let use_case = RemoteDirectoriesUseCase::new(context.resolver());
        let directories = use_case
            .available_remote_directories(
                &provider.organization_id,
                &self.provider_id,
                &self.owner,
                &self.repo,
                &self.branch,
                self.path.as_deref(),
            )
            .await?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&directories)?),
            OutputFormat::Text => {
                for directory in &directories {
                    println!("{}/", directory);
                }
            }
        }
        Ok(())
    }
}
