use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::application::ports::{ProviderStore, RepositoryStore};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::Repository;

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddRepositoryCommand {
    #[validate(length(min = 1, message = "is required"))]
    pub organization_id: String,

    #[validate(length(min = 1, message = "is required"))]
    pub owner: String,

    #[validate(length(min = 1, message = "is required"))]
    pub repo_name: String,

    #[serde(default = "default_branch")]
    #[validate(length(min = 1, message = "is required"))]
    pub branch: String,

    #[validate(length(min = 1, message = "is required"))]
    pub provider_id: String,

    /// Accept a provider without a token
    #[serde(default)]
    pub allow_tokenless: bool,
}

/// Registers a tracked repository after validating its provider.
pub struct AddRepositoryUseCase {
    providers: Arc<dyn ProviderStore>,
    repositories: Arc<dyn RepositoryStore>,
}

impl AddRepositoryUseCase {
    pub fn new(providers: Arc<dyn ProviderStore>, repositories: Arc<dyn RepositoryStore>) -> Self {
        Self {
            providers,
            repositories,
        }
    }

    pub async fn execute(&self, command: AddRepositoryCommand) -> GitgateResult<Repository> {
        validate_command(&command)?;
        let owner = command.owner.trim();
        let repo_name = command.repo_name.trim();
        let branch = command.branch.trim();

        let provider = self
            .providers
            .find_provider(&command.provider_id)
            .await?
            .ok_or_else(|| GitgateError::provider_not_found(&command.provider_id))?;
        if provider.organization_id != command.organization_id {
            return Err(GitgateError::ProviderOrganizationMismatch {
                provider_id: provider.id,
                organization_id: command.organization_id,
            });
        }
        if !provider.has_token() && !command.allow_tokenless {
            return Err(GitgateError::missing_token(&provider.id));
        }

        let existing = self
            .repositories
            .find_by_target(&command.organization_id, owner, repo_name, branch)
            .await?;
        if existing.is_some() {
            return Err(GitgateError::RepositoryAlreadyExists {
                owner: owner.to_string(),
                repo: repo_name.to_string(),
                branch: branch.to_string(),
            });
        }

        let repository = Repository::new(
            Uuid::new_v4().to_string(),
            owner,
            repo_name,
            &provider.id,
            &command.organization_id,
        )
        .with_branch(branch);
        self.repositories.save_repository(repository.clone()).await?;
        info!(
            repository_id = %repository.id,
            repository = %repository.full_name(),
            branch = %repository.branch,
            provider_id = %provider.id,
            "Repository added"
        );
        Ok(repository)
    }
}

/// First failing field, as a validation error.
fn validate_command(command: &AddRepositoryCommand) -> GitgateResult<()> {
    if let Err(errors) = command.validate() {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some((field, _)) = fields.first() {
            return Err(GitgateError::validation_error(field.to_string(), "is required", None));
        }
    }
    for (field, value) in [
        ("owner", &command.owner),
        ("repo_name", &command.repo_name),
        ("branch", &command.branch),
        ("provider_id", &command.provider_id),
    ] {
        crate::common::result::require_non_empty(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{seeded_store, ORG};
    use crate::domain::entities::Provider;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn command(owner: &str, repo: &str, branch: &str) -> AddRepositoryCommand {
        AddRepositoryCommand {
            organization_id: ORG.into(),
            owner: owner.into(),
            repo_name: repo.into(),
            branch: branch.into(),
            provider_id: "p1".into(),
            allow_tokenless: false,
        }
    }

    fn use_case(store: Arc<InMemoryStore>) -> AddRepositoryUseCase {
        AddRepositoryUseCase::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_same_target_is_rejected_other_branch_allowed() {
        let use_case = use_case(seeded_store());
        let err = use_case
            .execute(command("acme", "widgets", "main"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::RepositoryAlreadyExists { .. }));

        let repo = use_case.execute(command("acme", "widgets", "dev")).await.unwrap();
        assert_eq!(repo.branch, "dev");
    }

    #[tokio::test]
    async fn test_empty_field_fails_fast() {
        let err = use_case(seeded_store())
            .execute(command("acme", "", "main"))
            .await
            .unwrap_err();
        match err {
            GitgateError::ValidationError { field, .. } => assert_eq!(field, "repo_name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_tokenless_provider_needs_opt_in() {
        let store = Arc::new(InMemoryStore::seeded(
            vec![Provider::new("p1", "gitlab", ORG)],
            vec![],
        ));
        let use_case = use_case(store);
        let err = use_case.execute(command("acme", "tools", "main")).await.unwrap_err();
        assert!(matches!(err, GitgateError::MissingToken { .. }));

        let mut tokenless = command("acme", "tools", "main");
        tokenless.allow_tokenless = true;
        assert!(use_case.execute(tokenless).await.is_ok());
    }

    #[tokio::test]
    async fn test_provider_checks() {
        let use_case = use_case(seeded_store());
        let mut missing = command("acme", "x", "main");
        missing.provider_id = "nope".into();
        assert!(matches!(
            use_case.execute(missing).await.unwrap_err(),
            GitgateError::ProviderNotFound { .. }
        ));

        let mut foreign = command("acme", "x", "main");
        foreign.organization_id = "org-2".into();
        assert!(matches!(
            use_case.execute(foreign).await.unwrap_err(),
            GitgateError::ProviderOrganizationMismatch { .. }
        ));
    }
}
