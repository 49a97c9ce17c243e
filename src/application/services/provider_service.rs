use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::ports::{ProviderStore, RepositoryStore};
use crate::common::error::GitgateError;
use crate::common::result::{require_non_empty, GitgateResult};
use crate::domain::entities::{AvailableRepository, Provider, ProviderUpdate};
use crate::domain::value_objects::Vendor;
use crate::infrastructure::vendors::{TokenPolicy, VendorFactory};

/// Input for registering a vendor account.
#[derive(Debug, Clone)]
pub struct AddProviderCommand {
    pub organization_id: String,
    pub vendor: String,
    pub token: Option<String>,
    pub base_url: Option<String>,
}

/// Provider lifecycle plus the account-level vendor queries.
pub struct ProviderService {
    providers: Arc<dyn ProviderStore>,
    repositories: Arc<dyn RepositoryStore>,
    factory: Arc<VendorFactory>,
}

impl ProviderService {
    pub fn new(
        providers: Arc<dyn ProviderStore>,
        repositories: Arc<dyn RepositoryStore>,
        factory: Arc<VendorFactory>,
    ) -> Self {
        Self {
            providers,
            repositories,
            factory,
        }
    }

    pub async fn add_provider(&self, command: AddProviderCommand) -> GitgateResult<Provider> {
        require_non_empty("organization_id", &command.organization_id)?;
        let vendor: Vendor = command.vendor.parse()?;

        let mut provider = Provider::new(Uuid::new_v4().to_string(), vendor.to_string(), &command.organization_id);
        provider.token = command.token;
        provider.base_url = command.base_url;
        if !provider.has_token() {
            warn!(provider_id = %provider.id, "Provider created without a token");
        }

        self.providers.save_provider(provider.clone()).await?;
        info!(provider_id = %provider.id, vendor = %vendor, organization_id = %provider.organization_id, "Provider added");
        Ok(provider)
    }

    pub async fn update_provider(
        &self,
        provider_id: &str,
        organization_id: &str,
        update: ProviderUpdate,
    ) -> GitgateResult<Provider> {
        let mut provider = self.owned_provider(provider_id, organization_id).await?;
        if let Some(token) = update.token {
            provider.token = Some(token);
        }
        if let Some(base_url) = update.base_url {
            provider.base_url = Some(base_url);
        }
        self.providers.save_provider(provider.clone()).await?;
        info!(provider_id, "Provider updated");
        Ok(provider)
    }

    /// Soft delete. Refused while repositories reference the provider,
    /// unless `force` is set.
    pub async fn delete_provider(&self, provider_id: &str, organization_id: &str, force: bool) -> GitgateResult<()> {
        let mut provider = self.owned_provider(provider_id, organization_id).await?;
        let repository_count = self.repositories.count_by_provider(provider_id).await?;
        if repository_count > 0 && !force {
            return Err(GitgateError::ProviderInUse {
                provider_id: provider_id.to_string(),
                repository_count,
            });
        }
        if repository_count > 0 {
            warn!(provider_id, repository_count, "Force-deleting provider still in use");
        }
        provider.deleted = true;
        self.providers.save_provider(provider).await?;
        info!(provider_id, "Provider deleted");
        Ok(())
    }

    pub async fn list_available_repos(&self, provider_id: &str) -> GitgateResult<Vec<AvailableRepository>> {
        let provider = self.existing_provider(provider_id).await?;
        let adapter = self.factory.create_provider(&provider, TokenPolicy::Required)?;
        let repositories = adapter.list_available_repositories().await?;
        info!(provider_id, count = repositories.len(), "Listed available repositories");
        Ok(repositories)
    }

    pub async fn check_branch_exists(
        &self,
        provider_id: &str,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GitgateResult<bool> {
        require_non_empty("owner", owner)?;
        require_non_empty("repo", repo)?;
        require_non_empty("branch", branch)?;
        let provider = self.existing_provider(provider_id).await?;
        let adapter = self.factory.create_provider(&provider, TokenPolicy::Required)?;
        adapter.check_branch_exists(owner, repo, branch).await
    }

    async fn existing_provider(&self, provider_id: &str) -> GitgateResult<Provider> {
        require_non_empty("provider_id", provider_id)?;
        self.providers
            .find_provider(provider_id)
            .await?
            .ok_or_else(|| GitgateError::provider_not_found(provider_id))
    }

    async fn owned_provider(&self, provider_id: &str, organization_id: &str) -> GitgateResult<Provider> {
        let provider = self.existing_provider(provider_id).await?;
        if provider.organization_id != organization_id {
            return Err(GitgateError::ProviderOrganizationMismatch {
                provider_id: provider_id.to_string(),
                organization_id: organization_id.to_string(),
            });
        }
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockProviderStore, MockRepositoryStore};
    use crate::application::test_support::{fake_factory, FakeRemote, ORG};

    fn github_provider() -> Provider {
        Provider::new("p1", "github", ORG).with_token("ghp_test")
    }

    fn service(providers: MockProviderStore, repositories: MockRepositoryStore) -> ProviderService {
        ProviderService::new(
            Arc::new(providers),
            Arc::new(repositories),
            fake_factory(Arc::new(FakeRemote::default())),
        )
    }

    #[tokio::test]
    async fn test_delete_blocked_while_in_use() {
        let mut providers = MockProviderStore::new();
        providers
            .expect_find_provider()
            .withf(|provider_id| provider_id == "p1")
            .returning(|_| Ok(Some(github_provider())));
        providers.expect_save_provider().never();
        let mut repositories = MockRepositoryStore::new();
        repositories.expect_count_by_provider().returning(|_| Ok(2));

        let err = service(providers, repositories)
            .delete_provider("p1", ORG, false)
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::ProviderInUse { repository_count: 2, .. }));
    }

    #[tokio::test]
    async fn test_forced_delete_marks_provider_deleted() {
        let mut providers = MockProviderStore::new();
        providers
            .expect_find_provider()
            .returning(|_| Ok(Some(github_provider())));
        providers
            .expect_save_provider()
            .withf(|provider| provider.deleted)
            .times(1)
            .returning(|_| Ok(()));
        let mut repositories = MockRepositoryStore::new();
        repositories.expect_count_by_provider().returning(|_| Ok(1));

        service(providers, repositories)
            .delete_provider("p1", ORG, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_vendor_before_saving() {
        let mut providers = MockProviderStore::new();
        providers.expect_save_provider().never();
        let err = service(providers, MockRepositoryStore::new())
            .add_provider(AddProviderCommand {
                organization_id: ORG.into(),
                vendor: "bitbucket".into(),
                token: Some("t".into()),
                base_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::UnsupportedVendor { .. }));
    }

    #[tokio::test]
    async fn test_update_rotates_token() {
        let mut providers = MockProviderStore::new();
        providers
            .expect_find_provider()
            .returning(|_| Ok(Some(github_provider())));
        providers.expect_save_provider().returning(|_| Ok(()));
        let updated = service(providers, MockRepositoryStore::new())
            .update_provider(
                "p1",
                ORG,
                ProviderUpdate {
                    token: Some("ghp_new".into()),
                    base_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.token(), Some("ghp_new"));
    }

    #[tokio::test]
    async fn test_branch_check_requires_token() {
        let mut providers = MockProviderStore::new();
        providers
            .expect_find_provider()
            .returning(|_| Ok(Some(Provider::new("p1", "github", ORG))));
        let err = service(providers, MockRepositoryStore::new())
            .check_branch_exists("p1", "acme", "widgets", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::MissingToken { .. }));
    }

    #[tokio::test]
    async fn test_lists_repositories_and_checks_branch() {
        let mut providers = MockProviderStore::new();
        providers
            .expect_find_provider()
            .returning(|_| Ok(Some(github_provider())));
        let service = service(providers, MockRepositoryStore::new());
        let repos = service.list_available_repos("p1").await.unwrap();
        assert_eq!(repos[0].name, "widgets");
        assert!(service.check_branch_exists("p1", "acme", "widgets", "main").await.unwrap());
        assert!(!service.check_branch_exists("p1", "acme", "widgets", "dev").await.unwrap());
    }
}
