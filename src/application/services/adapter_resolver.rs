use std::sync::Arc;
use tracing::debug;

use crate::application::ports::{ProviderStore, RepositoryStore};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::{Provider, RepoTarget, Repository};
use crate::infrastructure::vendors::{GitRepo, TokenPolicy, VendorFactory};

/// A tracked repository with its provider and a ready adapter.
pub struct ResolvedRepository {
    pub repository: Repository,
    pub provider: Provider,
    pub adapter: Arc<dyn GitRepo>,
}

/// Looks up repository and provider records and builds the adapter for them.
#[derive(Clone)]
pub struct AdapterResolver {
    providers: Arc<dyn ProviderStore>,
    repositories: Arc<dyn RepositoryStore>,
    factory: Arc<VendorFactory>,
}

impl AdapterResolver {
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

    pub fn factory(&self) -> &VendorFactory {
        &self.factory
    }

    /// Provider by id, checked against the caller's organization.
    pub async fn provider(&self, provider_id: &str, organization_id: &str) -> GitgateResult<Provider> {
        let provider = self
            .providers
            .find_provider(provider_id)
            .await?
            .ok_or_else(|| GitgateError::provider_not_found(provider_id))?;
        if provider.organization_id != organization_id {
            return Err(GitgateError::ProviderOrganizationMismatch {
                provider_id: provider_id.to_string(),
                organization_id: organization_id.to_string(),
            });
        }
        Ok(provider)
    }

    /// Repositories of another organization are reported as not found.
    pub async fn repository(&self, repository_id: &str, organization_id: &str) -> GitgateResult<Repository> {
        self.repositories
            .find_repository(repository_id)
            .await?
            .filter(|repository| repository.organization_id == organization_id)
            .ok_or_else(|| GitgateError::repository_not_found(repository_id))
    }

    pub async fn resolve(
        &self,
        organization_id: &str,
        repository_id: &str,
        policy: TokenPolicy,
    ) -> GitgateResult<ResolvedRepository> {
        let repository = self.repository(repository_id, organization_id).await?;
        let provider = self.provider(&repository.provider_id, organization_id).await?;
        debug!(
            repository_id,
            provider_id = %provider.id,
            vendor = %provider.vendor,
            "Resolved repository adapter"
        );
        let adapter = self
            .factory
            .create_repo(&provider, RepoTarget::from(&repository), policy)?;
        Ok(ResolvedRepository {
            repository,
            provider,
            adapter,
        })
    }
}
