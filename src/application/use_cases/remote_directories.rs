use tracing::debug;

use crate::application::services::AdapterResolver;
use crate::common::result::{require_non_empty, GitgateResult};
use crate::domain::entities::RepoTarget;
use crate::infrastructure::vendors::TokenPolicy;

/// Directory queries, for repositories that may not be tracked yet.
pub struct RemoteDirectoriesUseCase {
    resolver: AdapterResolver,
}

impl RemoteDirectoriesUseCase {
    pub fn new(resolver: AdapterResolver) -> Self {
        Self { resolver }
    }

    /// Directories below `path` (repository root when `None`) on any
    /// repository the provider can reach.
    pub async fn available_remote_directories(
        &self,
        organization_id: &str,
        provider_id: &str,
        owner: &str,
        repo: &str,
        branch: &str,
        path: Option<&str>,
    ) -> GitgateResult<Vec<String>> {
        require_non_empty("provider_id", provider_id)?;
        require_non_empty("owner", owner)?;
        require_non_empty("repo", repo)?;
        require_non_empty("branch", branch)?;

        let provider = self.resolver.provider(provider_id, organization_id).await?;
        let adapter = self.resolver.factory().create_repo(
            &provider,
            RepoTarget::new(owner, repo, branch),
            TokenPolicy::Required,
        )?;
        let directories = adapter.list_directories_on_repo(path).await?;
        debug!(provider_id, owner, repo, branch, count = directories.len(), "Listed remote directories");
        Ok(directories)
    }

    /// Whether `path` is a directory on a tracked repository, at `branch`
    /// or the tracked branch.
    pub async fn check_directory_existence(
        &self,
        organization_id: &str,
        repository_id: &str,
        path: &str,
        branch: Option<&str>,
    ) -> GitgateResult<bool> {
        require_non_empty("repository_id", repository_id)?;
        require_non_empty("path", path)?;
        let resolved = self
            .resolver
            .resolve(organization_id, repository_id, TokenPolicy::Required)
            .await?;
        resolved.adapter.check_directory_exists(path, branch).await
    }
}
