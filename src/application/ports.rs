//! Persistence ports. Storage itself lives outside this crate; the
//! in-memory store in `infrastructure` backs tests and the CLI.

use async_trait::async_trait;

use crate::common::result::GitgateResult;
use crate::domain::entities::{Commit, Provider, Repository};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Soft-deleted providers are not returned.
    async fn find_provider(&self, provider_id: &str) -> GitgateResult<Option<Provider>>;

    async fn save_provider(&self, provider: Provider) -> GitgateResult<()>;

    async fn list_providers(&self, organization_id: &str) -> GitgateResult<Vec<Provider>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn find_repository(&self, repository_id: &str) -> GitgateResult<Option<Repository>>;

    async fn find_by_target(
        &self,
        organization_id: &str,
        owner: &str,
        repo_name: &str,
        branch: &str,
    ) -> GitgateResult<Option<Repository>>;

    async fn save_repository(&self, repository: Repository) -> GitgateResult<()>;

    async fn count_by_provider(&self, provider_id: &str) -> GitgateResult<usize>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitStore: Send + Sync {
    async fn save_commit(&self, repository_id: &str, commit: Commit) -> GitgateResult<()>;

    async fn list_commits(&self, repository_id: &str) -> GitgateResult<Vec<Commit>>;
}
