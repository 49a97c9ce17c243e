use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::application::ports::{CommitStore, ProviderStore, RepositoryStore};
use crate::common::result::GitgateResult;
use crate::domain::entities::{Commit, Provider, Repository};

/// Process-local store behind every persistence port.
#[derive(Default)]
pub struct InMemoryStore {
    providers: RwLock<HashMap<String, Provider>>,
    repositories: RwLock<HashMap<String, Repository>>,
    commits: RwLock<HashMap<String, Vec<Commit>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the given records, as loaded from configuration.
    pub fn seeded(providers: Vec<Provider>, repositories: Vec<Repository>) -> Self {
        Self {
            providers: RwLock::new(providers.into_iter().map(|p| (p.id.clone(), p)).collect()),
            repositories: RwLock::new(
                repositories.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ),
            commits: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProviderStore for InMemoryStore {
    async fn find_provider(&self, provider_id: &str) -> GitgateResult<Option<Provider>> {
        let providers = self.providers.read().await;
        Ok(providers.get(provider_id).filter(|p| !p.deleted).cloned())
    }

    async fn save_provider(&self, provider: Provider) -> GitgateResult<()> {
        self.providers.write().await.insert(provider.id.clone(), provider);
        Ok(())
    }

    async fn list_providers(&self, organization_id: &str) -> GitgateResult<Vec<Provider>> {
        let providers = self.providers.read().await;
        let mut found: Vec<Provider> = providers
            .values()
            .filter(|p| !p.deleted && p.organization_id == organization_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }
}

#[async_trait]
impl RepositoryStore for InMemoryStore {
    async fn find_repository(&self, repository_id: &str) -> GitgateResult<Option<Repository>> {
        Ok(self.repositories.read().await.get(repository_id).cloned())
    }

    async fn find_by_target(
        &self,
        organization_id: &str,
        owner: &str,
        repo_name: &str,
        branch: &str,
    ) -> GitgateResult<Option<Repository>> {
        let repositories = self.repositories.read().await;
        Ok(repositories
            .values()
            .find(|r| r.organization_id == organization_id && r.same_target(owner, repo_name, branch))
            .cloned())
    }

    async fn save_repository(&self, repository: Repository) -> GitgateResult<()> {
        self.repositories
            .write()
            .await
            .insert(repository.id.clone(), repository);
        Ok(())
    }

    async fn count_by_provider(&self, provider_id: &str) -> GitgateResult<usize> {
        let repositories = self.repositories.read().await;
        Ok(repositories.values().filter(|r| r.provider_id == provider_id).count())
    }
}

#[async_trait]
impl CommitStore for InMemoryStore {
    async fn save_commit(&self, repository_id: &str, commit: Commit) -> GitgateResult<()> {
        self.commits
            .write()
            .await
            .entry(repository_id.to_string())
            .or_default()
            .push(commit);
        Ok(())
    }

    async fn list_commits(&self, repository_id: &str) -> GitgateResult<Vec<Commit>> {
        Ok(self
            .commits
            .read()
            .await
            .get(repository_id)
            .cloned()
            .unwrap_or_default())
    }
}
