use serde::{Deserialize, Serialize};

/// A tracked `(owner, repo_name, branch)` on one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub owner: String,
    pub repo_name: String,
    pub branch: String,
    pub provider_id: String,
    pub organization_id: String,
}

impl Repository {
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        repo_name: impl Into<String>,
        provider_id: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            repo_name: repo_name.into(),
            branch: "main".to_string(),
            provider_id: provider_id.into(),
            organization_id: organization_id.into(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// `owner/repo` as shown in logs and messages.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo_name)
    }

    /// Whether this record occupies the same `(owner, repo, branch)` slot.
    pub fn same_target(&self, owner: &str, repo_name: &str, branch: &str) -> bool {
        self.owner == owner && self.repo_name == repo_name && self.branch == branch
    }
}

/// Coordinates handed to an adapter at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }
}

impl From<&Repository> for RepoTarget {
    fn from(repository: &Repository) -> Self {
        Self::new(&repository.owner, &repository.repo_name, &repository.branch)
    }
}
