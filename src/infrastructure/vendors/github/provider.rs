use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::AvailableRepository;
use crate::domain::value_objects::repo_path::encode_path;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{ApiClient, Paginator};
use crate::infrastructure::vendors::vendor_interface::GitProvider;

pub struct GithubProvider {
    client: ApiClient,
}

impl GithubProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Maps one `/user/repos` entry, keeping only repositories with push rights.
    fn to_available(entry: &Value) -> Option<AvailableRepository> {
        let name = entry.get("name").and_then(Value::as_str)?;
        let owner = entry
            .get("owner")
            .and_then(|owner| owner.get("login"))
            .and_then(Value::as_str)?;

        match entry.get("permissions").and_then(|p| p.get("push")) {
            Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => {
                debug!(repo = name, "Repository excluded, no push permission");
                return None;
            }
            _ => {
                warn!(repo = name, "Repository has no usable permissions object, excluding");
                return None;
            }
        }

        Some(AvailableRepository {
            name: name.to_string(),
            owner: owner.to_string(),
            description: entry
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            private: entry.get("private").and_then(Value::as_bool).unwrap_or(false),
            default_branch: entry
                .get("default_branch")
                .and_then(Value::as_str)
                .unwrap_or("main")
                .to_string(),
            language: entry.get("language").and_then(Value::as_str).map(str::to_string),
            stars: entry.get("stargazers_count").and_then(Value::as_u64).unwrap_or(0),
        })
    }
}

#[async_trait]
impl GitProvider for GithubProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    async fn list_available_repositories(&self) -> GitgateResult<Vec<AvailableRepository>> {
        debug!("Fetching GitHub repositories");
        let pager = Paginator::new(
            self.client.clone(),
            "/user/repos?sort=updated&per_page=100",
            "user repositories",
        );
        let mut pages = Box::pin(pager.into_stream());
        let mut repositories = Vec::new();
        while let Some(page) = pages.next().await {
            match page?.json::<Value>()? {
                Value::Array(entries) => {
                    repositories.extend(entries.iter().filter_map(Self::to_available));
                }
                _ => warn!("GitHub returned a non-array repository page, ignoring"),
            }
        }
        info!(count = repositories.len(), "GitHub repositories retrieved");
        Ok(repositories)
    }

    async fn check_branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GitgateResult<bool> {
        let path = format!(
            "/repos/{}/{}/branches/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            encode_path(branch)
        );
        let response = self.client.get(&path).await?;
        match response.status {
            200..=299 => Ok(true),
            404 => Ok(false),
            401 | 403 | 429 => Err(self.client.error_for(&response, "branch")),
            status => Err(GitgateError::vendor_api(
                Vendor::Github.label(),
                Some(status),
                format!(
                    "Failed to check if branch exists for {}/{}/{}: {}",
                    owner,
                    repo,
                    branch,
                    response.error_message()
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_permission_filter() {
        let writable = json!({"name": "a", "owner": {"login": "o"}, "permissions": {"push": true}});
        let readonly = json!({"name": "b", "owner": {"login": "o"}, "permissions": {"push": false}});
        let stringly = json!({"name": "c", "owner": {"login": "o"}, "permissions": {"push": "true"}});
        let missing = json!({"name": "d", "owner": {"login": "o"}});
        assert!(GithubProvider::to_available(&writable).is_some());
        assert!(GithubProvider::to_available(&readonly).is_none());
        assert!(GithubProvider::to_available(&stringly).is_none());
        assert!(GithubProvider::to_available(&missing).is_none());
    }

    #[test]
    fn test_mapping_defaults() {
        let entry = json!({
            "name": "widgets",
            "owner": {"login": "acme"},
            "private": true,
            "default_branch": "develop",
            "stargazers_count": 7,
            "permissions": {"push": true}
        });
        let repo = GithubProvider::to_available(&entry).unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.default_branch, "develop");
        assert_eq!(repo.stars, 7);
        assert!(repo.private);
        assert_eq!(repo.description, None);
    }
}
