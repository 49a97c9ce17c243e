use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{Project, MIN_PUSH_ACCESS_LEVEL};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::AvailableRepository;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{ApiClient, Paginator};
use crate::infrastructure::vendors::vendor_interface::GitProvider;

pub struct GitlabProvider {
    client: ApiClient,
}

impl GitlabProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn to_available(project: Project) -> Option<AvailableRepository> {
        let display_name = project.name.clone()?;
        project.namespace.as_ref()?;

        let level = match &project.permissions {
            Some(permissions) => permissions.max_access_level(),
            None => {
                debug!(project = %display_name, "Project has no permissions object, excluding");
                return None;
            }
        };
        if level < MIN_PUSH_ACCESS_LEVEL {
            debug!(project = %display_name, level, required = MIN_PUSH_ACCESS_LEVEL, "Project excluded, insufficient access level");
            return None;
        }

        // "group/sub/project" -> owner "group/sub", name "project"
        let full_path = project.path_with_namespace.clone().unwrap_or_default();
        let (owner, name) = match full_path.rsplit_once('/') {
            Some((owner, name)) => (owner.to_string(), name.to_string()),
            None => (String::new(), display_name),
        };

        Some(AvailableRepository {
            name,
            owner,
            description: project.description.filter(|d| !d.is_empty()),
            private: project.visibility.as_deref() != Some("public"),
            default_branch: project.default_branch.unwrap_or_else(|| "main".to_string()),
            language: None,
            stars: project.star_count,
        })
    }
}

#[async_trait]
impl GitProvider for GitlabProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Gitlab
    }

    async fn list_available_repositories(&self) -> GitgateResult<Vec<AvailableRepository>> {
        debug!(base_url = %self.client.base_url(), "Fetching GitLab projects");
        let pager = Paginator::new(
            self.client.clone(),
            "/projects?membership=true&archived=false&order_by=last_activity_at&per_page=100",
            "projects",
        );
        let mut pages = Box::pin(pager.into_stream());
        let mut repositories = Vec::new();
        while let Some(page) = pages.next().await {
            match page?.json::<Value>()? {
                Value::Array(entries) => {
                    for entry in entries {
                        match serde_json::from_value::<Project>(entry) {
                            Ok(project) => repositories.extend(Self::to_available(project)),
                            Err(e) => debug!(error = %e, "Skipping malformed project entry"),
                        }
                    }
                }
                _ => warn!("GitLab returned a non-array project page, ignoring"),
            }
        }
        info!(count = repositories.len(), "GitLab projects retrieved");
        Ok(repositories)
    }

    async fn check_branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GitgateResult<bool> {
        let project_path = format!("{}/{}", owner, repo);
        let path = format!(
            "/projects/{}/repository/branches/{}",
            urlencoding::encode(&project_path),
            urlencoding::encode(branch)
        );
        let response = self.client.get(&path).await?;
        match response.status {
            200..=299 => Ok(true),
            404 => Ok(false),
            401 | 403 | 429 => Err(self.client.error_for(&response, "branch")),
            status => Err(GitgateError::vendor_api(
                Vendor::Gitlab.label(),
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
