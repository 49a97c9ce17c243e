use serde::Serialize;
use tracing::debug;

use crate::application::services::AdapterResolver;
use crate::common::result::{require_non_empty, GitgateResult};
use crate::infrastructure::vendors::TokenPolicy;

/// A decoded file read from a tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryFile {
    pub path: String,
    pub sha: String,
    pub content: String,
}

pub struct GetFileFromRepoUseCase {
    resolver: AdapterResolver,
}

impl GetFileFromRepoUseCase {
    pub fn new(resolver: AdapterResolver) -> Self {
        Self { resolver }
    }

    /// File at `git_ref`, or the tracked branch. `None` when absent.
    pub async fn execute(
        &self,
        organization_id: &str,
        repository_id: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> GitgateResult<Option<RepositoryFile>> {
        require_non_empty("path", path)?;
        let resolved = self
            .resolver
            .resolve(organization_id, repository_id, TokenPolicy::Required)
            .await?;

        let file = match resolved.adapter.get_file_on_repo(path, git_ref).await? {
            Some(file) => file,
            None => {
                debug!(repository_id, path, "File not found on repository");
                return Ok(None);
            }
        };
        Ok(Some(RepositoryFile {
            path: path.to_string(),
            content: file.decoded_content()?,
            sha: file.sha,
        }))
    }
}
