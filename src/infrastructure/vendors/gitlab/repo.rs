use async_trait::async_trait;
use futures::future::{try_join, try_join_all};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::payload::GitlabPushParser;
use super::types::{CreatedCommit, RepositoryFile, TreeItem};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::files::{dedupe_deletes, dedupe_files};
use crate::domain::entities::{
    CommitInfo, CommitOutcome, FileToCommit, FileToDelete, RemoteFile, RepoTarget,
};
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::repo_path::{
    directory_prefix, gitlab_repo_slug, normalize_path, relative_directories,
};
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{ApiClient, HttpMethod, Paginator};
use crate::infrastructure::vendors::vendor_interface::GitRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileAction {
    Create,
    Update,
    Unchanged,
}

/// Repository adapter over the GitLab files and commits API.
///
/// A commit is one `POST /repository/commits` carrying `create`, `update`
/// and `delete` actions.
pub struct GitlabRepo {
    client: ApiClient,
    target: RepoTarget,
    project_path: String,
    encoded_project_path: String,
    web_url: String,
    parser: GitlabPushParser,
}

impl GitlabRepo {
    pub fn new(client: ApiClient, target: RepoTarget) -> Self {
        let slug = gitlab_repo_slug(&target.repo);
        if slug != target.repo {
            debug!(repo = %target.repo, slug = %slug, "Normalized GitLab repository name");
        }
        let project_path = format!("{}/{}", target.owner, slug);
        let encoded_project_path = urlencoding::encode(&project_path).into_owned();
        let web_url = super::web_url_for(client.base_url());
        info!(project_path = %project_path, branch = %target.branch, "Initializing GitLab repository adapter");
        Self {
            client,
            target,
            project_path,
            encoded_project_path,
            web_url,
            parser: GitlabPushParser,
        }
    }

    pub fn project_path(&self) -> &str {
        &self.project_path
    }

    fn project_api_path(&self) -> String {
        format!("/projects/{}", self.encoded_project_path)
    }

    fn file_path(&self, path: &str, git_ref: &str) -> String {
        format!(
            "{}/repository/files/{}?ref={}",
            self.project_api_path(),
            urlencoding::encode(normalize_path(path)),
            urlencoding::encode(git_ref)
        )
    }

    fn tree_path(&self, path: Option<&str>, git_ref: &str, recursive: bool) -> String {
        let mut query = format!("ref={}&per_page=100", urlencoding::encode(git_ref));
        if recursive {
            query.push_str("&recursive=true");
        }
        if let Some(prefix) = directory_prefix(path) {
            query.push_str(&format!(
                "&path={}",
                urlencoding::encode(prefix.trim_end_matches('/'))
            ));
        }
        format!("{}/repository/tree?{}", self.project_api_path(), query)
    }

    /// Every entry of the tree under `path`, across all pages. A missing tree
    /// (empty repository or unknown path) is empty.
    async fn tree_items(&self, path: Option<&str>, git_ref: &str) -> GitgateResult<Vec<TreeItem>> {
        let pager = Paginator::new(self.client.clone(), &self.tree_path(path, git_ref, true), "repository tree");
        match pager.collect_all::<TreeItem>().await {
            Ok(items) => Ok(items),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn commit_error(&self, error: GitgateError) -> GitgateError {
        match error {
            GitgateError::NoFilesToCommit
            | GitgateError::BranchNotFound { .. }
            | GitgateError::InsufficientPermissions { .. } => error,
            GitgateError::RateLimitedOrForbidden { .. } => GitgateError::insufficient_permissions(
                Vendor::Gitlab.label(),
                &self.target.owner,
                &self.target.repo,
            ),
            GitgateError::RemoteNotFound { .. } => GitgateError::remote_not_found(
                Vendor::Gitlab.label(),
                format!(
                    "repository {}. Check that the repository exists and your token has access to it",
                    self.project_path
                ),
            ),
            other => GitgateError::commit_failed(Vendor::Gitlab.label(), other.to_string()),
        }
    }

    async fn classify_files(&self, files: &[FileToCommit], branch: &str) -> GitgateResult<Vec<FileAction>> {
        let checks = files.iter().map(|file| async move {
            let action = match self.get_file_on_repo(&file.path, Some(branch)).await? {
                None => FileAction::Create,
                Some(existing) => {
                    if existing.decoded_content()? == file.content {
                        FileAction::Unchanged
                    } else {
                        FileAction::Update
                    }
                }
            };
            debug!(path = %file.path, action = ?action, "File action determined");
            Ok::<_, GitgateError>(action)
        });
        try_join_all(checks).await
    }

    /// Keeps only the delete targets that exist on `branch`.
    async fn existing_deletes<'a>(
        &self,
        delete_files: &'a [FileToDelete],
        branch: &str,
    ) -> GitgateResult<Vec<&'a FileToDelete>> {
        let checks = delete_files.iter().map(|file| async move {
            let exists = self.get_file_on_repo(&file.path, Some(branch)).await?.is_some();
            if !exists {
                debug!(path = %file.path, "Delete target does not exist, dropping");
            }
            Ok::<_, GitgateError>(exists.then_some(file))
        });
        Ok(try_join_all(checks).await?.into_iter().flatten().collect())
    }

    async fn commit_files_inner(
        &self,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome> {
        let branch = self.target.branch.as_str();
        let files = dedupe_files(files);
        let delete_files = dedupe_deletes(delete_files);

        let (file_actions, deletes) = try_join(
            self.classify_files(&files, branch),
            self.existing_deletes(&delete_files, branch),
        )
        .await?;
        let mut actions: Vec<Value> = files
            .iter()
            .zip(&file_actions)
            .filter_map(|(file, action)| {
                let action = match action {
                    FileAction::Create => "create",
                    FileAction::Update => "update",
                    FileAction::Unchanged => return None,
                };
                Some(json!({
                    "action": action,
                    "file_path": normalize_path(&file.path),
                    "content": file.content,
                }))
            })
            .collect();

        actions.extend(
            deletes
                .iter()
                .map(|file| json!({ "action": "delete", "file_path": normalize_path(&file.path) })),
        );

        if actions.is_empty() {
            info!(project_path = %self.project_path, branch, "No changes detected, skipping commit");
            return Ok(CommitOutcome::NoChanges);
        }

        debug!(project_path = %self.project_path, branch, actions = actions.len(), "Creating commit with actions");
        let commit: CreatedCommit = self
            .client
            .post_json(
                &format!("{}/repository/commits", self.project_api_path()),
                &json!({
                    "branch": branch,
                    "commit_message": message,
                    "actions": actions,
                }),
                "commit",
            )
            .await?;

        let author = commit
            .author_email
            .clone()
            .filter(|email| !email.is_empty())
            .or_else(|| commit.committer_email.clone().filter(|email| !email.is_empty()))
            .unwrap_or_else(|| "unknown".to_string());
        let url = commit.web_url.clone().unwrap_or_else(|| {
            Vendor::Gitlab.commit_url(&self.repository_url(), &commit.id)
        });

        info!(project_path = %self.project_path, sha = %commit.id, actions = actions.len(), "Files committed to GitLab");
        Ok(CommitOutcome::Committed(CommitInfo {
            sha: commit.id,
            message: message.to_string(),
            author,
            url,
        }))
    }
}

#[async_trait]
impl GitRepo for GitlabRepo {
    fn vendor(&self) -> Vendor {
        Vendor::Gitlab
    }

    fn target(&self) -> &RepoTarget {
        &self.target
    }

    fn repository_url(&self) -> String {
        format!("{}/{}", self.web_url, self.project_path)
    }

    async fn commit_files(
        &self,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome> {
        info!(
            project_path = %self.project_path,
            files = files.len(),
            deletes = delete_files.len(),
            "Committing files to GitLab repository"
        );
        if files.is_empty() && delete_files.is_empty() {
            return Err(GitgateError::NoFilesToCommit);
        }

        self.commit_files_inner(files, message, delete_files)
            .await
            .map_err(|e| {
                error!(project_path = %self.project_path, error = %e, status = ?e.status(), "GitLab commit failed");
                self.commit_error(e)
            })
    }

    async fn get_file_on_repo(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Option<RemoteFile>> {
        let git_ref = git_ref.unwrap_or(&self.target.branch);
        debug!(path, git_ref, project_path = %self.project_path, "Fetching file from GitLab");

        let file: Option<RepositoryFile> = self
            .client
            .get_optional_json(&self.file_path(path, git_ref), path)
            .await?;
        Ok(file.and_then(|file| {
            Some(RemoteFile {
                sha: file.blob_id?,
                content: file.content.unwrap_or_default(),
            })
        }))
    }

    async fn list_directories_on_repo(&self, path: Option<&str>) -> GitgateResult<Vec<String>> {
        let branch = self.target.branch.as_str();
        info!(project_path = %self.project_path, branch, path = path.unwrap_or("/"), "Listing directories on GitLab");

        let pager = Paginator::new(self.client.clone(), &self.tree_path(path, branch, true), "repository tree");
        let directories: Vec<String> = pager
            .collect_all::<TreeItem>()
            .await?
            .into_iter()
            .filter(|item| item.kind == "tree")
            .map(|item| item.path)
            .collect();
        Ok(relative_directories(directories, path))
    }

    async fn check_directory_exists(&self, path: &str, branch: Option<&str>) -> GitgateResult<bool> {
        let branch = branch.unwrap_or(&self.target.branch);
        if directory_prefix(Some(path)).is_none() {
            return Ok(true);
        }
        let response = self
            .client
            .send(HttpMethod::Get, &self.tree_path(Some(path), branch, false), None)
            .await?;
        if response.status == 404 {
            return Ok(false);
        }
        let response = self.client.expect_success(response, path)?;
        let items: Vec<Value> = response.json()?;
        Ok(!items.is_empty())
    }

    async fn list_files_in_directory(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Vec<String>> {
        let git_ref = git_ref.unwrap_or(&self.target.branch);
        Ok(self
            .tree_items(Some(path), git_ref)
            .await?
            .into_iter()
            .filter(|item| item.kind == "blob")
            .map(|item| item.path)
            .collect())
    }

    fn push_parser(&self) -> &dyn PushPayloadParser {
        &self.parser
    }
}
