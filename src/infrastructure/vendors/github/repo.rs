use async_trait::async_trait;
use futures::future::{try_join, try_join_all};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::payload::GithubPushParser;
use super::types::{BranchResponse, GitCommitResponse, GitRefResponse, TreeResponse};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::files::{dedupe_deletes, dedupe_files};
use crate::domain::entities::{
    CommitInfo, CommitOutcome, FileToCommit, FileToDelete, RemoteFile, RepoTarget,
};
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::repo_path::{directory_prefix, encode_path, normalize_path, relative_directories};
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::vendors::vendor_interface::GitRepo;

/// Regular, non-executable file
const BLOB_MODE: &str = "100644";

/// Repository adapter over the GitHub git-data API.
///
/// Commits go through refs, commits and trees: read the branch ref, read its
/// commit, create a tree on top of the base tree, create a commit, then move
/// the ref with `force: false`.
pub struct GithubRepo {
    client: ApiClient,
    target: RepoTarget,
    web_url: String,
    parser: GithubPushParser,
}

impl GithubRepo {
    pub fn new(client: ApiClient, target: RepoTarget) -> Self {
        let web_url = super::web_url_for(client.base_url());
        info!(
            owner = %target.owner,
            repo = %target.repo,
            branch = %target.branch,
            "Initializing GitHub repository adapter"
        );
        Self {
            client,
            target,
            web_url,
            parser: GithubPushParser,
        }
    }

    fn repo_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            urlencoding::encode(&self.target.owner),
            urlencoding::encode(&self.target.repo)
        )
    }

    fn contents_path(&self, path: &str, git_ref: &str) -> String {
        format!(
            "{}/contents/{}?ref={}",
            self.repo_path(),
            encode_path(path),
            urlencoding::encode(git_ref)
        )
    }

    async fn branch_head(&self, branch: &str) -> GitgateResult<String> {
        let path = format!("{}/git/refs/heads/{}", self.repo_path(), encode_path(branch));
        let reference: GitRefResponse = self
            .client
            .get_json(&path, "branch reference")
            .await
            .map_err(|e| self.branch_error(e, branch))?;
        Ok(reference.object.sha)
    }

    async fn base_tree(&self, commit_sha: &str) -> GitgateResult<String> {
        let path = format!("{}/git/commits/{}", self.repo_path(), commit_sha);
        let commit: GitCommitResponse = self.client.get_json(&path, "commit").await?;
        Ok(commit.tree.sha)
    }

    async fn recursive_tree(&self, tree_ish: &str) -> GitgateResult<TreeResponse> {
        let path = format!(
            "{}/git/trees/{}?recursive=1",
            self.repo_path(),
            urlencoding::encode(tree_ish)
        );
        let tree: TreeResponse = self.client.get_json(&path, "tree").await?;
        if tree.truncated {
            warn!(
                owner = %self.target.owner,
                repo = %self.target.repo,
                "Tree response was truncated by GitHub, some entries may be missing"
            );
        }
        Ok(tree)
    }

    fn branch_error(&self, error: GitgateError, branch: &str) -> GitgateError {
        if error.is_not_found() {
            GitgateError::BranchNotFound {
                vendor: Vendor::Github.label().to_string(),
                owner: self.target.owner.clone(),
                repo: self.target.repo.clone(),
                branch: branch.to_string(),
            }
        } else {
            error
        }
    }

    fn commit_error(&self, error: GitgateError) -> GitgateError {
        match error {
            GitgateError::NoFilesToCommit
            | GitgateError::BranchNotFound { .. }
            | GitgateError::InsufficientPermissions { .. } => error,
            GitgateError::RateLimitedOrForbidden { .. } => GitgateError::insufficient_permissions(
                Vendor::Github.label(),
                &self.target.owner,
                &self.target.repo,
            ),
            other => GitgateError::commit_failed(Vendor::Github.label(), other.to_string()),
        }
    }

    /// Returns `true` for each file whose remote content differs or is absent.
    async fn classify_files(&self, files: &[FileToCommit], branch: &str) -> GitgateResult<Vec<bool>> {
        let checks = files.iter().map(|file| async move {
            let changed = match self.get_file_on_repo(&file.path, Some(branch)).await? {
                None => {
                    debug!(path = %file.path, "File does not exist, will create");
                    true
                }
                Some(existing) => existing.decoded_content()? != file.content,
            };
            Ok::<_, GitgateError>(changed)
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

        let (changed, deletes) = try_join(
            self.classify_files(&files, branch),
            self.existing_deletes(&delete_files, branch),
        )
        .await?;
        let writes: Vec<&FileToCommit> = files
            .iter()
            .zip(&changed)
            .filter(|(_, changed)| **changed)
            .map(|(file, _)| file)
            .collect();

        if writes.is_empty() && deletes.is_empty() {
            info!(owner = %self.target.owner, repo = %self.target.repo, branch, "No changes detected, skipping commit");
            return Ok(CommitOutcome::NoChanges);
        }

        let head_sha = self.branch_head(branch).await?;
        let base_tree_sha = self.base_tree(&head_sha).await?;

        let mut tree_items: Vec<Value> = writes
            .iter()
            .map(|file| {
                json!({
                    "path": normalize_path(&file.path),
                    "mode": BLOB_MODE,
                    "type": "blob",
                    "content": file.content,
                })
            })
            .collect();
        tree_items.extend(deletes.iter().map(|file| {
            json!({
                "path": normalize_path(&file.path),
                "mode": BLOB_MODE,
                "type": "blob",
                "sha": Value::Null,
            })
        }));

        let tree: Value = self
            .client
            .post_json(
                &format!("{}/git/trees", self.repo_path()),
                &json!({ "base_tree": base_tree_sha, "tree": tree_items }),
                "tree",
            )
            .await?;
        let tree_sha = tree
            .get("sha")
            .and_then(Value::as_str)
            .ok_or_else(|| GitgateError::serialization_error("Created tree has no sha"))?;

        let commit: GitCommitResponse = self
            .client
            .post_json(
                &format!("{}/git/commits", self.repo_path()),
                &json!({ "message": message, "tree": tree_sha, "parents": [head_sha] }),
                "commit",
            )
            .await?;

        let _: Value = self
            .client
            .patch_json(
                &format!("{}/git/refs/heads/{}", self.repo_path(), encode_path(branch)),
                &json!({ "sha": commit.sha, "force": false }),
                "branch reference",
            )
            .await?;

        let author = commit
            .author
            .as_ref()
            .and_then(|a| a.email.clone())
            .or_else(|| commit.committer.as_ref().and_then(|c| c.email.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        let url = commit
            .html_url
            .clone()
            .unwrap_or_else(|| Vendor::Github.commit_url(&self.repository_url(), &commit.sha));

        info!(
            owner = %self.target.owner,
            repo = %self.target.repo,
            branch,
            written = writes.len(),
            deleted = deletes.len(),
            sha = %commit.sha,
            "Files committed in a single commit"
        );

        Ok(CommitOutcome::Committed(CommitInfo {
            sha: commit.sha,
            message: message.to_string(),
            author,
            url,
        }))
    }
}

#[async_trait]
impl GitRepo for GithubRepo {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    fn target(&self) -> &RepoTarget {
        &self.target
    }

    fn repository_url(&self) -> String {
        format!("{}/{}/{}", self.web_url, self.target.owner, self.target.repo)
    }

    async fn commit_files(
        &self,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome> {
        info!(
            owner = %self.target.owner,
            repo = %self.target.repo,
            files = files.len(),
            deletes = delete_files.len(),
            "Committing files to GitHub repository"
        );
        if files.is_empty() && delete_files.is_empty() {
            return Err(GitgateError::NoFilesToCommit);
        }

        self.commit_files_inner(files, message, delete_files)
            .await
            .map_err(|e| {
                error!(owner = %self.target.owner, repo = %self.target.repo, error = %e, "Failed to commit files to GitHub repository");
                self.commit_error(e)
            })
    }

    async fn get_file_on_repo(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Option<RemoteFile>> {
        let git_ref = git_ref.unwrap_or(&self.target.branch);
        debug!(path, git_ref, "Fetching file from GitHub");

        let body: Option<Value> = self
            .client
            .get_optional_json(&self.contents_path(path, git_ref), path)
            .await?;
        // Directory listings come back as arrays and carry no top-level sha
        let file = body.and_then(|body| {
            let sha = body.get("sha")?.as_str()?.to_string();
            let content = body
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(RemoteFile { sha, content })
        });
        Ok(file)
    }

    async fn list_directories_on_repo(&self, path: Option<&str>) -> GitgateResult<Vec<String>> {
        let branch = self.target.branch.as_str();
        info!(owner = %self.target.owner, repo = %self.target.repo, branch, path = path.unwrap_or("/"), "Listing directories on GitHub");

        let branch_path = format!("{}/branches/{}", self.repo_path(), encode_path(branch));
        let branch_info: BranchResponse = self
            .client
            .get_json(&branch_path, "branch")
            .await
            .map_err(|e| self.branch_error(e, branch))?;

        let tree = self.recursive_tree(&branch_info.commit.commit.tree.sha).await?;
        let directories: Vec<String> = tree.paths_of_kind("tree").map(str::to_string).collect();
        Ok(relative_directories(directories, path))
    }

    async fn check_directory_exists(&self, path: &str, branch: Option<&str>) -> GitgateResult<bool> {
        let branch = branch.unwrap_or(&self.target.branch);
        let body: Option<Value> = self
            .client
            .get_optional_json(&self.contents_path(path, branch), path)
            .await?;
        Ok(matches!(body, Some(Value::Array(_))))
    }

    async fn list_files_in_directory(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Vec<String>> {
        let git_ref = git_ref.unwrap_or(&self.target.branch);
        let tree = self.recursive_tree(git_ref).await?;
        let prefix = directory_prefix(Some(path));
        Ok(tree
            .paths_of_kind("blob")
            .filter(|blob| match &prefix {
                Some(prefix) => blob.starts_with(prefix.as_str()),
                None => true,
            })
            .map(str::to_string)
            .collect())
    }

    fn push_parser(&self) -> &dyn PushPayloadParser {
        &self.parser
    }
}
