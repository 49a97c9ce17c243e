use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::common::result::GitgateResult;
use crate::domain::entities::{
    AvailableRepository, ChangedFileEvent, CommitOutcome, FileToCommit, FileToDelete, RemoteFile,
    RepoTarget,
};
use crate::domain::services::webhook_reconciler::{self, PushPayloadParser};
use crate::domain::value_objects::{FileMatcher, Vendor};

/// Repository-scoped operations every vendor adapter provides.
///
/// An adapter is bound to one `(owner, repo, branch)` at construction.
#[async_trait]
pub trait GitRepo: Send + Sync {
    fn vendor(&self) -> Vendor;

    fn target(&self) -> &RepoTarget;

    /// Web URL of the repository, e.g. `https://github.com/owner/repo`.
    fn repository_url(&self) -> String;

    /// Diff-aware atomic commit on the tracked branch.
    ///
    /// Unchanged files and deletes of missing paths are dropped before the
    /// single write; if nothing is left the result is [`CommitOutcome::NoChanges`].
    async fn commit_files(
        &self,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome>;

    /// File at `git_ref` (tracked branch when `None`); `None` when absent.
    async fn get_file_on_repo(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Option<RemoteFile>>;

    /// Every directory below `path` on the tracked branch, relative to it.
    async fn list_directories_on_repo(&self, path: Option<&str>) -> GitgateResult<Vec<String>>;

    async fn check_directory_exists(&self, path: &str, branch: Option<&str>) -> GitgateResult<bool>;

    /// Every file below `path`, as full repository paths.
    async fn list_files_in_directory(&self, path: &str, git_ref: Option<&str>) -> GitgateResult<Vec<String>>;

    fn push_parser(&self) -> &dyn PushPayloadParser;

    /// Push payload to changed-file events, without content.
    fn reconcile_push(&self, payload: &Value, matcher: &FileMatcher) -> Vec<ChangedFileEvent> {
        webhook_reconciler::reconcile(self.push_parser(), payload, &self.target().branch, matcher)
    }

    /// Push payload to changed-file events with content fetched at each
    /// event's commit. Files missing at that commit are skipped.
    async fn handle_push_hook(&self, payload: &Value, matcher: &FileMatcher) -> GitgateResult<Vec<ChangedFileEvent>> {
        let events = self.reconcile_push(payload, matcher);
        let fetches = events.iter().map(|event| {
            self.get_file_on_repo(&event.file_path, Some(event.commit.sha.as_str()))
        });
        let files = join_all(fetches).await;

        let mut enriched = Vec::with_capacity(events.len());
        for (event, file) in events.into_iter().zip(files) {
            match file? {
                Some(file) => {
                    let content = file.decoded_content()?;
                    debug!(path = %event.file_path, bytes = content.len(), "Fetched file content");
                    enriched.push(event.with_content(content));
                }
                None => warn!(
                    path = %event.file_path,
                    sha = %event.commit.sha,
                    "File not found at pushed commit, skipping"
                ),
            }
        }
        Ok(enriched)
    }

    /// Whether the delivery headers announce a push event.
    fn is_push_event(&self, headers: &HashMap<String, String>) -> bool {
        let vendor = self.vendor();
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(vendor.event_header()))
            .map(|(_, value)| value == vendor.push_event_value())
            .unwrap_or(false)
    }

    /// Whether `git_ref` points at the tracked branch.
    fn is_valid_branch(&self, git_ref: &str) -> bool {
        webhook_reconciler::branch_from_ref(git_ref) == self.target().branch
    }
}

/// Account-scoped operations.
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Repositories the token can push to.
    async fn list_available_repositories(&self) -> GitgateResult<Vec<AvailableRepository>>;

    async fn check_branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GitgateResult<bool>;
}
