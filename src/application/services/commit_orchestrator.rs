use tracing::{info, warn};

use crate::common::error::GitgateError;
use crate::common::result::{require_non_empty, GitgateResult};
use crate::domain::entities::{CommitOutcome, FileToCommit, FileToDelete};
use crate::infrastructure::vendors::GitRepo;

/// Runs a diff-aware commit through whichever adapter it is given.
///
/// Input is checked before any network call. `NoChanges` comes back as a
/// regular outcome; only vendor failures are errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommitOrchestrator;

impl CommitOrchestrator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(files: &[FileToCommit], message: &str, delete_files: &[FileToDelete]) -> GitgateResult<()> {
        if files.is_empty() && delete_files.is_empty() {
            return Err(GitgateError::NoFilesToCommit);
        }
        require_non_empty("message", message)?;
        for file in files {
            require_non_empty("files.path", &file.path)?;
        }
        for file in delete_files {
            require_non_empty("delete_files.path", &file.path)?;
        }
        Ok(())
    }

    pub async fn commit_files(
        &self,
        adapter: &dyn GitRepo,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome> {
        Self::validate(files, message, delete_files)?;
        let target = adapter.target();

        let outcome = adapter.commit_files(files, message, delete_files).await;
        match &outcome {
            Ok(CommitOutcome::Committed(info)) => info!(
                vendor = %adapter.vendor(),
                owner = %target.owner,
                repo = %target.repo,
                branch = %target.branch,
                sha = %info.sha,
                "Commit created"
            ),
            Ok(CommitOutcome::NoChanges) => info!(
                vendor = %adapter.vendor(),
                owner = %target.owner,
                repo = %target.repo,
                branch = %target.branch,
                "Nothing to commit, remote already up to date"
            ),
            Err(e) => warn!(
                vendor = %adapter.vendor(),
                owner = %target.owner,
                repo = %target.repo,
                error = %e,
                "Commit failed"
            ),
        }
        outcome
    }
}
