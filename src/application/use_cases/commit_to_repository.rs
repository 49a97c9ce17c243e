use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::application::ports::CommitStore;
use crate::application::services::{AdapterResolver, CommitOrchestrator};
use crate::common::result::GitgateResult;
use crate::domain::entities::{Commit, CommitOutcome, FileToCommit, FileToDelete};
use crate::infrastructure::vendors::TokenPolicy;

#[derive(Debug, Clone)]
pub struct CommitToRepositoryCommand {
    pub organization_id: String,
    pub repository_id: String,
    pub files: Vec<FileToCommit>,
    pub message: String,
    pub delete_files: Vec<FileToDelete>,
}

/// Write side: pushes a file set to a tracked repository and records real
/// commits. `NoChanges` is returned as-is and nothing is recorded.
pub struct CommitToRepositoryUseCase {
    resolver: AdapterResolver,
    commits: Arc<dyn CommitStore>,
    orchestrator: CommitOrchestrator,
}

impl CommitToRepositoryUseCase {
    pub fn new(resolver: AdapterResolver, commits: Arc<dyn CommitStore>) -> Self {
        Self {
            resolver,
            commits,
            orchestrator: CommitOrchestrator::new(),
        }
    }

    pub async fn execute(&self, command: CommitToRepositoryCommand) -> GitgateResult<CommitOutcome> {
        CommitOrchestrator::validate(&command.files, &command.message, &command.delete_files)?;
        let resolved = self
            .resolver
            .resolve(&command.organization_id, &command.repository_id, TokenPolicy::Required)
            .await?;

        let outcome = self
            .orchestrator
            .commit_files(
                resolved.adapter.as_ref(),
                &command.files,
                &command.message,
                &command.delete_files,
            )
            .await?;

        if let CommitOutcome::Committed(info) = &outcome {
            let commit = Commit::from_info(Uuid::new_v4().to_string(), info.clone());
            self.commits.save_commit(&resolved.repository.id, commit).await?;
            info!(
                repository_id = %resolved.repository.id,
                sha = %info.sha,
                "Commit recorded"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{fake_factory, seeded_store, FakeRemote, ORG};
    use crate::common::error::GitgateError;

    fn command(files: Vec<FileToCommit>) -> CommitToRepositoryCommand {
        CommitToRepositoryCommand {
            organization_id: ORG.into(),
            repository_id: "r1".into(),
            files,
            message: "update config".into(),
            delete_files: vec![],
        }
    }

    #[tokio::test]
    async fn test_records_only_real_commits() {
        let store = seeded_store();
        let resolver = AdapterResolver::new(
            store.clone(),
            store.clone(),
            fake_factory(FakeRemote::with_files(&[("a.txt", "v0")])),
        );
        let use_case = CommitToRepositoryUseCase::new(resolver, store.clone());
        let files = vec![FileToCommit::new("a.txt", "v1")];

        let first = use_case.execute(command(files.clone())).await.unwrap();
        assert!(!first.is_no_changes());
        let second = use_case.execute(command(files)).await.unwrap();
        assert!(second.is_no_changes());

        let recorded = store.list_commits("r1").await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].sha, first.committed().unwrap().sha);
    }

    #[tokio::test]
    async fn test_unknown_repository() {
        let store = seeded_store();
        let resolver = AdapterResolver::new(
            store.clone(),
            store.clone(),
            fake_factory(Arc::new(FakeRemote::default())),
        );
        let mut cmd = command(vec![FileToCommit::new("a.txt", "v1")]);
        cmd.repository_id = "missing".into();
        let err = CommitToRepositoryUseCase::new(resolver, store)
            .execute(cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::RepositoryNotFound { .. }));
    }
}
