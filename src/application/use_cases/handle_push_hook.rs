use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::application::ports::CommitStore;
use crate::application::services::AdapterResolver;
use crate::common::result::GitgateResult;
use crate::domain::entities::{ChangedFileEvent, Commit};
use crate::domain::value_objects::FileMatcher;
use crate::infrastructure::vendors::{GitRepo, TokenPolicy};

const UNKNOWN_SHA: &str = "unknown-sha";
const DEFAULT_MESSAGE: &str = "Webhook commit";
const DEFAULT_AUTHOR: &str = "Unknown";

/// A changed file with the commit record stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushHookRecord {
    pub file_path: String,
    pub commit: Commit,
}

/// Webhook intake without content: reconcile the push, store one commit
/// record per changed file, return the records. Content is fetched later
/// by the fetch job.
pub struct HandlePushHookUseCase {
    resolver: AdapterResolver,
    commits: Arc<dyn CommitStore>,
}

impl HandlePushHookUseCase {
    pub fn new(resolver: AdapterResolver, commits: Arc<dyn CommitStore>) -> Self {
        Self { resolver, commits }
    }

    pub async fn execute(
        &self,
        organization_id: &str,
        repository_id: &str,
        payload: &Value,
        pattern: &str,
    ) -> GitgateResult<Vec<PushHookRecord>> {
        let matcher = FileMatcher::new(pattern)?;
        // Reconciliation is offline, so the token is not needed here
        let resolved = self
            .resolver
            .resolve(organization_id, repository_id, TokenPolicy::AllowTokenless)
            .await?;

        let events = resolved.adapter.reconcile_push(payload, &matcher);
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let commit = commit_record(resolved.adapter.as_ref(), &event);
            self.commits.save_commit(repository_id, commit.clone()).await?;
            records.push(PushHookRecord {
                file_path: event.file_path,
                commit,
            });
        }

        info!(repository_id, files = records.len(), "Push hook processed");
        Ok(records)
    }
}

fn commit_record(adapter: &dyn GitRepo, event: &ChangedFileEvent) -> Commit {
    let sha = Some(event.commit.sha.as_str())
        .filter(|sha| !sha.is_empty())
        .unwrap_or(UNKNOWN_SHA)
        .to_string();
    Commit {
        id: Uuid::new_v4().to_string(),
        url: adapter.vendor().commit_url(&adapter.repository_url(), &sha),
        sha,
        message: event
            .commit
            .message
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
        author: event
            .commit
            .author
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        created_at: Utc::now(),
    }
}
