use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved sha reported for a commit request that changed nothing.
pub const NO_CHANGES_SHA: &str = "no-changes";

/// What a vendor reports about a commit it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub url: String,
}

/// Result of a diff-aware commit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommitInfo),
    /// Every file already matched the remote and no delete target existed.
    NoChanges,
}

impl CommitOutcome {
    pub fn is_no_changes(&self) -> bool {
        matches!(self, CommitOutcome::NoChanges)
    }

    pub fn committed(&self) -> Option<&CommitInfo> {
        match self {
            CommitOutcome::Committed(info) => Some(info),
            CommitOutcome::NoChanges => None,
        }
    }

    /// Flat wire form. `NoChanges` becomes the `no-changes` sentinel with
    /// empty message, author and url.
    pub fn to_info(&self) -> CommitInfo {
        match self {
            CommitOutcome::Committed(info) => info.clone(),
            CommitOutcome::NoChanges => CommitInfo {
                sha: NO_CHANGES_SHA.to_string(),
                message: String::new(),
                author: String::new(),
                url: String::new(),
            },
        }
    }
}

/// Persisted commit record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub sha: String,
    pub message: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Commit {
    pub fn from_info(id: impl Into<String>, info: CommitInfo) -> Self {
        Self {
            id: id.into(),
            sha: info.sha,
            message: info.message,
            author: info.author,
            url: info.url,
            created_at: Utc::now(),
        }
    }
}
