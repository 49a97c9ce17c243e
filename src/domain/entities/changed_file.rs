use serde::{Deserialize, Serialize};

/// Commit attribution taken from a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushedCommit {
    pub sha: String,
    pub author: Option<String>,
    pub message: Option<String>,
}

/// A file touched by a push, attributed to the last commit that touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFileEvent {
    pub file_path: String,
    pub commit: PushedCommit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
}

impl ChangedFileEvent {
    pub fn new(file_path: impl Into<String>, commit: PushedCommit) -> Self {
        Self {
            file_path: file_path.into(),
            commit,
            file_content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.file_content = Some(content.into());
        self
    }
}
