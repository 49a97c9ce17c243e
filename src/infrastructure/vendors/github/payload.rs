use serde::Deserialize;
use serde_json::Value;

use crate::domain::services::{NormalizedPush, PushCommit, PushPayloadParser};
use crate::domain::value_objects::Vendor;

#[derive(Debug, Deserialize)]
struct GithubPushPayload {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    commits: Option<Vec<GithubPushCommit>>,
}

#[derive(Debug, Deserialize)]
struct GithubPushCommit {
    id: Option<String>,
    message: Option<String>,
    author: Option<GithubCommitAuthor>,
    modified: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GithubCommitAuthor {
    name: Option<String>,
}

/// `{ref, commits[{id, message, modified[], author{name}}]}`
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubPushParser;

impl PushPayloadParser for GithubPushParser {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    fn parse(&self, payload: &Value) -> Option<NormalizedPush> {
        let payload: GithubPushPayload = serde_json::from_value(payload.clone()).ok()?;
        let commits = payload.commits.map(|commits| {
            commits
                .into_iter()
                .map(|commit| PushCommit {
                    id: commit.id,
                    message: commit.message,
                    author: commit.author.and_then(|author| author.name),
                    modified: commit.modified,
                })
                .collect()
        });
        Some(NormalizedPush {
            git_ref: payload.git_ref,
            commits,
        })
    }
}
