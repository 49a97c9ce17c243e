use serde::Deserialize;
use serde_json::Value;

use crate::domain::services::{NormalizedPush, PushCommit, PushPayloadParser};
use crate::domain::value_objects::Vendor;

#[derive(Debug, Deserialize)]
struct GitlabPushPayload {
    object_kind: Option<String>,
    event_name: Option<String>,
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    commits: Option<Vec<GitlabPushCommit>>,
}

#[derive(Debug, Deserialize)]
struct GitlabPushCommit {
    id: Option<String>,
    message: Option<String>,
    author: Option<GitlabCommitAuthor>,
    modified: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GitlabCommitAuthor {
    name: Option<String>,
}

/// `{object_kind: "push", event_name: "push", ref, commits[...]}`; any other
/// kind or event name is not a push.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitlabPushParser;

impl PushPayloadParser for GitlabPushParser {
    fn vendor(&self) -> Vendor {
        Vendor::Gitlab
    }

    fn parse(&self, payload: &Value) -> Option<NormalizedPush> {
        let payload: GitlabPushPayload = serde_json::from_value(payload.clone()).ok()?;
        if payload.object_kind.as_deref() != Some("push") || payload.event_name.as_deref() != Some("push") {
            return None;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_push_kind_and_event() {
        let base = json!({
            "object_kind": "push",
            "event_name": "push",
            "ref": "refs/heads/main",
            "commits": []
        });
        assert!(GitlabPushParser.parse(&base).is_some());

        let mut tag_push = base.clone();
        tag_push["event_name"] = json!("tag_push");
        assert!(GitlabPushParser.parse(&tag_push).is_none());

        let mut merge_request = base.clone();
        merge_request["object_kind"] = json!("merge_request");
        assert!(GitlabPushParser.parse(&merge_request).is_none());
    }
}
