//! Turns push payloads into one [`ChangedFileEvent`] per matched path.
//!
//! Vendors differ only in payload shape. Each vendor supplies a
//! [`PushPayloadParser`] that translates its JSON into a [`NormalizedPush`];
//! branch filtering and latest-wins attribution are shared.

use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::entities::{ChangedFileEvent, PushedCommit};
use crate::domain::value_objects::{FileMatcher, Vendor};

/// One commit of a push, vendor-neutral. Absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushCommit {
    pub id: Option<String>,
    pub message: Option<String>,
    pub author: Option<String>,
    pub modified: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPush {
    pub git_ref: Option<String>,
    /// `None` when the payload carried no commit array at all.
    pub commits: Option<Vec<PushCommit>>,
}

/// Vendor-specific payload translation.
pub trait PushPayloadParser: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// `None` means the payload is not a push this vendor recognizes.
    fn parse(&self, payload: &Value) -> Option<NormalizedPush>;
}

/// Branch name of a ref such as `refs/heads/main`.
pub fn branch_from_ref(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}

/// Latest-wins extraction over commits in payload order.
///
/// Each path appears once, attributed to the last commit that modified it,
/// at the position where it was first seen.
pub fn extract_matching_files(commits: &[PushCommit], matcher: &FileMatcher) -> Vec<ChangedFileEvent> {
    let mut events: Vec<ChangedFileEvent> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        let modified = match &commit.modified {
            Some(modified) => modified,
            None => continue,
        };
        let attribution = PushedCommit {
            sha: commit.id.clone().unwrap_or_default(),
            author: commit.author.clone().filter(|a| !a.is_empty()),
            message: commit.message.clone().filter(|m| !m.is_empty()),
        };

        for path in modified.iter().filter(|path| matcher.is_match(path)) {
            match index.get(path.as_str()) {
                Some(&position) => events[position].commit = attribution.clone(),
                None => {
                    index.insert(path.as_str(), events.len());
                    events.push(ChangedFileEvent::new(path.clone(), attribution.clone()));
                }
            }
            debug!(path = %path, sha = %attribution.sha, "Latest commit for file updated");
        }
    }

    events
}

/// Full reconciliation: shape check, branch filter, then latest-wins.
///
/// Unrecognized payloads, missing commit arrays and out-of-scope refs all
/// produce zero events.
pub fn reconcile(
    parser: &dyn PushPayloadParser,
    payload: &Value,
    tracked_branch: &str,
    matcher: &FileMatcher,
) -> Vec<ChangedFileEvent> {
    let vendor = parser.vendor();
    let push = match parser.parse(payload) {
        Some(push) => push,
        None => {
            info!(vendor = %vendor, "Webhook payload is not a push event, skipping");
            return Vec::new();
        }
    };

    let commits = match push.commits {
        Some(commits) if !commits.is_empty() => commits,
        _ => {
            info!(vendor = %vendor, "Webhook payload has no commits, nothing to process");
            return Vec::new();
        }
    };

    let branch = match push.git_ref.as_deref() {
        Some(git_ref) => branch_from_ref(git_ref),
        None => {
            info!(vendor = %vendor, "Webhook payload has no ref, skipping");
            return Vec::new();
        }
    };
    if branch != tracked_branch {
        info!(
            vendor = %vendor,
            branch,
            tracked_branch,
            "Webhook has been skipped since {} is out of scope",
            branch
        );
        return Vec::new();
    }

    let events = extract_matching_files(&commits, matcher);
    info!(vendor = %vendor, files = events.len(), "Reconciled push payload");
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainParser;

    impl PushPayloadParser for PlainParser {
        fn vendor(&self) -> Vendor {
            Vendor::Github
        }

        fn parse(&self, payload: &Value) -> Option<NormalizedPush> {
            let commits = payload.get("commits").and_then(Value::as_array).map(|list| {
                list.iter()
                    .map(|c| PushCommit {
                        id: c.get("id").and_then(Value::as_str).map(str::to_string),
                        modified: c.get("modified").and_then(Value::as_array).map(|m| {
                            m.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        }),
                        ..Default::default()
                    })
                    .collect()
            });
            Some(NormalizedPush {
                git_ref: payload.get("ref").and_then(Value::as_str).map(str::to_string),
                commits,
            })
        }
    }

    fn commit(id: &str, files: &[&str]) -> PushCommit {
        PushCommit {
            id: Some(id.to_string()),
            message: Some(format!("message {}", id)),
            author: Some(format!("author {}", id)),
            modified: Some(files.iter().map(|f| f.to_string()).collect()),
        }
    }

    #[test]
    fn test_last_commit_wins_and_first_position_kept() {
        let matcher = FileMatcher::new(r"\.txt$").unwrap();
        let commits = vec![
            commit("c1", &["a.txt", "b.txt", "c.rs"]),
            commit("c2", &["a.txt"]),
        ];
        let events = extract_matching_files(&commits, &matcher);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].file_path, "a.txt");
        assert_eq!(events[0].commit.sha, "c2");
        assert_eq!(events[0].commit.author.as_deref(), Some("author c2"));
        assert_eq!(events[1].file_path, "b.txt");
        assert_eq!(events[1].commit.sha, "c1");
    }

    #[test]
    fn test_large_push_keeps_one_event_per_path() {
        let matcher = FileMatcher::new(".*").unwrap();
        let paths: Vec<String> = (0..2000).map(|i| format!("f{}.txt", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let commits = vec![commit("c1", &refs), commit("c2", &refs[1000..])];

        let events = extract_matching_files(&commits, &matcher);
        assert_eq!(events.len(), 2000);
        assert_eq!(events[0].file_path, "f0.txt");
        assert_eq!(events[0].commit.sha, "c1");
        assert_eq!(events[1999].file_path, "f1999.txt");
        assert_eq!(events[1999].commit.sha, "c2");
    }

    #[test]
    fn test_commit_without_modified_list_is_skipped() {
        let matcher = FileMatcher::new(".*").unwrap();
        let commits = vec![PushCommit {
            id: Some("c1".into()),
            ..Default::default()
        }];
        assert!(extract_matching_files(&commits, &matcher).is_empty());
    }

    #[test]
    fn test_branch_filter() {
        let matcher = FileMatcher::new(".*").unwrap();
        let payload = serde_json::json!({
            "ref": "refs/heads/feature-x",
            "commits": [{"id": "c1", "modified": ["a.txt"]}]
        });
        assert!(reconcile(&PlainParser, &payload, "main", &matcher).is_empty());
        assert_eq!(reconcile(&PlainParser, &payload, "feature-x", &matcher).len(), 1);
    }

    #[test]
    fn test_missing_commits_yield_nothing() {
        let matcher = FileMatcher::new(".*").unwrap();
        let payload = serde_json::json!({"ref": "refs/heads/main"});
        assert!(reconcile(&PlainParser, &payload, "main", &matcher).is_empty());
        let payload = serde_json::json!({"ref": "refs/heads/main", "commits": []});
        assert!(reconcile(&PlainParser, &payload, "main", &matcher).is_empty());
    }

    #[test]
    fn test_branch_from_ref() {
        assert_eq!(branch_from_ref("refs/heads/main"), "main");
        assert_eq!(branch_from_ref("main"), "main");
    }
}
