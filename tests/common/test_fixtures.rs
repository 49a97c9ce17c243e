//! Vendor payloads and API responses used across the integration tests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

pub fn b64(content: &str) -> String {
    STANDARD.encode(content)
}

/// GitHub contents API body for a file.
pub fn github_file(path: &str, sha: &str, content: &str) -> Value {
    json!({
        "type": "file",
        "path": path,
        "sha": sha,
        "encoding": "base64",
        "content": b64(content),
    })
}

/// GitLab repository files API body.
pub fn gitlab_file(path: &str, blob_id: &str, content: &str) -> Value {
    json!({
        "file_path": path,
        "blob_id": blob_id,
        "encoding": "base64",
        "content": b64(content),
    })
}

/// Commit for a push payload. `None` fields are left out of the JSON.
pub fn push_commit(id: &str, author: Option<&str>, message: Option<&str>, modified: &[&str]) -> Value {
    let mut commit = json!({ "id": id, "modified": modified });
    if let Some(author) = author {
        commit["author"] = json!({ "name": author, "email": format!("{}@example.com", author.to_lowercase()) });
    }
    if let Some(message) = message {
        commit["message"] = json!(message);
    }
    commit
}

pub fn github_push(git_ref: &str, commits: Vec<Value>) -> Value {
    json!({
        "ref": git_ref,
        "repository": { "full_name": "acme/widgets" },
        "commits": commits,
    })
}

pub fn gitlab_push(git_ref: &str, commits: Vec<Value>) -> Value {
    json!({
        "object_kind": "push",
        "event_name": "push",
        "ref": git_ref,
        "project": { "path_with_namespace": "acme/widgets" },
        "commits": commits,
    })
}
