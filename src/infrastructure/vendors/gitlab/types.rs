//! GitLab REST v4 wire types.

use serde::Deserialize;

/// Lowest access level that can push (Developer).
pub const MIN_PUSH_ACCESS_LEVEL: u32 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct TreeItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryFile {
    pub blob_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedCommit {
    pub id: String,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub committer_email: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessLevel {
    #[serde(default)]
    pub access_level: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Permissions {
    pub project_access: Option<AccessLevel>,
    pub group_access: Option<AccessLevel>,
}

impl Permissions {
    pub fn max_access_level(&self) -> u32 {
        let project = self.project_access.as_ref().map_or(0, |a| a.access_level);
        let group = self.group_access.as_ref().map_or(0, |a| a.access_level);
        project.max(group)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: Option<String>,
    pub namespace: Option<serde_json::Value>,
    pub path_with_namespace: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub star_count: u64,
    pub permissions: Option<Permissions>,
}
