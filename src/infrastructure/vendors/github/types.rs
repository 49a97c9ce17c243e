//! GitHub REST wire types.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ShaRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRefResponse {
    pub object: ShaRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Person {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitCommitResponse {
    pub sha: String,
    pub tree: ShaRef,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub author: Option<Person>,
    #[serde(default)]
    pub committer: Option<Person>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

impl TreeResponse {
    pub fn paths_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tree
            .iter()
            .filter(move |entry| entry.kind == kind)
            .map(|entry| entry.path.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommitInner {
    pub tree: ShaRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchCommit {
    pub commit: BranchCommitInner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchResponse {
    pub commit: BranchCommit,
}
