use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::common::result::GitgateResult;

/// A file to create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileToCommit {
    pub path: String,
    pub content: String,
}

impl FileToCommit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A file to remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileToDelete {
    pub path: String,
}

impl FileToDelete {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A file as stored on the vendor, content still base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub sha: String,
    pub content: String,
}

impl RemoteFile {
    /// Decodes the vendor payload into UTF-8 text.
    ///
    /// Vendors wrap base64 at 60 columns, so whitespace is ignored.
    pub fn decoded_content(&self) -> GitgateResult<String> {
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD.decode(compact.as_bytes())?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// A repository the provider's token can push to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableRepository {
    pub name: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub private: bool,
    pub default_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stars: u64,
}

/// Keeps the last content per path, at the position of its first occurrence.
pub fn dedupe_files(files: &[FileToCommit]) -> Vec<FileToCommit> {
    let mut result: Vec<FileToCommit> = Vec::with_capacity(files.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(files.len());
    for file in files {
        match index.get(file.path.as_str()) {
            Some(&position) => result[position].content = file.content.clone(),
            None => {
                index.insert(file.path.as_str(), result.len());
                result.push(file.clone());
            }
        }
    }
    result
}

/// Collapses repeated delete paths, preserving first-seen order.
pub fn dedupe_deletes(files: &[FileToDelete]) -> Vec<FileToDelete> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(files.len());
    files
        .iter()
        .filter(|file| seen.insert(file.path.as_str()))
        .cloned()
        .collect()
}
