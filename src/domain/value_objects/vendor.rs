use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::error::GitgateError;

/// Git hosting vendor behind a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// github.com or GitHub Enterprise
    Github,
    /// gitlab.com or a self-managed GitLab
    Gitlab,
}

impl Default for Vendor {
    fn default() -> Self {
        Self::Github
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Github => write!(f, "github"),
            Vendor::Gitlab => write!(f, "gitlab"),
        }
    }
}

impl FromStr for Vendor {
    type Err = GitgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Vendor::Github),
            "gitlab" => Ok(Vendor::Gitlab),
            _ => Err(GitgateError::unsupported_vendor(s)),
        }
    }
}

impl Vendor {
    /// Every vendor with a built-in adapter.
    pub fn all() -> [Vendor; 2] {
        [Vendor::Github, Vendor::Gitlab]
    }

    /// Product name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Vendor::Github => "GitHub",
            Vendor::Gitlab => "GitLab",
        }
    }

    /// Webhook header carrying the event type.
    pub fn event_header(&self) -> &'static str {
        match self {
            Vendor::Github => "x-github-event",
            Vendor::Gitlab => "x-gitlab-event",
        }
    }

    /// Value of [`Vendor::event_header`] on push deliveries.
    pub fn push_event_value(&self) -> &'static str {
        match self {
            Vendor::Github => "push",
            Vendor::Gitlab => "Push Hook",
        }
    }

    /// Web URL of a single commit, given the repository web URL.
    pub fn commit_url(&self, repo_url: &str, sha: &str) -> String {
        let repo_url = repo_url.trim_end_matches('/');
        match self {
            Vendor::Github => format!("{}/commit/{}", repo_url, sha),
            Vendor::Gitlab => format!("{}/-/commit/{}", repo_url, sha),
        }
    }
}
