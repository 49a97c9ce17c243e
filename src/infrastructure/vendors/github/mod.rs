//! GitHub adapter: REST v3 with tree-based commits.

pub mod payload;
pub mod provider;
pub mod repo;
pub mod types;

use std::sync::Arc;

pub use payload::GithubPushParser;
pub use provider::GithubProvider;
pub use repo::GithubRepo;

use crate::domain::entities::RepoTarget;
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{ApiClient, HttpTransport};
use crate::infrastructure::vendors::factory::{AdapterContext, VendorBuilder};
use crate::infrastructure::vendors::vendor_interface::{GitProvider, GitRepo};

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// Web host for an API base: `api.github.com` maps to `github.com`,
/// Enterprise `https://host/api/v3` maps to `https://host`.
pub fn web_url_for(api_base: &str) -> String {
    let api_base = api_base.trim_end_matches('/');
    if api_base == GITHUB_API_URL {
        return GITHUB_WEB_URL.to_string();
    }
    api_base.trim_end_matches("/api/v3").to_string()
}

pub fn api_client(token: Option<&str>, base_url: Option<&str>, transport: Arc<dyn HttpTransport>) -> ApiClient {
    let client = ApiClient::new(Vendor::Github, base_url.unwrap_or(GITHUB_API_URL), transport)
        .with_header("Accept", "application/vnd.github.v3+json");
    match token {
        Some(token) => client.with_header("Authorization", format!("token {}", token)),
        None => client,
    }
}

#[derive(Debug, Default)]
pub struct GithubBuilder;

impl VendorBuilder for GithubBuilder {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    fn build_repo(&self, context: &AdapterContext, target: RepoTarget) -> Arc<dyn GitRepo> {
        let client = api_client(context.token(), context.base_url(), context.transport());
        Arc::new(GithubRepo::new(client, target))
    }

    fn build_provider(&self, context: &AdapterContext) -> Arc<dyn GitProvider> {
        let client = api_client(context.token(), context.base_url(), context.transport());
        Arc::new(GithubProvider::new(client))
    }

    fn push_parser(&self) -> Arc<dyn PushPayloadParser> {
        Arc::new(GithubPushParser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_url_for() {
        assert_eq!(web_url_for("https://api.github.com"), "https://github.com");
        assert_eq!(web_url_for("https://ghe.acme.io/api/v3/"), "https://ghe.acme.io");
    }
}
