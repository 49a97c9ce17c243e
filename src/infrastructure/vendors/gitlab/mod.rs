//! GitLab adapter: REST v4 with commit actions.

pub mod payload;
pub mod provider;
pub mod repo;
pub mod types;

use std::sync::Arc;

pub use payload::GitlabPushParser;
pub use provider::GitlabProvider;
pub use repo::GitlabRepo;

use crate::domain::entities::RepoTarget;
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{ApiClient, HttpTransport};
use crate::infrastructure::vendors::factory::{AdapterContext, VendorBuilder};
use crate::infrastructure::vendors::vendor_interface::{GitProvider, GitRepo};

pub const GITLAB_DEFAULT_URL: &str = "https://gitlab.com";
pub const GITLAB_BASE_URL_ENV: &str = "GITLAB_BASE_URL";
const API_SUFFIX: &str = "/api/v4";

/// API root for a user-supplied URL: explicit URL, then `GITLAB_BASE_URL`,
/// then gitlab.com. Accepts both `https://host` and `https://host/api/v4`.
pub fn resolve_api_url(base_url: Option<&str>) -> String {
    let provided = base_url
        .map(str::to_string)
        .or_else(|| std::env::var(GITLAB_BASE_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| GITLAB_DEFAULT_URL.to_string());
    let provided = provided.trim().trim_end_matches('/');
    if provided.contains(API_SUFFIX) {
        provided.to_string()
    } else {
        format!("{}{}", provided, API_SUFFIX)
    }
}

/// Web host for an API root.
pub fn web_url_for(api_url: &str) -> String {
    api_url.trim_end_matches('/').replace(API_SUFFIX, "")
}

pub fn api_client(token: Option<&str>, base_url: Option<&str>, transport: Arc<dyn HttpTransport>) -> ApiClient {
    let client = ApiClient::new(Vendor::Gitlab, resolve_api_url(base_url), transport);
    match token {
        Some(token) => client.with_header("PRIVATE-TOKEN", token),
        None => client,
    }
}

#[derive(Debug, Default)]
pub struct GitlabBuilder;

impl VendorBuilder for GitlabBuilder {
    fn vendor(&self) -> Vendor {
        Vendor::Gitlab
    }

    fn build_repo(&self, context: &AdapterContext, target: RepoTarget) -> Arc<dyn GitRepo> {
        let client = api_client(context.token(), context.base_url(), context.transport());
        Arc::new(GitlabRepo::new(client, target))
    }

    fn build_provider(&self, context: &AdapterContext) -> Arc<dyn GitProvider> {
        let client = api_client(context.token(), context.base_url(), context.transport());
        Arc::new(GitlabProvider::new(client))
    }

    fn push_parser(&self) -> Arc<dyn PushPayloadParser> {
        Arc::new(GitlabPushParser)
    }
}
