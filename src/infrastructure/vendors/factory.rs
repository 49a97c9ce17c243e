use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::github::GithubBuilder;
use super::gitlab::GitlabBuilder;
use super::vendor_interface::{GitProvider, GitRepo};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::{Provider, RepoTarget};
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::HttpTransport;

/// Whether an adapter may be built for a provider without a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    #[default]
    Required,
    AllowTokenless,
}

/// Everything a builder needs to construct an adapter.
#[derive(Clone)]
pub struct AdapterContext {
    token: Option<String>,
    base_url: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AdapterContext {
    pub fn new(token: Option<String>, base_url: Option<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            token,
            base_url,
            transport,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }
}

/// Constructs the adapters of one vendor. New vendors plug in by
/// registering another builder.
pub trait VendorBuilder: Send + Sync {
    fn vendor(&self) -> Vendor;

    fn build_repo(&self, context: &AdapterContext, target: RepoTarget) -> Arc<dyn GitRepo>;

    fn build_provider(&self, context: &AdapterContext) -> Arc<dyn GitProvider>;

    fn push_parser(&self) -> Arc<dyn PushPayloadParser>;
}

/// Selects and constructs the adapter for a provider record.
pub struct VendorFactory {
    builders: HashMap<Vendor, Arc<dyn VendorBuilder>>,
    transport: Arc<dyn HttpTransport>,
}

impl VendorFactory {
    /// Factory with the GitHub and GitLab builders registered.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let mut factory = Self::empty(transport);
        factory.register(Arc::new(GithubBuilder));
        factory.register(Arc::new(GitlabBuilder));
        factory
    }

    pub fn empty(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            builders: HashMap::new(),
            transport,
        }
    }

    /// Registers a builder, replacing any previous one for the same vendor.
    pub fn register(&mut self, builder: Arc<dyn VendorBuilder>) {
        self.builders.insert(builder.vendor(), builder);
    }

    pub fn supported_vendors(&self) -> Vec<Vendor> {
        let mut vendors: Vec<Vendor> = self.builders.keys().copied().collect();
        vendors.sort_by_key(|vendor| vendor.to_string());
        vendors
    }

    /// Validates the provider and returns its builder and context. Fails
    /// before any network call.
    fn prepare(&self, provider: &Provider, policy: TokenPolicy) -> GitgateResult<(Arc<dyn VendorBuilder>, AdapterContext)> {
        if policy == TokenPolicy::Required && !provider.has_token() {
            return Err(GitgateError::missing_token(&provider.id));
        }
        let vendor: Vendor = provider.vendor.parse()?;
        let builder = self
            .builders
            .get(&vendor)
            .cloned()
            .ok_or_else(|| GitgateError::unsupported_vendor(&provider.vendor))?;

        debug!(provider_id = %provider.id, vendor = %vendor, "Building vendor adapter");
        let context = AdapterContext::new(
            provider.token().map(str::to_string),
            provider.base_url().map(str::to_string),
            Arc::clone(&self.transport),
        );
        Ok((builder, context))
    }

    pub fn create_repo(&self, provider: &Provider, target: RepoTarget, policy: TokenPolicy) -> GitgateResult<Arc<dyn GitRepo>> {
        let (builder, context) = self.prepare(provider, policy)?;
        Ok(builder.build_repo(&context, target))
    }

    pub fn create_provider(&self, provider: &Provider, policy: TokenPolicy) -> GitgateResult<Arc<dyn GitProvider>> {
        let (builder, context) = self.prepare(provider, policy)?;
        Ok(builder.build_provider(&context))
    }

    pub fn push_parser(&self, vendor: Vendor) -> GitgateResult<Arc<dyn PushPayloadParser>> {
        self.builders
            .get(&vendor)
            .map(|builder| builder.push_parser())
            .ok_or_else(|| GitgateError::unsupported_vendor(vendor.to_string()))
    }
}
