use serde::{Deserialize, Serialize};
use std::fmt;

/// A vendor account configured for one organization.
///
/// `vendor` is kept as the raw configured string so that unknown vendors can
/// be stored and rejected later by the adapter factory with a typed error.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub vendor: String,
    pub organization_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Soft-delete marker
    #[serde(default)]
    pub deleted: bool,
}

impl Provider {
    pub fn new(
        id: impl Into<String>,
        vendor: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vendor: vendor.into(),
            organization_id: organization_id.into(),
            base_url: None,
            token: None,
            deleted: false,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Token, if one is set and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("vendor", &self.vendor)
            .field("organization_id", &self.organization_id)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("deleted", &self.deleted)
            .finish()
    }
}

/// Changes applied by a provider update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProviderUpdate {
    pub token: Option<String>,
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let provider = Provider::new("p1", "github", "org").with_token("ghp_secret");
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_blank_token_is_missing() {
        let provider = Provider::new("p1", "github", "org").with_token("   ");
        assert!(!provider.has_token());
        assert_eq!(provider.token(), None);
    }
}
