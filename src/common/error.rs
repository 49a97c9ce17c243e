use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitgateError {
    #[error("Unsupported git vendor: {vendor}")]
    UnsupportedVendor { vendor: String },

    #[error("Git provider {provider_id} has no token configured")]
    MissingToken { provider_id: String },

    #[error("Git provider not found: {provider_id}")]
    ProviderNotFound { provider_id: String },

    #[error("Git provider {provider_id} does not belong to organization {organization_id}")]
    ProviderOrganizationMismatch {
        provider_id: String,
        organization_id: String,
    },

    #[error("Git provider {provider_id} is still used by {repository_count} repositories")]
    ProviderInUse {
        provider_id: String,
        repository_count: usize,
    },

    #[error("Repository {owner}/{repo} on branch {branch} already exists in this organization")]
    RepositoryAlreadyExists {
        owner: String,
        repo: String,
        branch: String,
    },

    #[error("Git repository not found: {repository_id}")]
    RepositoryNotFound { repository_id: String },

    #[error(
        "Insufficient permissions to commit to {vendor} repository. Please ensure your token has write access to {owner}/{repo}"
    )]
    InsufficientPermissions {
        vendor: String,
        owner: String,
        repo: String,
    },

    #[error("{vendor} authentication failed: {message}")]
    AuthenticationFailed { vendor: String, message: String },

    #[error("{vendor} rate limit exceeded or access forbidden: {message}")]
    RateLimitedOrForbidden { vendor: String, message: String },

    #[error("{vendor} resource not found: {resource}")]
    RemoteNotFound { vendor: String, resource: String },

    #[error("Branch {branch} does not exist on {vendor} repository {owner}/{repo}")]
    BranchNotFound {
        vendor: String,
        owner: String,
        repo: String,
        branch: String,
    },

    #[error("No files to commit")]
    NoFilesToCommit,

    #[error("Failed to commit files to {vendor}: {message}")]
    CommitFailed { vendor: String, message: String },

    #[error("{vendor} API request failed: {message}")]
    VendorApi {
        vendor: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Network operation failed: {message}")]
    NetworkError {
        message: String,
        url: Option<String>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError {
        field: String,
        message: String,
        value: Option<String>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Job {job_id} failed: {message}")]
    JobError { job_id: String, message: String },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GitgateError {
    pub fn unsupported_vendor(vendor: impl Into<String>) -> Self {
        Self::UnsupportedVendor {
            vendor: vendor.into(),
        }
    }

    pub fn missing_token(provider_id: impl Into<String>) -> Self {
        Self::MissingToken {
            provider_id: provider_id.into(),
        }
    }

    pub fn provider_not_found(provider_id: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider_id: provider_id.into(),
        }
    }

    pub fn repository_not_found(repository_id: impl Into<String>) -> Self {
        Self::RepositoryNotFound {
            repository_id: repository_id.into(),
        }
    }

    pub fn insufficient_permissions(
        vendor: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self::InsufficientPermissions {
            vendor: vendor.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn remote_not_found(vendor: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::RemoteNotFound {
            vendor: vendor.into(),
            resource: resource.into(),
        }
    }

    pub fn commit_failed(vendor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommitFailed {
            vendor: vendor.into(),
            message: message.into(),
        }
    }

    pub fn vendor_api(
        vendor: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::VendorApi {
            vendor: vendor.into(),
            status,
            message: message.into(),
        }
    }

    pub fn network_error(message: impl Into<String>, url: Option<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
            url,
            source: None,
        }
    }

    pub fn network_error_with_source(
        message: impl Into<String>,
        url: Option<String>,
        source: reqwest::Error,
    ) -> Self {
        Self::NetworkError {
            message: message.into(),
            url,
            source: Some(source),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: None,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn job_error(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobError {
            job_id: job_id.into(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InternalError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for vendor 404s, whether reported on a path or on a branch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteNotFound { .. } | Self::BranchNotFound { .. })
    }

    /// HTTP status behind a vendor failure, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { .. } => Some(401),
            Self::RateLimitedOrForbidden { .. } | Self::InsufficientPermissions { .. } => {
                Some(403)
            }
            Self::RemoteNotFound { .. } | Self::BranchNotFound { .. } => Some(404),
            Self::VendorApi { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<std::io::Error> for GitgateError {
    fn from(error: std::io::Error) -> Self {
        Self::internal_error_with_source("I/O operation failed", error)
    }
}

impl From<serde_yaml::Error> for GitgateError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for GitgateError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<base64::DecodeError> for GitgateError {
    fn from(error: base64::DecodeError) -> Self {
        Self::serialization_error_with_source("Base64 decoding failed", error)
    }
}

impl From<std::string::FromUtf8Error> for GitgateError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::serialization_error_with_source("File content is not valid UTF-8", error)
    }
}

impl From<url::ParseError> for GitgateError {
    fn from(error: url::ParseError) -> Self {
        Self::validation_error("url", error.to_string(), None)
    }
}

impl From<reqwest::Error> for GitgateError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string());
        Self::network_error_with_source("Network request failed", url, error)
    }
}

impl From<anyhow::Error> for GitgateError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal_error(format!("Anyhow error: {}", error))
    }
}
