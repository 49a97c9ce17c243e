use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::{debug, info};
use validator::Validate;

use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::{Provider, Repository};
use crate::domain::value_objects::Vendor;
use crate::infrastructure::vendors::gitlab::GITLAB_BASE_URL_ENV;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gitgate.yaml";

/// Overrides `log_level`.
pub const LOG_LEVEL_ENV: &str = "GITGATE_LOG";

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    format!("gitgate/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_parallel() -> usize {
    num_cpus::get()
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GitgateConfig {
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub log_level: String,

    #[serde(default)]
    #[validate(nested)]
    pub http: HttpConfig,

    #[serde(default)]
    #[validate(nested)]
    pub fetch_job: FetchJobConfig,

    /// Default host for GitLab providers without their own `base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_base_url: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    #[validate(nested)]
    pub repositories: Vec<RepositoryConfig>,
}

impl Default for GitgateConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            http: HttpConfig::default(),
            fetch_job: FetchJobConfig::default(),
            gitlab_base_url: None,
            providers: Vec::new(),
            repositories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Per-request timeout, applied by the transport
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FetchJobConfig {
    #[serde(default = "default_max_parallel")]
    #[validate(range(min = 1))]
    pub max_parallel: usize,
}

impl Default for FetchJobConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub vendor: String,

    #[validate(length(min = 1))]
    pub organization_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the token, read when `token` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("vendor", &self.vendor)
            .field("organization_id", &self.organization_id)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RepositoryConfig {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub owner: String,

    #[validate(length(min = 1))]
    pub repo: String,

    #[serde(default = "default_branch")]
    #[validate(length(min = 1))]
    pub branch: String,

    #[validate(length(min = 1))]
    pub provider_id: String,

    #[validate(length(min = 1))]
    pub organization_id: String,
}

impl GitgateConfig {
    /// Applies `GITLAB_BASE_URL`, `GITGATE_LOG` and every `token_env`
    /// through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            debug!(level = %level, "Log level overridden from environment");
            self.log_level = level;
        }
        if let Some(url) = non_blank(GITLAB_BASE_URL_ENV) {
            debug!(url = %url, "GitLab base URL overridden from environment");
            self.gitlab_base_url = Some(url);
        }
        for provider in &mut self.providers {
            let has_token = provider
                .token
                .as_deref()
                .is_some_and(|token| !token.trim().is_empty());
            if has_token {
                continue;
            }
            if let Some(name) = provider.token_env.as_deref() {
                provider.token = non_blank(name);
                if provider.token.is_none() {
                    debug!(provider_id = %provider.id, env = name, "Token variable is not set");
                }
            }
        }
    }

    /// Provider records, with the GitLab default host filled in.
    pub fn providers(&self) -> Vec<Provider> {
        self.providers
            .iter()
            .map(|config| {
                let mut provider = Provider::new(&config.id, &config.vendor, &config.organization_id);
                provider.token = config.token.clone();
                provider.base_url = config.base_url.clone();
                let is_gitlab = config.vendor.parse::<Vendor>().ok() == Some(Vendor::Gitlab);
                if provider.base_url.is_none() && is_gitlab {
                    provider.base_url = self.gitlab_base_url.clone();
                }
                provider
            })
            .collect()
    }

    pub fn repositories(&self) -> Vec<Repository> {
        self.repositories
            .iter()
            .map(|config| {
                Repository::new(
                    &config.id,
                    &config.owner,
                    &config.repo,
                    &config.provider_id,
                    &config.organization_id,
                )
                .with_branch(&config.branch)
            })
            .collect()
    }
}

/// Reads and validates `gitgate.yaml`.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Parses and validates configuration text. No environment is applied.
    pub fn parse(&self, contents: &str) -> GitgateResult<GitgateConfig> {
        let config: GitgateConfig = serde_yaml::from_str(contents)
            .map_err(|e| GitgateError::config_error_with_source("Invalid configuration file", e))?;
        self.validate(&config)?;
        Ok(config)
    }

    pub fn validate(&self, config: &GitgateConfig) -> GitgateResult<()> {
        config.validate().map_err(|e| {
            GitgateError::config_error(format!("Configuration validation failed: {}", e))
        })?;
        let mut seen = std::collections::HashSet::new();
        for provider in &config.providers {
            if !seen.insert(provider.id.as_str()) {
                return Err(GitgateError::config_error(format!(
                    "Duplicate provider id: {}",
                    provider.id
                )));
            }
        }
        Ok(())
    }

    /// Loads `path` and applies the process environment.
    pub async fn load<P: AsRef<Path>>(&self, path: P) -> GitgateResult<GitgateConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GitgateError::config_error(format!(
                "Configuration file not found at path: {}",
                path.display()
            )));
        }
        let contents = async_fs::read_to_string(path).await.map_err(|e| {
            GitgateError::config_error_with_source(
                format!("Failed to read {}", path.display()),
                e,
            )
        })?;
        let mut config = self.parse(&contents)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        info!(
            path = %path.display(),
            providers = config.providers.len(),
            repositories = config.repositories.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads the explicit path, else `gitgate.yaml` when present, else the
    /// defaults. A missing explicit path is an error.
    pub async fn load_or_default(&self, path: Option<&Path>) -> GitgateResult<GitgateConfig> {
        if let Some(path) = path {
            return self.load(path).await;
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return self.load(default_path).await;
        }
        debug!("No configuration file found, using defaults");
        let mut config = GitgateConfig::default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }
}
