pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::application::services::AdapterResolver;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::filesystem::config_store::{ConfigStore, GitgateConfig};
use crate::infrastructure::http::ReqwestTransport;
use crate::infrastructure::memory_store::InMemoryStore;
use crate::infrastructure::vendors::VendorFactory;

use commands::{BranchExistsCommand, DirsCommand, ReconcileCommand, ReposCommand};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
}

/// gitgate - one contract over GitHub and GitLab
#[derive(Parser)]
#[command(name = "gitgate")]
#[command(about = "Inspect git providers and reconcile push webhooks")]
#[command(version, long_version = long_version())]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./gitgate.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List repositories the provider's token can push to
    Repos {
        /// Provider id from the configuration
        #[arg(short, long)]
        provider: String,
    },

    /// Check whether a branch exists on a remote repository
    BranchExists {
        /// Provider id from the configuration
        #[arg(short, long)]
        provider: String,

        owner: String,
        repo: String,
        branch: String,
    },

    /// List directories of a remote repository
    Dirs {
        /// Provider id from the configuration
        #[arg(short, long)]
        provider: String,

        owner: String,
        repo: String,
        branch: String,

        /// Only list directories below this path
        #[arg(long)]
        path: Option<String>,
    },

    /// Extract changed files from a saved push payload (offline)
    Reconcile {
        /// Vendor that sent the payload (github, gitlab)
        #[arg(long)]
        vendor: Vendor,

        /// Tracked branch
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Regular expression selecting file paths
        #[arg(short, long, default_value = ".*")]
        pattern: String,

        /// Path to the JSON payload
        payload: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit: ",
        env!("GIT_HASH"),
        "\nbuilt: ",
        env!("BUILD_DATE"),
        "\ntarget: ",
        env!("BUILD_TARGET")
    )
}

/// Wiring shared by every command.
pub struct AppContext {
    pub config: GitgateConfig,
    pub store: Arc<InMemoryStore>,
    pub factory: Arc<VendorFactory>,
}

impl AppContext {
    pub fn from_config(config: GitgateConfig) -> crate::Result<Self> {
        let transport = ReqwestTransport::new(
            &config.http.user_agent,
            Some(Duration::from_secs(config.http.timeout_secs)),
        )?;
        let store = Arc::new(InMemoryStore::seeded(config.providers(), config.repositories()));
        Ok(Self {
            factory: Arc::new(VendorFactory::new(Arc::new(transport))),
            store,
            config,
        })
    }

    pub fn resolver(&self) -> AdapterResolver {
        AdapterResolver::new(self.store.clone(), self.store.clone(), self.factory.clone())
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> Result<()> {
        colored::control::set_override(!self.cli.no_color);

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> Result<()> {
        let config = ConfigStore::new()
            .load_or_default(self.cli.config.as_deref())
            .await?;
        init_logging(&config.log_level, self.cli.verbose);
        let context = AppContext::from_config(config)?;
        let output = self.cli.output;

        match &self.cli.command {
            Commands::Repos { provider } => {
                ReposCommand::new(provider, output).execute(&context).await
            }
            Commands::BranchExists {
                provider,
                owner,
                repo,
                branch,
            } => {
                BranchExistsCommand {
                    provider_id: provider.clone(),
                    owner: owner.clone(),
                    repo: repo.clone(),
                    branch: branch.clone(),
                    output,
                }
                .execute(&context)
                .await
            }
            Commands::Dirs {
                provider,
                owner,
                repo,
                branch,
                path,
            } => {
                DirsCommand {
                    provider_id: provider.clone(),
                    owner: owner.clone(),
                    repo: repo.clone(),
                    branch: branch.clone(),
                    path: path.clone(),
                    output,
                }
                .execute(&context)
                .await
            }
            Commands::Reconcile {
                vendor,
                branch,
                pattern,
                payload,
            } => {
                ReconcileCommand {
                    vendor: *vendor,
                    branch: branch.clone(),
                    pattern: pattern.clone(),
                    payload: payload.clone(),
                    output,
                }
                .execute(&context)
                .await
            }
        }
    }
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level. Logs go to
/// stderr so JSON output stays clean.
fn init_logging(configured_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
