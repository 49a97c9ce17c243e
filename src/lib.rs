//! # gitgate - one contract over git hosting providers
//!
//! `gitgate` puts GitHub and GitLab behind a single adapter contract: list the
//! repositories a token can push to, check branches, read files, list
//! directories, write several files in one atomic commit, and turn push
//! webhooks into a stream of changed-file events.
//!
//! ## Features
//!
//! - **Diff-aware commits**: unchanged files and deletes of missing paths are
//!   dropped before the write; a request with no net change reports
//!   [`domain::entities::CommitOutcome::NoChanges`] instead of committing
//! - **Webhook reconciliation**: one event per changed file, attributed to the
//!   last commit of the push that touched it, for either vendor's payload shape
//! - **Background content fetch**: a job that fetches file content for many
//!   events and hands the result to a callback exactly once
//! - **Pagination**: `Link` and `x-next-page` headers behind one lazy helper
//!   with a hard page ceiling
//!
//! ## Architecture
//!
//! - [`domain`]: entities, value objects and the reconciliation rules
//! - [`application`]: use cases, services, persistence ports and jobs
//! - [`infrastructure`]: HTTP transport, vendor adapters, job queue, config
//! - [`presentation`]: the operator CLI
//! - [`common`]: error type and result helpers
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gitgate::domain::entities::{FileToCommit, Provider, RepoTarget};
//! use gitgate::infrastructure::http::ReqwestTransport;
//! use gitgate::infrastructure::vendors::{GitRepo, TokenPolicy, VendorFactory};
//!
//! # async fn example() -> gitgate::Result<()> {
//! let transport = Arc::new(ReqwestTransport::new("gitgate", None)?);
//! let factory = VendorFactory::new(transport);
//!
//! let provider = Provider::new("p1", "github", "org-1").with_token("ghp_...");
//! let repo = factory.create_repo(
//!     &provider,
//!     RepoTarget::new("acme", "widgets", "main"),
//!     TokenPolicy::Required,
//! )?;
//!
//! let outcome = repo
//!     .commit_files(&[FileToCommit::new("config/app.yaml", "port: 8080\n")], "Update config", &[])
//!     .await?;
//! if outcome.is_no_changes() {
//!     println!("Already up to date");
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::GitgateError;
pub use crate::common::result::GitgateResult as Result;
