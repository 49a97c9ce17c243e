pub mod adapter_resolver;
pub mod commit_orchestrator;
pub mod provider_service;
pub mod webhook_reconciler;

pub use adapter_resolver::{AdapterResolver, ResolvedRepository};
pub use commit_orchestrator::CommitOrchestrator;
pub use provider_service::{AddProviderCommand, ProviderService};
pub use webhook_reconciler::WebhookReconciler;
