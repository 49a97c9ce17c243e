/// Infrastructure layer modules
///
/// Concrete implementations behind the application ports:
/// - HTTP transport, API client and pagination
/// - GitHub and GitLab adapters plus the factory selecting them
/// - Job queue transport
/// - Configuration file and in-memory persistence
pub mod filesystem;
pub mod http;
pub mod jobs;
pub mod memory_store;
pub mod vendors;

// Re-export commonly used types
pub use filesystem::config_store::{ConfigStore, GitgateConfig};
pub use http::{ApiClient, HttpTransport, Paginator, ReqwestTransport};
pub use jobs::{InProcessJobQueue, JobHandler, JobId, JobListener, JobQueue};
pub use memory_store::InMemoryStore;
pub use vendors::{GitProvider, GitRepo, TokenPolicy, VendorFactory};
