pub mod queue;

pub use queue::{InProcessJobQueue, JobHandler, JobId, JobListener, JobQueue};
