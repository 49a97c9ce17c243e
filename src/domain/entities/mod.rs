pub mod changed_file;
pub mod commit;
pub mod files;
pub mod provider;
pub mod repository;

pub use changed_file::{ChangedFileEvent, PushedCommit};
pub use commit::{Commit, CommitInfo, CommitOutcome, NO_CHANGES_SHA};
pub use files::{AvailableRepository, FileToCommit, FileToDelete, RemoteFile};
pub use provider::{Provider, ProviderUpdate};
pub use repository::{RepoTarget, Repository};
