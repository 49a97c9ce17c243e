pub mod add_repository;
pub mod commit_to_repository;
pub mod get_file_from_repo;
pub mod handle_push_hook;
pub mod remote_directories;

pub use add_repository::{AddRepositoryCommand, AddRepositoryUseCase};
pub use commit_to_repository::{CommitToRepositoryCommand, CommitToRepositoryUseCase};
pub use get_file_from_repo::{GetFileFromRepoUseCase, RepositoryFile};
pub use handle_push_hook::{HandlePushHookUseCase, PushHookRecord};
pub use remote_directories::RemoteDirectoriesUseCase;
