pub mod branch_exists;
pub mod dirs;
pub mod reconcile;
pub mod repos;

pub use branch_exists::BranchExistsCommand;
pub use dirs::DirsCommand;
pub use reconcile::ReconcileCommand;
pub use repos::ReposCommand;
