pub mod file_matcher;
pub mod repo_path;
pub mod vendor;

pub use file_matcher::FileMatcher;
pub use vendor::Vendor;
