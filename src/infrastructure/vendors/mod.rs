//! Vendor adapters and the factory that selects them.

pub mod factory;
pub mod github;
pub mod gitlab;
pub mod vendor_interface;

pub use factory::{AdapterContext, TokenPolicy, VendorBuilder, VendorFactory};
pub use vendor_interface::{GitProvider, GitRepo};
