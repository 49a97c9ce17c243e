//! Application layer: services and use cases over the vendor adapters and
//! the persistence ports.

pub mod jobs;
pub mod ports;
pub mod services;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;
