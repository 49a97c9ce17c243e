//! Entities, value objects and vendor-neutral rules.

pub mod entities;
pub mod services;
pub mod value_objects;
