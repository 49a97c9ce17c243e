//! Common test utilities and helpers
//!
//! A scripted HTTP transport standing in for the vendor APIs, plus payload
//! and response fixtures.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;
