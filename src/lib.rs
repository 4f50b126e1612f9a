//! Discount Finder: retail deal scoring and filtering service.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod source;
pub mod state;
pub mod storage;
pub mod refresh;
pub mod dashboard;
