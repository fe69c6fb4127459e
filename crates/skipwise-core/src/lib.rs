//! Core types and the attendance projection engine for SkipWise.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

pub mod error;
pub mod ledger;
pub mod projection;
pub mod report;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
