//! JSON-file backend for the SkipWise subject store.
//!
//! The whole collection is serialised as one document per save. The ledger
//! already wraps every mutation in a load/save pair, so whole-snapshot
//! granularity is the natural unit here.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonStore;

#[cfg(test)]
mod tests;
