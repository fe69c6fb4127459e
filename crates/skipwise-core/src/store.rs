//! The `SubjectStore` trait and the in-memory reference implementation.
//!
//! The trait is implemented by storage backends (e.g. `skipwise-store-json`).
//! Higher layers depend on this abstraction, not on any concrete backend.

use std::{collections::BTreeMap, convert::Infallible, sync::Mutex};

use uuid::Uuid;

use crate::subject::Subject;

/// The full persisted state: every subject keyed by id. Key order carries no
/// meaning for the engine.
pub type Collection = BTreeMap<Uuid, Subject>;

/// Abstraction over the persistence collaborator.
///
/// The ledger wraps every mutation in load-before-mutate / save-after-mutate,
/// so implementations only need whole-collection snapshot semantics. Calls
/// are synchronous; serialising concurrent mutations is the ledger caller's
/// concern, not the store's.
pub trait SubjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the current collection. An empty store yields an empty collection.
  fn load(&self) -> Result<Collection, Self::Error>;

  /// Replace the persisted collection with `subjects`.
  fn save(&self, subjects: &Collection) -> Result<(), Self::Error>;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// A store that keeps the collection in process memory — used in tests and
/// by callers that handle persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Collection>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl SubjectStore for MemoryStore {
  type Error = Infallible;

  fn load(&self) -> Result<Collection, Infallible> {
    Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
  }

  fn save(&self, subjects: &Collection) -> Result<(), Infallible> {
    *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = subjects.clone();
    Ok(())
  }
}
