//! Subject — one tracked course and its attendance ledger.
//!
//! The counters (`attended`, `skips_used`, `current_streak`) are stored
//! redundantly for fast reads, but each of them is re-derivable from
//! `history` alone. [`Subject::trailing_streak`] is the single source of
//! truth for the streak; every mutation keeps the stored counter in
//! agreement with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// One recorded present/absent event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub date:    DateTime<Utc>,
  pub present: bool,
}

/// A tracked course. History is append-only in normal operation and is only
/// ever truncated from the tail by undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:                Uuid,
  pub name:                      String,
  pub attended:                  u32,
  pub total:                     u32,
  pub skips_used:                u32,
  pub current_streak:            u32,
  /// Highest streak ever observed. Monotone except that undo does not roll
  /// it back.
  pub best_streak:               u32,
  pub last_attended_date:        Option<DateTime<Utc>>,
  /// Target class count for the term; `None` disables semester projection.
  pub total_classes_in_semester: Option<u32>,
  pub history:                   Vec<HistoryEntry>,
}

impl Subject {
  /// A fresh subject: zero counters, empty history, new v4 id. The id is
  /// never derived from wall-clock time, so rapid successive creations
  /// cannot collide.
  pub fn new(
    name: impl Into<String>,
    total_classes_in_semester: Option<u32>,
  ) -> Self {
    Self {
      subject_id: Uuid::new_v4(),
      name: name.into(),
      attended: 0,
      total: 0,
      skips_used: 0,
      current_streak: 0,
      best_streak: 0,
      last_attended_date: None,
      total_classes_in_semester,
      history: Vec::new(),
    }
  }

  /// Re-derive the current streak from history alone: the length of the
  /// trailing run of `present` entries.
  pub fn trailing_streak(&self) -> u32 {
    self
      .history
      .iter()
      .rev()
      .take_while(|entry| entry.present)
      .count() as u32
  }

  /// Fail fast when the stored counters cannot be trusted. The projection
  /// engine calls this before computing anything.
  pub fn check_invariants(&self) -> Result<()> {
    if self.attended > self.total {
      return Err(self.invariant_violation(format!(
        "attended {} exceeds total {}",
        self.attended, self.total
      )));
    }
    if self.attended + self.skips_used != self.total {
      return Err(self.invariant_violation(format!(
        "attended {} + skips_used {} does not equal total {}",
        self.attended, self.skips_used, self.total
      )));
    }
    if self.history.len() != self.total as usize {
      return Err(self.invariant_violation(format!(
        "history length {} does not match total {}",
        self.history.len(),
        self.total
      )));
    }
    Ok(())
  }

  fn invariant_violation(&self, detail: String) -> Error {
    Error::InvariantViolation {
      subject_id: self.subject_id,
      detail,
    }
  }
}

/// Uncommitted present/absent marks staged by a caller session before being
/// committed to the ledger. Always an explicit parameter, never process
/// state.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct PendingChanges {
  #[serde(default)]
  pub present: u32,
  #[serde(default)]
  pub absent:  u32,
}

impl PendingChanges {
  pub fn is_empty(&self) -> bool { self.present == 0 && self.absent == 0 }
}
