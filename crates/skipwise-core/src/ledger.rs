//! The ledger manager — the only way attendance state changes.
//!
//! Every mutation is load → mutate → save against the backing store, so no
//! partially-written state is ever observable. The ledger never computes
//! projections; that is [`crate::projection`]'s job.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{Collection, SubjectStore},
  subject::{HistoryEntry, PendingChanges, Subject},
};

/// Outcome of [`Ledger::undo_last_attendance`].
///
/// "Nothing to undo" is a signal the caller surfaces to the user, not an
/// error, so it lives in the success channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "subject", rename_all = "snake_case")]
pub enum UndoOutcome {
  Reverted(Subject),
  NothingToUndo,
}

impl UndoOutcome {
  pub fn is_noop(&self) -> bool { matches!(self, Self::NothingToUndo) }
}

/// Upper bound on marks accepted by a single batch commit. Matches the
/// projection engine's simulation ceiling; a real timetable never comes
/// close.
pub const MAX_BATCH_MARKS: u32 = 1000;

/// Owns the canonical per-subject attendance record and applies mutations
/// with exact counter/streak arithmetic.
pub struct Ledger<S> {
  store: S,
}

impl<S: SubjectStore> Ledger<S> {
  pub fn new(store: S) -> Self { Self { store } }

  fn load(&self) -> Result<Collection> {
    self.store.load().map_err(|e| Error::Storage(Box::new(e)))
  }

  fn save(&self, subjects: &Collection) -> Result<()> {
    self
      .store
      .save(subjects)
      .map_err(|e| Error::Storage(Box::new(e)))
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Create and persist a new subject with zeroed counters.
  pub fn create_subject(
    &self,
    name: &str,
    total_classes_in_semester: Option<u32>,
  ) -> Result<Subject> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    if total_classes_in_semester == Some(0) {
      return Err(Error::ZeroSemesterClasses);
    }

    let mut subjects = self.load()?;
    let subject = Subject::new(name, total_classes_in_semester);
    subjects.insert(subject.subject_id, subject.clone());
    self.save(&subjects)?;
    Ok(subject)
  }

  /// Remove a subject and its whole history. A no-op when `id` is unknown.
  pub fn delete_subject(&self, id: Uuid) -> Result<()> {
    let mut subjects = self.load()?;
    if subjects.remove(&id).is_some() {
      self.save(&subjects)?;
    }
    Ok(())
  }

  /// Record one present/absent mark — the atomic unit of mutation.
  pub fn record_attendance(&self, id: Uuid, present: bool) -> Result<Subject> {
    let mut subjects = self.load()?;
    let subject = subjects.get_mut(&id).ok_or(Error::SubjectNotFound(id))?;
    apply_mark(subject, present);
    let updated = subject.clone();
    self.save(&subjects)?;
    Ok(updated)
  }

  /// Commit a staged batch: all present marks, then all absent marks, each
  /// applied through the single-mark rule. Order matters because streak and
  /// best-streak depend on it. One save at the end.
  ///
  /// Batches above [`MAX_BATCH_MARKS`] are rejected outright; the counts
  /// come from callers and would otherwise drive an unbounded loop.
  pub fn commit_pending(
    &self,
    id: Uuid,
    pending: PendingChanges,
  ) -> Result<Subject> {
    let requested = u64::from(pending.present) + u64::from(pending.absent);
    if requested > u64::from(MAX_BATCH_MARKS) {
      return Err(Error::BatchTooLarge {
        requested,
        limit: MAX_BATCH_MARKS,
      });
    }

    let mut subjects = self.load()?;
    let subject = subjects.get_mut(&id).ok_or(Error::SubjectNotFound(id))?;
    for _ in 0..pending.present {
      apply_mark(subject, true);
    }
    for _ in 0..pending.absent {
      apply_mark(subject, false);
    }
    let updated = subject.clone();
    self.save(&subjects)?;
    Ok(updated)
  }

  /// Remove the most recent history entry and reverse its counters.
  ///
  /// Returns [`UndoOutcome::NothingToUndo`] when `id` is unknown or the
  /// history is empty. `best_streak` is intentionally left as-is.
  pub fn undo_last_attendance(&self, id: Uuid) -> Result<UndoOutcome> {
    let mut subjects = self.load()?;
    let Some(subject) = subjects.get_mut(&id) else {
      return Ok(UndoOutcome::NothingToUndo);
    };
    let Some(last) = subject.history.pop() else {
      return Ok(UndoOutcome::NothingToUndo);
    };

    subject.total = subject.total.saturating_sub(1);
    if last.present {
      subject.attended = subject.attended.saturating_sub(1);
    } else {
      subject.skips_used = subject.skips_used.saturating_sub(1);
    }
    // The trailing-run recomputation is authoritative for the streak.
    subject.current_streak = subject.trailing_streak();

    let updated = subject.clone();
    self.save(&subjects)?;
    Ok(UndoOutcome::Reverted(updated))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    Ok(self.load()?.get(&id).cloned())
  }

  /// Snapshot of all subjects; no live aliasing with the store.
  pub fn list_subjects(&self) -> Result<Vec<Subject>> {
    Ok(self.load()?.into_values().collect())
  }
}

/// Apply one mark to a subject in place.
fn apply_mark(subject: &mut Subject, present: bool) {
  let now = Utc::now();
  subject.total += 1;
  if present {
    subject.attended += 1;
    subject.current_streak += 1;
    subject.last_attended_date = Some(now);
    subject.best_streak = subject.best_streak.max(subject.current_streak);
  } else {
    subject.current_streak = 0;
    subject.skips_used += 1;
  }
  subject.history.push(HistoryEntry { date: now, present });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  fn ledger() -> Ledger<MemoryStore> { Ledger::new(MemoryStore::new()) }

  fn assert_consistent(subject: &Subject) {
    subject.check_invariants().expect("invariants hold");
    assert_eq!(subject.current_streak, subject.trailing_streak());
  }

  #[test]
  fn create_subject_starts_zeroed() {
    let ledger = ledger();
    let subject = ledger.create_subject("Physics", Some(40)).unwrap();

    assert_eq!(subject.name, "Physics");
    assert_eq!(subject.attended, 0);
    assert_eq!(subject.total, 0);
    assert_eq!(subject.skips_used, 0);
    assert_eq!(subject.current_streak, 0);
    assert_eq!(subject.best_streak, 0);
    assert_eq!(subject.total_classes_in_semester, Some(40));
    assert!(subject.last_attended_date.is_none());
    assert!(subject.history.is_empty());
  }

  #[test]
  fn create_subject_ids_do_not_collide() {
    let ledger = ledger();
    let a = ledger.create_subject("Maths", None).unwrap();
    let b = ledger.create_subject("Maths", None).unwrap();
    assert_ne!(a.subject_id, b.subject_id);
    assert_eq!(ledger.list_subjects().unwrap().len(), 2);
  }

  #[test]
  fn create_subject_rejects_bad_input() {
    let ledger = ledger();
    assert!(matches!(
      ledger.create_subject("   ", None),
      Err(Error::EmptyName)
    ));
    assert!(matches!(
      ledger.create_subject("Chemistry", Some(0)),
      Err(Error::ZeroSemesterClasses)
    ));
  }

  #[test]
  fn record_attendance_unknown_subject_errors() {
    let ledger = ledger();
    assert!(matches!(
      ledger.record_attendance(Uuid::new_v4(), true),
      Err(Error::SubjectNotFound(_))
    ));
  }

  // Scenario: three present marks then one absent.
  #[test]
  fn marks_update_counters_and_streaks() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    for _ in 0..3 {
      ledger.record_attendance(id, true).unwrap();
    }
    let subject = ledger.record_attendance(id, false).unwrap();

    assert_eq!(subject.attended, 3);
    assert_eq!(subject.total, 4);
    assert_eq!(subject.skips_used, 1);
    assert_eq!(subject.current_streak, 0);
    assert_eq!(subject.best_streak, 3);
    assert!(subject.last_attended_date.is_some());
    assert_consistent(&subject);
  }

  #[test]
  fn undo_round_trips_counters_but_not_best_streak() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;
    ledger.record_attendance(id, true).unwrap();
    let before = ledger.record_attendance(id, true).unwrap();

    let after_extra = ledger.record_attendance(id, true).unwrap();
    assert_eq!(after_extra.best_streak, 3);

    let UndoOutcome::Reverted(subject) =
      ledger.undo_last_attendance(id).unwrap()
    else {
      panic!("expected a reverted subject");
    };

    assert_eq!(subject.attended, before.attended);
    assert_eq!(subject.total, before.total);
    assert_eq!(subject.skips_used, before.skips_used);
    assert_eq!(subject.current_streak, before.current_streak);
    // Documented quirk: best_streak stays at its high-water mark.
    assert_eq!(subject.best_streak, 3);
    assert_consistent(&subject);
  }

  #[test]
  fn undo_of_an_absent_mark_restores_the_streak() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;
    ledger.record_attendance(id, true).unwrap();
    ledger.record_attendance(id, true).unwrap();
    let broken = ledger.record_attendance(id, false).unwrap();
    assert_eq!(broken.current_streak, 0);

    let UndoOutcome::Reverted(subject) =
      ledger.undo_last_attendance(id).unwrap()
    else {
      panic!("expected a reverted subject");
    };
    assert_eq!(subject.current_streak, 2);
    assert_eq!(subject.skips_used, 0);
    assert_consistent(&subject);
  }

  #[test]
  fn undo_with_empty_history_is_a_noop() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    let outcome = ledger.undo_last_attendance(id).unwrap();
    assert!(outcome.is_noop());

    let subject = ledger.get_subject(id).unwrap().unwrap();
    assert_eq!(subject.total, 0);
    assert_eq!(subject.attended, 0);
    assert_eq!(subject.skips_used, 0);
  }

  #[test]
  fn undo_with_unknown_id_is_a_noop() {
    let ledger = ledger();
    assert!(ledger.undo_last_attendance(Uuid::new_v4()).unwrap().is_noop());
  }

  #[test]
  fn commit_pending_applies_present_then_absent() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    let subject = ledger
      .commit_pending(id, PendingChanges { present: 2, absent: 1 })
      .unwrap();

    assert_eq!(subject.attended, 2);
    assert_eq!(subject.total, 3);
    assert_eq!(subject.skips_used, 1);
    // The absent mark lands last, so the streak is broken but best survives.
    assert_eq!(subject.current_streak, 0);
    assert_eq!(subject.best_streak, 2);
    assert_eq!(subject.history.len(), 3);
    assert_consistent(&subject);
  }

  #[test]
  fn commit_pending_rejects_oversized_batches() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    let result = ledger
      .commit_pending(id, PendingChanges { present: u32::MAX, absent: 1 });
    assert!(matches!(result, Err(Error::BatchTooLarge { .. })));

    // The rejected batch must not have touched the ledger.
    let subject = ledger.get_subject(id).unwrap().unwrap();
    assert_eq!(subject.total, 0);
    assert!(subject.history.is_empty());

    // A batch at the limit itself still goes through.
    let subject = ledger
      .commit_pending(id, PendingChanges { present: 999, absent: 1 })
      .unwrap();
    assert_eq!(subject.total, 1000);
    assert_consistent(&subject);
  }

  #[test]
  fn delete_subject_is_idempotent() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    ledger.delete_subject(id).unwrap();
    assert!(ledger.get_subject(id).unwrap().is_none());
    // Deleting again is not an error.
    ledger.delete_subject(id).unwrap();
  }

  #[test]
  fn counters_stay_consistent_across_mixed_operations() {
    let ledger = ledger();
    let id = ledger.create_subject("Physics", None).unwrap().subject_id;

    let marks = [true, true, false, true, false, false, true, true];
    for present in marks {
      let subject = ledger.record_attendance(id, present).unwrap();
      assert_eq!(subject.attended + subject.skips_used, subject.total);
      assert_eq!(subject.total as usize, subject.history.len());
      assert_consistent(&subject);
    }

    while !ledger.undo_last_attendance(id).unwrap().is_noop() {
      let subject = ledger.get_subject(id).unwrap().unwrap();
      assert_consistent(&subject);
    }

    let subject = ledger.get_subject(id).unwrap().unwrap();
    assert_eq!(subject.total, 0);
    assert!(subject.history.is_empty());
  }
}
