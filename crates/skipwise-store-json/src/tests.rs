//! Integration tests for `JsonStore` against real files in a temp dir.

use skipwise_core::{
  ledger::Ledger,
  store::{Collection, SubjectStore as _},
  subject::Subject,
};
use tempfile::TempDir;
use uuid::Uuid;

use crate::JsonStore;

fn store(dir: &TempDir) -> JsonStore {
  JsonStore::new(dir.path().join("subjects.json"))
}

#[test]
fn load_of_a_missing_file_is_an_empty_collection() {
  let dir = TempDir::new().unwrap();
  let store = store(&dir);

  let subjects = store.load().unwrap();
  assert!(subjects.is_empty());
}

#[test]
fn save_then_load_round_trips_every_field() {
  let dir = TempDir::new().unwrap();
  let store = store(&dir);

  let ledger = Ledger::new(store);
  let created = ledger.create_subject("Physics", Some(40)).unwrap();
  ledger.record_attendance(created.subject_id, true).unwrap();
  ledger.record_attendance(created.subject_id, true).unwrap();
  let written = ledger.record_attendance(created.subject_id, false).unwrap();

  // Reopen a fresh store over the same file.
  let reopened = JsonStore::new(dir.path().join("subjects.json"));
  let subjects = reopened.load().unwrap();
  let read: &Subject = subjects.get(&created.subject_id).unwrap();

  assert_eq!(read.subject_id, written.subject_id);
  assert_eq!(read.name, written.name);
  assert_eq!(read.attended, written.attended);
  assert_eq!(read.total, written.total);
  assert_eq!(read.skips_used, written.skips_used);
  assert_eq!(read.current_streak, written.current_streak);
  assert_eq!(read.best_streak, written.best_streak);
  assert_eq!(read.last_attended_date, written.last_attended_date);
  assert_eq!(read.total_classes_in_semester, Some(40));
  assert_eq!(read.history, written.history);
}

#[test]
fn ledger_state_survives_a_reopen() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("subjects.json");

  let id = {
    let ledger = Ledger::new(JsonStore::new(&path));
    let id = ledger.create_subject("Maths", None).unwrap().subject_id;
    ledger.record_attendance(id, true).unwrap();
    id
  };

  let ledger = Ledger::new(JsonStore::new(&path));
  let subject = ledger.get_subject(id).unwrap().unwrap();
  assert_eq!(subject.attended, 1);
  assert_eq!(subject.total, 1);
  assert!(ledger.get_subject(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn save_leaves_no_temp_file_behind() {
  let dir = TempDir::new().unwrap();
  let store = store(&dir);

  store.save(&Collection::new()).unwrap();
  assert!(store.path().exists());
  assert!(!store.path().with_extension("json.tmp").exists());
}

#[test]
fn delete_persists_across_reopen() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("subjects.json");

  let ledger = Ledger::new(JsonStore::new(&path));
  let id = ledger.create_subject("History", None).unwrap().subject_id;
  ledger.delete_subject(id).unwrap();

  let reopened = Ledger::new(JsonStore::new(&path));
  assert!(reopened.get_subject(id).unwrap().is_none());
  assert!(reopened.list_subjects().unwrap().is_empty());
}
