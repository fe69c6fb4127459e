//! Error types for `skipwise-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("subject name must not be empty")]
  EmptyName,

  #[error("semester class count must be positive")]
  ZeroSemesterClasses,

  /// Caller-supplied pending counts would overflow the attendance counters.
  #[error("pending marks overflow the attendance counters")]
  CounterOverflow,

  #[error("batch of {requested} marks exceeds the limit of {limit}")]
  BatchTooLarge { requested: u64, limit: u32 },

  /// A stored counter contradicts the history it was derived from. This is
  /// a caller bug upstream of the computation, never a recoverable state.
  #[error("counter invariant violated for subject {subject_id}: {detail}")]
  InvariantViolation { subject_id: Uuid, detail: String },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
