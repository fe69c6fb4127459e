//! Handlers for per-subject projection queries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/subjects/:id/advice` | Optional `?present=N&absent=M` overlay |
//! | `GET` | `/subjects/:id/projection` | Everything a subject card shows |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skipwise_core::{
  ledger::Ledger,
  projection::{self, RiskLevel, SAFE_PERCENTAGE, SkipAdvice},
  report,
  store::SubjectStore,
  subject::{PendingChanges, Subject},
};
use uuid::Uuid;

use crate::error::ApiError;

fn fetch<S: SubjectStore>(
  ledger: &Ledger<S>,
  id: Uuid,
) -> Result<Subject, ApiError> {
  ledger
    .get_subject(id)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))
}

// ─── Skip advice ─────────────────────────────────────────────────────────────

/// Uncommitted marks staged in the caller's session, passed as query
/// parameters so the advice prices them in before the hypothetical skip.
#[derive(Debug, Default, Deserialize)]
pub struct AdviceParams {
  #[serde(default)]
  pub present: u32,
  #[serde(default)]
  pub absent:  u32,
}

/// `GET /subjects/:id/advice[?present=N&absent=M]`
pub async fn skip_advice<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<AdviceParams>,
) -> Result<Json<SkipAdvice>, ApiError> {
  let subject = fetch(&ledger, id)?;
  let pending = PendingChanges {
    present: params.present,
    absent:  params.absent,
  };
  Ok(Json(projection::skip_advice(&subject, pending)?))
}

// ─── Projection view ─────────────────────────────────────────────────────────

/// Everything the subject card displays, computed in one round trip.
#[derive(Debug, Serialize)]
pub struct ProjectionView {
  pub subject_id:                    Uuid,
  pub name:                          String,
  pub attended:                      u32,
  pub total:                         u32,
  pub percentage:                    f64,
  pub risk:                          RiskLevel,
  pub safe_skips:                    u32,
  pub classes_needed_for_minimum:    u32,
  pub classes_needed_for_safe:       u32,
  pub projected_semester_percentage: Option<f64>,
  pub consecutive_skips:             u32,
  pub current_streak:                u32,
  pub best_streak:                   u32,
  pub days_since_last_attendance:    Option<i64>,
}

/// `GET /subjects/:id/projection`
pub async fn projection<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProjectionView>, ApiError> {
  let subject = fetch(&ledger, id)?;

  let percentage = projection::percentage(subject.attended, subject.total);
  let view = ProjectionView {
    subject_id: subject.subject_id,
    name: subject.name.clone(),
    attended: subject.attended,
    total: subject.total,
    percentage,
    risk: RiskLevel::for_percentage(percentage),
    safe_skips: projection::safe_skips(&subject)?,
    classes_needed_for_minimum: projection::classes_needed_for(
      &subject,
      projection::MIN_PERCENTAGE,
    )?,
    classes_needed_for_safe: projection::classes_needed_for(
      &subject,
      SAFE_PERCENTAGE,
    )?,
    projected_semester_percentage: projection::projected_semester_percentage(
      &subject,
    )?,
    consecutive_skips: projection::consecutive_skips(&subject),
    current_streak: subject.current_streak,
    best_streak: subject.best_streak,
    days_since_last_attendance: report::days_since_last_attendance(
      &subject,
      Utc::now(),
    ),
  };
  Ok(Json(view))
}
