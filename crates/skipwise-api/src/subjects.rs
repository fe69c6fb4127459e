//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/subjects` | List all subjects |
//! | `POST`   | `/subjects` | Body: [`CreateBody`]; 201 + subject |
//! | `GET`    | `/subjects/:id` | 404 if not found |
//! | `DELETE` | `/subjects/:id` | 204, idempotent |
//! | `POST`   | `/subjects/:id/attendance` | Body: `{"present":true}` |
//! | `POST`   | `/subjects/:id/attendance/batch` | Body: [`PendingChanges`] |
//! | `POST`   | `/subjects/:id/undo` | Returns [`UndoOutcome`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use skipwise_core::{
  ledger::{Ledger, UndoOutcome},
  store::SubjectStore,
  subject::{PendingChanges, Subject},
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /subjects`
pub async fn list<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  Ok(Json(ledger.list_subjects()?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
  pub total_classes_in_semester: Option<u32>,
}

/// `POST /subjects` — body: `{"name":"Physics","total_classes_in_semester":40}`
pub async fn create<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let subject =
    ledger.create_subject(&body.name, body.total_classes_in_semester)?;
  tracing::debug!(subject_id = %subject.subject_id, "subject created");
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one / delete ────────────────────────────────────────────────────────

/// `GET /subjects/:id`
pub async fn get_one<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError> {
  let subject = ledger
    .get_subject(id)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}

/// `DELETE /subjects/:id` — 204 whether or not the subject existed.
pub async fn delete_one<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  ledger.delete_subject(id)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MarkBody {
  pub present: bool,
}

/// `POST /subjects/:id/attendance` — record one mark.
pub async fn mark<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<MarkBody>,
) -> Result<Json<Subject>, ApiError> {
  let subject = ledger.record_attendance(id, body.present)?;
  Ok(Json(subject))
}

/// `POST /subjects/:id/attendance/batch` — commit staged pending marks;
/// present marks land before absent ones.
pub async fn mark_batch<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  Json(pending): Json<PendingChanges>,
) -> Result<Json<Subject>, ApiError> {
  let subject = ledger.commit_pending(id, pending)?;
  Ok(Json(subject))
}

/// `POST /subjects/:id/undo` — returns the reverted subject, or the
/// nothing-to-undo signal for the caller to surface.
pub async fn undo<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UndoOutcome>, ApiError> {
  Ok(Json(ledger.undo_last_attendance(id)?))
}
