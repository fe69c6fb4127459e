//! Handlers for `/report` endpoints — collection-wide summaries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/report/overview` | Overall stats + analytics |
//! | `GET` | `/report/zones` | Subjects partitioned by risk band |
//! | `GET` | `/report/alerts` | Low-attendance alerts for the reminder poller |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use skipwise_core::{
  ledger::Ledger,
  report::{self, Alert, Analytics, OverallStats, ZoneBreakdown},
  store::SubjectStore,
};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Overview {
  pub stats:     OverallStats,
  pub analytics: Analytics,
}

/// `GET /report/overview`
pub async fn overview<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<Json<Overview>, ApiError> {
  let subjects = ledger.list_subjects()?;
  Ok(Json(Overview {
    stats:     report::overall_stats(&subjects)?,
    analytics: report::analytics(&subjects)?,
  }))
}

/// `GET /report/zones`
pub async fn zones<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<Json<ZoneBreakdown>, ApiError> {
  let subjects = ledger.list_subjects()?;
  Ok(Json(report::zone_breakdown(&subjects)?))
}

/// `GET /report/alerts`
pub async fn alerts<S: SubjectStore>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<Json<Vec<Alert>>, ApiError> {
  let subjects = ledger.list_subjects()?;
  Ok(Json(report::attendance_alerts(&subjects)?))
}
