//! JSON REST API for SkipWise.
//!
//! Exposes an axum [`Router`] backed by a [`Ledger`] over any
//! [`skipwise_core::store::SubjectStore`]. Transport, TLS, and delivery of
//! the alerts surfaced under `/report/alerts` are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", skipwise_api::api_router(ledger.clone()))
//! ```

pub mod advice;
pub mod error;
pub mod report;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use skipwise_core::{ledger::Ledger, store::SubjectStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(ledger: Arc<Ledger<S>>) -> Router<()>
where
  S: SubjectStore + 'static,
{
  Router::new()
    // Subjects
    .route(
      "/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>).delete(subjects::delete_one::<S>),
    )
    // Attendance mutations
    .route("/subjects/{id}/attendance", post(subjects::mark::<S>))
    .route(
      "/subjects/{id}/attendance/batch",
      post(subjects::mark_batch::<S>),
    )
    .route("/subjects/{id}/undo", post(subjects::undo::<S>))
    // Projections
    .route("/subjects/{id}/advice", get(advice::skip_advice::<S>))
    .route("/subjects/{id}/projection", get(advice::projection::<S>))
    // Reports
    .route("/report/overview", get(report::overview::<S>))
    .route("/report/zones", get(report::zones::<S>))
    .route("/report/alerts", get(report::alerts::<S>))
    .with_state(ledger)
}
