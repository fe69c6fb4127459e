//! The projection engine — pure, deterministic queries over a subject
//! snapshot.
//!
//! Nothing here mutates state or touches a store. Functions that read a
//! [`Subject`]'s counters validate them first and fail fast with
//! [`Error::InvariantViolation`](crate::Error::InvariantViolation) rather
//! than producing nonsensical percentages.
//!
//! The skip and catch-up budgets are defined by an iterative simulation, not
//! a closed form: at exact band boundaries the two can disagree on the
//! tie-break, and the iterative policy is the contract.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  subject::{PendingChanges, Subject},
};

/// Minimum eligibility threshold.
pub const MIN_PERCENTAGE: f64 = 75.0;
/// Comfort margin above the minimum.
pub const SAFE_PERCENTAGE: f64 = 80.0;

/// Simulation loops stop once the simulated total reaches this bound, which
/// guarantees termination. The bound is on the simulated total, not on the
/// iteration count.
const SIMULATION_TOTAL_CAP: u32 = 1000;

// ─── Risk classification ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
  Safe,
  Caution,
  Danger,
}

impl RiskLevel {
  /// Band edges are inclusive on their lower bound: exactly 75.0 is
  /// Caution, exactly 80.0 is Safe.
  pub fn for_percentage(percentage: f64) -> Self {
    if percentage >= SAFE_PERCENTAGE {
      Self::Safe
    } else if percentage >= MIN_PERCENTAGE {
      Self::Caution
    } else {
      Self::Danger
    }
  }
}

/// Attendance percentage; 0 when no classes have been recorded yet.
pub fn percentage(attended: u32, total: u32) -> f64 {
  if total == 0 {
    0.0
  } else {
    100.0 * f64::from(attended) / f64::from(total)
  }
}

// ─── Simulations ─────────────────────────────────────────────────────────────

fn simulate_safe_skips(attended: u32, total: u32) -> u32 {
  if total == 0 || percentage(attended, total) < MIN_PERCENTAGE {
    return 0;
  }
  let mut skips = 0;
  let mut sim_total = total;
  while sim_total < SIMULATION_TOTAL_CAP {
    if percentage(attended, sim_total + 1) >= MIN_PERCENTAGE {
      skips += 1;
      sim_total += 1;
    } else {
      break;
    }
  }
  skips
}

fn simulate_classes_needed(attended: u32, total: u32, target: f64) -> u32 {
  if total == 0 || percentage(attended, total) >= target {
    return 0;
  }
  let mut needed = 0;
  let mut sim_attended = attended;
  let mut sim_total = total;
  while sim_total < SIMULATION_TOTAL_CAP {
    sim_attended += 1;
    sim_total += 1;
    needed += 1;
    if percentage(sim_attended, sim_total) >= target {
      break;
    }
  }
  needed
}

// ─── Per-subject projections ─────────────────────────────────────────────────

/// Maximum number of additional absences that keep the running percentage at
/// or above the eligibility minimum after every single one of them.
///
/// Note the simulation tests the percentage after each hypothetical skip, so
/// a subject at exactly 80% one class from a sharp drop can legitimately
/// have a budget of zero.
pub fn safe_skips(subject: &Subject) -> Result<u32> {
  subject.check_invariants()?;
  Ok(simulate_safe_skips(subject.attended, subject.total))
}

/// Consecutive classes that must be attended to raise the percentage to
/// `target`. Zero when there is no data or the target is already met.
pub fn classes_needed_for(subject: &Subject, target: f64) -> Result<u32> {
  subject.check_invariants()?;
  Ok(simulate_classes_needed(subject.attended, subject.total, target))
}

/// Semester-end percentage assuming the current rate holds exactly on every
/// remaining class (projected attendance rounds down). `None` when the
/// semester target is unset, no classes are recorded, or none remain.
pub fn projected_semester_percentage(subject: &Subject) -> Result<Option<f64>> {
  subject.check_invariants()?;
  let Some(semester_total) = subject.total_classes_in_semester else {
    return Ok(None);
  };
  if subject.total == 0 || semester_total <= subject.total {
    return Ok(None);
  }

  let remaining = semester_total - subject.total;
  let rate = f64::from(subject.attended) / f64::from(subject.total);
  let projected_attended =
    subject.attended + (f64::from(remaining) * rate).floor() as u32;
  Ok(Some(
    100.0 * f64::from(projected_attended) / f64::from(semester_total),
  ))
}

/// Trailing run of absences at the end of the history.
pub fn consecutive_skips(subject: &Subject) -> u32 {
  subject
    .history
    .iter()
    .rev()
    .take_while(|entry| !entry.present)
    .count() as u32
}

/// Would committing `pending_absences` more absent marks drop this subject
/// below the eligibility minimum?
pub fn would_subject_breach_threshold(
  subject: &Subject,
  pending_absences: u32,
) -> Result<bool> {
  subject.check_invariants()?;
  let future_total = subject
    .total
    .checked_add(pending_absences)
    .ok_or(Error::CounterOverflow)?;
  Ok(percentage(subject.attended, future_total) < MIN_PERCENTAGE)
}

/// Same check over the summed counters of all subjects.
pub fn would_aggregate_breach_threshold(
  subjects: &[Subject],
  extra_absences: u32,
) -> Result<bool> {
  let mut attended = 0u32;
  let mut total = 0u32;
  for subject in subjects {
    subject.check_invariants()?;
    attended = attended
      .checked_add(subject.attended)
      .ok_or(Error::CounterOverflow)?;
    total = total.checked_add(subject.total).ok_or(Error::CounterOverflow)?;
  }
  let future_total = total
    .checked_add(extra_absences)
    .ok_or(Error::CounterOverflow)?;
  Ok(percentage(attended, future_total) < MIN_PERCENTAGE)
}

// ─── Skip advice ─────────────────────────────────────────────────────────────

/// The "can I skip?" verdict. Computed over a two-layer overlay: committed
/// counters first, the caller's uncommitted pending marks on top, then one
/// hypothetical further absence. The layers must not be collapsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipAdvice {
  /// Percentage with pending marks applied, before the hypothetical skip.
  pub current_percentage:    f64,
  /// Percentage after one more absence on top of the pending marks.
  pub after_skip_percentage: f64,
  pub after_skip_risk:       RiskLevel,
  /// Safe-skip budget of the effective (pending-applied) state.
  pub safe_skips:            u32,
  /// Set when the post-skip risk is Danger: consecutive classes needed to
  /// reach the eligibility minimum from the effective state.
  pub classes_needed:        Option<u32>,
}

pub fn skip_advice(
  subject: &Subject,
  pending: PendingChanges,
) -> Result<SkipAdvice> {
  subject.check_invariants()?;

  // Layer 1: overlay the uncommitted pending marks. Pending counts come
  // straight from the caller, so the sums are checked, not wrapped.
  let attended = subject
    .attended
    .checked_add(pending.present)
    .ok_or(Error::CounterOverflow)?;
  let total = pending
    .present
    .checked_add(pending.absent)
    .and_then(|marks| subject.total.checked_add(marks))
    .ok_or(Error::CounterOverflow)?;
  let current_percentage = percentage(attended, total);

  // Layer 2: one hypothetical further absence on top of the effective state.
  let after_total = total.checked_add(1).ok_or(Error::CounterOverflow)?;
  let after_skip_percentage = percentage(attended, after_total);
  let after_skip_risk = RiskLevel::for_percentage(after_skip_percentage);

  let safe_skips = simulate_safe_skips(attended, total);
  let classes_needed = match after_skip_risk {
    RiskLevel::Danger => {
      Some(simulate_classes_needed(attended, total, MIN_PERCENTAGE))
    }
    _ => None,
  };

  Ok(SkipAdvice {
    current_percentage,
    after_skip_percentage,
    after_skip_risk,
    safe_skips,
    classes_needed,
  })
}
