//! Pure summaries across the whole collection: zone partitions, overall
//! stats, cross-subject analytics, and low-attendance alerts.
//!
//! Like the projection engine, everything here is a side-effect-free read.
//! The notification collaborator polls [`attendance_alerts`] on its own
//! schedule and owns all delivery concerns.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Result,
  projection::{self, MIN_PERCENTAGE, RiskLevel, SAFE_PERCENTAGE, percentage},
  subject::Subject,
};

// ─── Zone dashboard ──────────────────────────────────────────────────────────

/// One subject's placement in the zone dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneEntry {
  pub subject_id: Uuid,
  pub name:       String,
  pub percentage: f64,
}

/// Subjects with at least one recorded class, partitioned by risk band.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZoneBreakdown {
  pub safe:    Vec<ZoneEntry>,
  pub caution: Vec<ZoneEntry>,
  pub danger:  Vec<ZoneEntry>,
}

pub fn zone_breakdown(subjects: &[Subject]) -> Result<ZoneBreakdown> {
  let mut zones = ZoneBreakdown::default();
  for subject in subjects {
    subject.check_invariants()?;
    if subject.total == 0 {
      continue;
    }
    let pct = percentage(subject.attended, subject.total);
    let entry = ZoneEntry {
      subject_id: subject.subject_id,
      name:       subject.name.clone(),
      percentage: pct,
    };
    match RiskLevel::for_percentage(pct) {
      RiskLevel::Safe => zones.safe.push(entry),
      RiskLevel::Caution => zones.caution.push(entry),
      RiskLevel::Danger => zones.danger.push(entry),
    }
  }
  Ok(zones)
}

// ─── Overall stats ───────────────────────────────────────────────────────────

/// Summed counters across every subject.
#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
  pub total_classes:      u32,
  pub attended_classes:   u32,
  pub skips_used:         u32,
  /// The single best streak across all subjects.
  pub best_streak:        u32,
  pub overall_percentage: f64,
  pub overall_risk:       RiskLevel,
}

pub fn overall_stats(subjects: &[Subject]) -> Result<OverallStats> {
  let mut total = 0u32;
  let mut attended = 0u32;
  let mut skips = 0u32;
  let mut best_streak = 0u32;
  for subject in subjects {
    subject.check_invariants()?;
    total += subject.total;
    attended += subject.attended;
    skips += subject.skips_used;
    best_streak = best_streak.max(subject.best_streak);
  }
  let overall_percentage = percentage(attended, total);
  Ok(OverallStats {
    total_classes: total,
    attended_classes: attended,
    skips_used: skips,
    best_streak,
    overall_percentage,
    overall_risk: RiskLevel::for_percentage(overall_percentage),
  })
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SubjectHighlight {
  pub subject_id: Uuid,
  pub name:       String,
  pub percentage: f64,
}

/// Cross-subject analytics for the overview panel. `best`/`worst` are `None`
/// until at least one subject has recorded classes.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
  pub best:               Option<SubjectHighlight>,
  pub worst:              Option<SubjectHighlight>,
  /// Subjects with data sitting below the comfort margin.
  pub at_risk_count:      usize,
  /// Mean percentage across subjects with at least one recorded class.
  pub average_percentage: f64,
  /// Summed safe-skip budget across all subjects.
  pub total_safe_skips:   u32,
}

pub fn analytics(subjects: &[Subject]) -> Result<Analytics> {
  let mut best: Option<SubjectHighlight> = None;
  let mut worst: Option<SubjectHighlight> = None;
  let mut at_risk_count = 0;
  let mut percentage_sum = 0.0;
  let mut with_data = 0u32;
  let mut total_safe_skips = 0u32;

  for subject in subjects {
    total_safe_skips += projection::safe_skips(subject)?;
    if subject.total == 0 {
      continue;
    }
    let pct = percentage(subject.attended, subject.total);
    with_data += 1;
    percentage_sum += pct;
    if pct < SAFE_PERCENTAGE {
      at_risk_count += 1;
    }
    if best.as_ref().is_none_or(|b| pct > b.percentage) {
      best = Some(SubjectHighlight {
        subject_id: subject.subject_id,
        name:       subject.name.clone(),
        percentage: pct,
      });
    }
    if worst.as_ref().is_none_or(|w| pct < w.percentage) {
      worst = Some(SubjectHighlight {
        subject_id: subject.subject_id,
        name:       subject.name.clone(),
        percentage: pct,
      });
    }
  }

  let average_percentage = if with_data == 0 {
    0.0
  } else {
    percentage_sum / f64::from(with_data)
  };

  Ok(Analytics {
    best,
    worst,
    at_risk_count,
    average_percentage,
    total_safe_skips,
  })
}

// ─── Alerts ──────────────────────────────────────────────────────────────────

/// A low-attendance alert for the reminder collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
  pub subject_id: Uuid,
  pub name:       String,
  pub percentage: f64,
  pub level:      RiskLevel,
}

/// One alert per subject with data below the comfort margin: `Danger` below
/// the eligibility minimum, `Caution` otherwise.
pub fn attendance_alerts(subjects: &[Subject]) -> Result<Vec<Alert>> {
  let mut alerts = Vec::new();
  for subject in subjects {
    subject.check_invariants()?;
    if subject.total == 0 {
      continue;
    }
    let pct = percentage(subject.attended, subject.total);
    if pct >= SAFE_PERCENTAGE {
      continue;
    }
    let level = if pct < MIN_PERCENTAGE {
      RiskLevel::Danger
    } else {
      RiskLevel::Caution
    };
    alerts.push(Alert {
      subject_id: subject.subject_id,
      name: subject.name.clone(),
      percentage: pct,
      level,
    });
  }
  Ok(alerts)
}

/// Whole days since the last present mark; `None` when no class has been
/// attended yet. `now` is a parameter so the query stays deterministic.
pub fn days_since_last_attendance(
  subject: &Subject,
  now: DateTime<Utc>,
) -> Option<i64> {
  subject.last_attended_date.map(|last| (now - last).num_days())
}
