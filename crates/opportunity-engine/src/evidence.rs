//! Evidence aggregation into a catalyst score.
//!
//! Confidence-tagged claims are weighted by recency of retrieval: full
//! weight inside 14 days, half weight inside 45. Contradictory claims that
//! share a conflict key knock the score down and mark the conflict as
//! unresolved for the rebuy gate.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use advisor_core::{Confidence, EvidenceItem};

/// How far back evidence counts at all
const EVIDENCE_WINDOW_DAYS: i64 = 45;
/// Full-weight recency window; also defines "recent catalyst"
const RECENT_WINDOW_DAYS: i64 = 14;
/// Scale from recency-weighted confidence points to the [0, 100] score
const CATALYST_SCALE: f64 = 15.0;
/// Penalty applied once when any conflict group is unresolved
const CONFLICT_PENALTY: f64 = 30.0;

/// Aggregated evidence signals for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceStats {
    pub catalyst_score: f64,
    /// At least one medium/high-confidence claim in the 45-day window
    pub has_thesis: bool,
    /// At least one medium/high-confidence claim in the 14-day window
    pub has_recent_catalyst: bool,
    /// Contradictory claims share a conflict key in the 45-day window
    pub unresolved_conflict: bool,
}

impl Default for EvidenceStats {
    fn default() -> Self {
        Self {
            catalyst_score: 0.0,
            has_thesis: false,
            has_recent_catalyst: false,
            unresolved_conflict: false,
        }
    }
}

/// Aggregate evidence items for a symbol as of a date.
///
/// Future-dated retrievals are ignored entirely.
pub fn evidence_stats(items: &[EvidenceItem], as_of: NaiveDate) -> EvidenceStats {
    let mut catalyst_raw = 0.0;
    let mut has_thesis = false;
    let mut has_recent_catalyst = false;
    let mut claims_by_key: HashMap<&str, HashSet<&str>> = HashMap::new();

    for item in items {
        let retrieved = item.retrieved_at_utc.date_naive();
        let age_days = (as_of - retrieved).num_days();
        if age_days < 0 || age_days > EVIDENCE_WINDOW_DAYS {
            continue;
        }
        let points = item.confidence.points();
        if points >= Confidence::Medium.points() {
            has_thesis = true;
        }
        let recency_weight = if age_days <= RECENT_WINDOW_DAYS { 1.0 } else { 0.5 };
        catalyst_raw += f64::from(points) * recency_weight;

        if age_days <= RECENT_WINDOW_DAYS && points >= Confidence::Medium.points() {
            has_recent_catalyst = true;
        }

        if let Some(key) = item.conflict_key.as_deref().map(str::trim) {
            let claim = item.claim.trim();
            if !key.is_empty() && !claim.is_empty() {
                claims_by_key.entry(key).or_default().insert(claim);
            }
        }
    }

    let mut catalyst_score = (catalyst_raw * CATALYST_SCALE).clamp(0.0, 100.0);
    let unresolved_conflict = claims_by_key.values().any(|claims| claims.len() > 1);
    if unresolved_conflict {
        catalyst_score = (catalyst_score - CONFLICT_PENALTY).clamp(0.0, 100.0);
    }

    EvidenceStats {
        catalyst_score,
        has_thesis,
        has_recent_catalyst,
        unresolved_conflict,
    }
}
