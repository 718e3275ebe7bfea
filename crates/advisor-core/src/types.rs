//! Advisor Data Models
//!
//! Typed records for market snapshots, evidence, run configuration, and the
//! opportunity candidates the engine produces. Raw brokerage payloads are
//! coerced into these structures once, at the ingest boundary; everything
//! downstream works with named optional fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Where a market snapshot row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSource {
    /// Individual quote pull for a single symbol
    Quote,
    /// Batch panel pull covering the whole universe
    Panel,
}

impl MetricSource {
    pub fn as_str(&self) -> &str {
        match self {
            MetricSource::Quote => "quote",
            MetricSource::Panel => "panel_quotes",
        }
    }
}

/// One market snapshot row for a symbol on an observation date.
///
/// Immutable once recorded; the same symbol/date pair may exist twice when
/// both a quote pull and a panel pull ran that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetricRecord {
    pub snapshot_date: NaiveDate,
    pub symbol: String,
    pub market: String,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub spread_pct: Option<f64>,
    pub daily_var_pct: Option<f64>,
    pub operations_count: Option<f64>,
    pub volume_amount: Option<f64>,
    pub source: MetricSource,
}

/// One point of a per-symbol price series (strictly positive price)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Confidence level attached to an evidence claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Unknown,
}

impl Confidence {
    /// Points used by the catalyst score
    pub fn points(&self) -> i32 {
        match self {
            Confidence::High => 3,
            Confidence::Medium => 2,
            Confidence::Low => 1,
            Confidence::Unknown => 0,
        }
    }

    /// Lenient parse; anything unrecognized maps to Unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            "low" => Confidence::Low,
            _ => Confidence::Unknown,
        }
    }
}

/// A confidence-tagged qualitative claim about a symbol.
///
/// The engine aggregates these; it never validates their truthfulness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub symbol: String,
    pub query: String,
    pub source_name: String,
    pub source_url: String,
    pub published_date: Option<NaiveDate>,
    pub retrieved_at_utc: DateTime<Utc>,
    pub claim: String,
    pub confidence: Confidence,
    pub date_confidence: Confidence,
    pub notes: Option<String>,
    /// Grouping token for contradiction detection; empty = not comparable
    pub conflict_key: Option<String>,
}

/// Candidate membership: a fresh entry or an add-on to a held position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    New,
    Rebuy,
}

impl CandidateKind {
    pub fn as_str(&self) -> &str {
        match self {
            CandidateKind::New => "new",
            CandidateKind::Rebuy => "rebuy",
        }
    }
}

/// Risk rule outcome tokens, serialized into candidate rows for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskFlag {
    #[serde(rename = "LIQUIDITY_SPREAD")]
    LiquiditySpread,
    #[serde(rename = "LIQUIDITY_NO_OPS")]
    LiquidityNoOps,
    #[serde(rename = "LIQUIDITY_UNKNOWN")]
    LiquidityUnknown,
    #[serde(rename = "CONCENTRATION_MAX")]
    ConcentrationMax,
    #[serde(rename = "DRAWDOWN_EXTREME")]
    DrawdownExtreme,
    #[serde(rename = "EVIDENCE_CONFLICT")]
    EvidenceConflict,
}

impl RiskFlag {
    pub fn as_str(&self) -> &str {
        match self {
            RiskFlag::LiquiditySpread => "LIQUIDITY_SPREAD",
            RiskFlag::LiquidityNoOps => "LIQUIDITY_NO_OPS",
            RiskFlag::LiquidityUnknown => "LIQUIDITY_UNKNOWN",
            RiskFlag::ConcentrationMax => "CONCENTRATION_MAX",
            RiskFlag::DrawdownExtreme => "DRAWDOWN_EXTREME",
            RiskFlag::EvidenceConflict => "EVIDENCE_CONFLICT",
        }
    }
}

/// One tradeable opportunity proposed by the engine for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityCandidate {
    pub symbol: String,
    pub candidate_type: CandidateKind,
    /// Weighted blend of the four component scores
    pub score_total: f64,
    pub score_risk: f64,
    pub score_value: f64,
    pub score_momentum: f64,
    pub score_catalyst: f64,
    pub entry_low: Option<f64>,
    pub entry_high: Option<f64>,
    /// Present only when the candidate was selected and sized
    pub suggested_weight_pct: Option<f64>,
    pub suggested_amount_ars: Option<f64>,
    /// Human-readable summary; not machine-parsed
    pub reason_summary: String,
    pub risk_flags: Vec<RiskFlag>,
    /// False when any hard filter fired
    pub filters_passed: bool,
    pub current_weight_pct: f64,
}

impl OpportunityCandidate {
    /// Risk flags as a JSON array string, for bulk insertion into a store
    pub fn risk_flags_json(&self) -> String {
        serde_json::to_string(&self.risk_flags).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Which side of the portfolio a run considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    New,
    Rebuy,
    Both,
}

impl RunMode {
    pub fn as_str(&self) -> &str {
        match self {
            RunMode::New => "new",
            RunMode::Rebuy => "rebuy",
            RunMode::Both => "both",
        }
    }

    pub fn allows_new(&self) -> bool {
        matches!(self, RunMode::New | RunMode::Both)
    }

    pub fn allows_rebuy(&self) -> bool {
        matches!(self, RunMode::Rebuy | RunMode::Both)
    }
}

/// Immutable parameter snapshot for a single engine run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub as_of: NaiveDate,
    pub mode: RunMode,
    /// Cash budget to distribute, in ARS
    pub budget_ars: f64,
    /// Size bound for the operable subset
    pub top_n: usize,
    pub universe: String,
}

impl RunConfig {
    /// Reject invalid parameters before the engine runs
    pub fn validate(&self) -> Result<(), AdvisorError> {
        if !(self.budget_ars > 0.0) {
            return Err(AdvisorError::InvalidParameter(format!(
                "budget_ars must be positive, got {}",
                self.budget_ars
            )));
        }
        if self.top_n == 0 {
            return Err(AdvisorError::InvalidParameter(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.universe.trim().is_empty() {
            return Err(AdvisorError::InvalidParameter(
                "universe must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Blend weights for the total score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub risk: f64,
    pub value: f64,
    pub momentum: f64,
    pub catalyst: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            risk: 0.35,
            value: 0.20,
            momentum: 0.35,
            catalyst: 0.10,
        }
    }
}

/// Hard/soft risk rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Spread above this hard-fails liquidity
    pub spread_pct_max: f64,
    /// Spread above this (up to the max) takes a soft penalty
    pub spread_pct_warn: f64,
    /// Operation counts below this take a soft penalty
    pub min_operations: f64,
    /// Portfolio weight at or above this hard-fails concentration
    pub concentration_pct_max: f64,
    /// Portfolio weight above this takes a soft penalty
    pub concentration_pct_warn: f64,
    /// Sizing cap for symbols not yet held
    pub new_asset_initial_cap_pct: f64,
    /// Drawdown below this hard-fails unless a recent catalyst exists
    pub drawdown_exclusion_pct: f64,
    /// Drawdown below this takes a soft penalty
    pub drawdown_warn_pct: f64,
    /// Rebuy candidates require a dip at least this deep
    pub rebuy_dip_threshold_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            spread_pct_max: 2.5,
            spread_pct_warn: 1.5,
            min_operations: 5.0,
            concentration_pct_max: 15.0,
            concentration_pct_warn: 12.0,
            new_asset_initial_cap_pct: 8.0,
            drawdown_exclusion_pct: -25.0,
            drawdown_warn_pct: -20.0,
            rebuy_dip_threshold_pct: -8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            as_of: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            mode: RunMode::Both,
            budget_ars: 100_000.0,
            top_n: 5,
            universe: "bcba_cedears".to_string(),
        }
    }

    #[test]
    fn test_confidence_points_and_parse() {
        assert_eq!(Confidence::parse("High").points(), 3);
        assert_eq!(Confidence::parse(" medium ").points(), 2);
        assert_eq!(Confidence::parse("low").points(), 1);
        assert_eq!(Confidence::parse("???").points(), 0);
    }

    #[test]
    fn test_run_config_validation() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.budget_ars = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.top_n = 0;
        assert!(bad.validate().is_err());

        let mut bad = config();
        bad.universe = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_risk_flags_json_round_trip() {
        let candidate = OpportunityCandidate {
            symbol: "SPY".to_string(),
            candidate_type: CandidateKind::New,
            score_total: 60.0,
            score_risk: 90.0,
            score_value: 50.0,
            score_momentum: 50.0,
            score_catalyst: 0.0,
            entry_low: None,
            entry_high: None,
            suggested_weight_pct: None,
            suggested_amount_ars: None,
            reason_summary: String::new(),
            risk_flags: vec![RiskFlag::LiquiditySpread, RiskFlag::EvidenceConflict],
            filters_passed: false,
            current_weight_pct: 0.0,
        };
        assert_eq!(
            candidate.risk_flags_json(),
            r#"["LIQUIDITY_SPREAD","EVIDENCE_CONFLICT"]"#
        );
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!((w.risk + w.value + w.momentum + w.catalyst - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_mode_membership() {
        assert!(RunMode::New.allows_new());
        assert!(!RunMode::New.allows_rebuy());
        assert!(RunMode::Rebuy.allows_rebuy());
        assert!(!RunMode::Rebuy.allows_new());
        assert!(RunMode::Both.allows_new() && RunMode::Both.allows_rebuy());
    }
}
