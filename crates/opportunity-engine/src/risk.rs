//! Per-candidate risk rules.
//!
//! Each rule either hard-fails the candidate (excluding it from sizing) or
//! adds a soft penalty to the risk score. Rules accumulate into a
//! `RiskAssessment` so each contribution stays independently testable.

use advisor_core::num::compute_spread_pct;
use advisor_core::{MarketMetricRecord, RiskFlag, RiskThresholds};

use crate::evidence::EvidenceStats;

const PENALTY_WIDE_SPREAD: f64 = 10.0;
const PENALTY_THIN_OPS: f64 = 10.0;
const PENALTY_UNKNOWN_LIQUIDITY: f64 = 20.0;
const PENALTY_HIGH_CONCENTRATION: f64 = 15.0;
const PENALTY_DEEP_DRAWDOWN: f64 = 10.0;
const PENALTY_EVIDENCE_CONFLICT: f64 = 10.0;

/// Accumulated outcome of the risk rules for one candidate
#[derive(Debug, Clone, Default)]
pub struct RiskAssessment {
    penalty: f64,
    flags: Vec<RiskFlag>,
    hard_fail: bool,
}

impl RiskAssessment {
    /// Run every rule against one candidate's inputs
    pub fn assess(
        metrics: &MarketMetricRecord,
        current_weight_pct: f64,
        drawdown: Option<f64>,
        evidence: &EvidenceStats,
        thresholds: &RiskThresholds,
    ) -> Self {
        let mut a = Self::default();
        a.check_liquidity(metrics, thresholds);
        a.check_concentration(current_weight_pct, thresholds);
        a.check_drawdown(drawdown, evidence, thresholds);
        a.check_evidence_conflict(evidence);
        a
    }

    /// Liquidity: spread when both sides of the book exist, operation count
    /// as a fallback, a flat penalty when neither is known.
    fn check_liquidity(&mut self, metrics: &MarketMetricRecord, thresholds: &RiskThresholds) {
        let bid = metrics.bid.filter(|v| *v > 0.0);
        let ask = metrics.ask.filter(|v| *v > 0.0);
        if bid.is_some() && ask.is_some() {
            let spread = metrics.spread_pct.or_else(|| compute_spread_pct(bid, ask));
            if let Some(spread) = spread {
                if spread > thresholds.spread_pct_max {
                    self.hard_fail(RiskFlag::LiquiditySpread);
                } else if spread > thresholds.spread_pct_warn {
                    self.penalty += PENALTY_WIDE_SPREAD;
                }
            }
        } else if let Some(ops) = metrics.operations_count {
            if ops <= 0.0 {
                self.hard_fail(RiskFlag::LiquidityNoOps);
            } else if ops < thresholds.min_operations {
                self.penalty += PENALTY_THIN_OPS;
            }
        } else {
            self.flags.push(RiskFlag::LiquidityUnknown);
            self.penalty += PENALTY_UNKNOWN_LIQUIDITY;
        }
    }

    fn check_concentration(&mut self, current_weight_pct: f64, thresholds: &RiskThresholds) {
        if current_weight_pct >= thresholds.concentration_pct_max {
            self.hard_fail(RiskFlag::ConcentrationMax);
        } else if current_weight_pct > thresholds.concentration_pct_warn {
            self.penalty += PENALTY_HIGH_CONCENTRATION;
        }
    }

    /// Extreme drawdown excludes the candidate unless a recent catalyst
    /// argues the drop is news-driven; any drawdown past the warn level that
    /// survived exclusion still takes a soft penalty.
    fn check_drawdown(
        &mut self,
        drawdown: Option<f64>,
        evidence: &EvidenceStats,
        thresholds: &RiskThresholds,
    ) {
        let Some(dd) = drawdown else { return };
        if dd < thresholds.drawdown_exclusion_pct && !evidence.has_recent_catalyst {
            self.hard_fail(RiskFlag::DrawdownExtreme);
        } else if dd < thresholds.drawdown_warn_pct {
            self.penalty += PENALTY_DEEP_DRAWDOWN;
        }
    }

    fn check_evidence_conflict(&mut self, evidence: &EvidenceStats) {
        if evidence.unresolved_conflict {
            self.flags.push(RiskFlag::EvidenceConflict);
            self.penalty += PENALTY_EVIDENCE_CONFLICT;
        }
    }

    fn hard_fail(&mut self, flag: RiskFlag) {
        self.hard_fail = true;
        self.flags.push(flag);
    }

    /// True when no hard filter fired
    pub fn passed(&self) -> bool {
        !self.hard_fail
    }

    pub fn risk_score(&self) -> f64 {
        (100.0 - self.penalty).clamp(0.0, 100.0)
    }

    pub fn flags(&self) -> &[RiskFlag] {
        &self.flags
    }

    pub fn into_flags(self) -> Vec<RiskFlag> {
        self.flags
    }
}
