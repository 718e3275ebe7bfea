//! Candidate construction, selection, and sizing.

use std::collections::HashMap;

use anyhow::Result;

use advisor_core::{
    AdvisorError, CandidateKind, EvidenceItem, MarketMetricRecord, OpportunityCandidate,
    PricePoint, RiskThresholds, RunConfig, ScoreWeights,
};

use crate::allocator::allocate_with_caps;
use crate::evidence::evidence_stats;
use crate::risk::RiskAssessment;
use crate::scoring::{drawdown_pct, momentum_score, value_score};

/// Minimum total score for the primary operable selection
const OPERABLE_SCORE_FLOOR: f64 = 50.0;

/// Frozen per-run inputs, already fetched and consistent for the as-of date
#[derive(Debug, Clone, Default)]
pub struct EngineInputs {
    /// Total portfolio market value in ARS
    pub portfolio_total_ars: f64,
    /// Current market value held per symbol, in ARS
    pub holdings_value_by_symbol: HashMap<String, f64>,
    /// Freshest metrics record per symbol (see market-universe selectors)
    pub latest_metrics: HashMap<String, MarketMetricRecord>,
    /// Chronological price series per symbol
    pub series_by_symbol: HashMap<String, Vec<PricePoint>>,
    /// Evidence items per symbol
    pub evidence_by_symbol: HashMap<String, Vec<EvidenceItem>>,
}

/// Scores, filters, and sizes opportunity candidates for a run
#[derive(Debug, Clone)]
pub struct OpportunityEngine {
    weights: ScoreWeights,
    thresholds: RiskThresholds,
}

impl Default for OpportunityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OpportunityEngine {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
            thresholds: RiskThresholds::default(),
        }
    }

    pub fn with_config(weights: ScoreWeights, thresholds: RiskThresholds) -> Self {
        Self { weights, thresholds }
    }

    /// Build the full candidate list for a run: score every eligible symbol,
    /// apply hard/soft risk rules, then size the operable subset against the
    /// budget. The returned list is sorted by total score descending
    /// (symbol ascending on ties) and includes hard-filtered entries.
    pub fn build_candidates(
        &self,
        config: &RunConfig,
        inputs: &EngineInputs,
    ) -> Result<Vec<OpportunityCandidate>> {
        config.validate()?;
        if inputs.latest_metrics.is_empty() {
            return Err(AdvisorError::NoMarketData { as_of: config.as_of }.into());
        }

        let mut symbols: Vec<&String> = inputs.latest_metrics.keys().collect();
        symbols.sort();

        let mut out: Vec<OpportunityCandidate> = Vec::new();
        for symbol in symbols {
            let metrics = &inputs.latest_metrics[symbol];
            if let Some(candidate) = self.evaluate_symbol(symbol, metrics, config, inputs) {
                out.push(candidate);
            }
        }

        out.sort_by(|a, b| {
            b.score_total
                .partial_cmp(&a.score_total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        self.size_selected(&mut out, config, inputs);

        tracing::info!(
            as_of = %config.as_of,
            mode = config.mode.as_str(),
            candidates = out.len(),
            operable = out.iter().filter(|c| c.filters_passed).count(),
            "opportunity run complete"
        );
        Ok(out)
    }

    /// Score one symbol; None when the mode or the rebuy gate excludes it
    fn evaluate_symbol(
        &self,
        symbol: &str,
        metrics: &MarketMetricRecord,
        config: &RunConfig,
        inputs: &EngineInputs,
    ) -> Option<OpportunityCandidate> {
        let held_value = inputs
            .holdings_value_by_symbol
            .get(symbol)
            .copied()
            .unwrap_or(0.0);
        let in_portfolio = held_value > 0.0;

        let kind = if in_portfolio {
            config.mode.allows_rebuy().then_some(CandidateKind::Rebuy)
        } else {
            config.mode.allows_new().then_some(CandidateKind::New)
        }?;

        let series = inputs
            .series_by_symbol
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let evidence = inputs
            .evidence_by_symbol
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let stats = evidence_stats(evidence, config.as_of);
        let dd = drawdown_pct(series);
        let score_value = value_score(series);
        let score_momentum = momentum_score(series, config.as_of);

        let current_weight_pct = if inputs.portfolio_total_ars > 0.0 {
            held_value / inputs.portfolio_total_ars * 100.0
        } else {
            0.0
        };

        // Rebuy = buy the dip, with a standing thesis and no open conflict.
        // New candidates always stay visible, possibly hard-filtered.
        if kind == CandidateKind::Rebuy {
            let dip_ok = dd.map(|d| d <= self.thresholds.rebuy_dip_threshold_pct) == Some(true);
            let thesis_ok = stats.has_thesis && !stats.unresolved_conflict;
            if !dip_ok || !thesis_ok {
                tracing::debug!(symbol, "rebuy gate excluded symbol");
                return None;
            }
        }

        let assessment =
            RiskAssessment::assess(metrics, current_weight_pct, dd, &stats, &self.thresholds);
        let score_risk = assessment.risk_score();
        let score_total = self.weights.risk * score_risk
            + self.weights.value * score_value
            + self.weights.momentum * score_momentum
            + self.weights.catalyst * stats.catalyst_score;

        let (entry_low, entry_high) = entry_band(metrics);
        let reason_summary = reason_summary(
            kind,
            dd,
            score_risk,
            score_value,
            score_momentum,
            stats.catalyst_score,
            &assessment,
        );

        Some(OpportunityCandidate {
            symbol: symbol.to_string(),
            candidate_type: kind,
            score_total,
            score_risk,
            score_value,
            score_momentum,
            score_catalyst: stats.catalyst_score,
            entry_low,
            entry_high,
            suggested_weight_pct: None,
            suggested_amount_ars: None,
            reason_summary,
            filters_passed: assessment.passed(),
            risk_flags: assessment.into_flags(),
            current_weight_pct,
        })
    }

    /// Select the operable subset and attach sizing fields to it.
    ///
    /// Primary selection takes hard-filter passers at or above the score
    /// floor; when that is empty every passer qualifies. The selection is
    /// truncated to top-N before sizing.
    fn size_selected(
        &self,
        candidates: &mut [OpportunityCandidate],
        config: &RunConfig,
        inputs: &EngineInputs,
    ) {
        let mut selected: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.filters_passed && c.score_total >= OPERABLE_SCORE_FLOOR)
            .map(|(i, _)| i)
            .collect();
        if selected.is_empty() {
            selected = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| c.filters_passed)
                .map(|(i, _)| i)
                .collect();
        }
        selected.truncate(config.top_n);
        if selected.is_empty() {
            return;
        }

        let mut multipliers: HashMap<String, f64> = HashMap::new();
        let mut caps: HashMap<String, f64> = HashMap::new();
        for &i in &selected {
            let c = &candidates[i];
            multipliers.insert(c.symbol.clone(), tier_multiplier(c.score_total));
            caps.insert(c.symbol.clone(), self.weight_cap(c, config, inputs));
        }

        let alloc = allocate_with_caps(&multipliers, &caps);
        for &i in &selected {
            let c = &mut candidates[i];
            if let Some(w) = alloc.get(&c.symbol) {
                c.suggested_weight_pct = Some(*w);
                c.suggested_amount_ars = Some(config.budget_ars * *w / 100.0);
            }
        }
    }

    /// Per-symbol cap in the allocator's 100-point weight space.
    ///
    /// Derived from the additional portfolio exposure the symbol may take
    /// (concentration limit minus current weight, further capped for new
    /// assets), converted from portfolio space to budget space.
    fn weight_cap(
        &self,
        candidate: &OpportunityCandidate,
        config: &RunConfig,
        inputs: &EngineInputs,
    ) -> f64 {
        let mut max_additional_pct =
            (self.thresholds.concentration_pct_max - candidate.current_weight_pct).max(0.0);
        if candidate.candidate_type == CandidateKind::New {
            max_additional_pct = max_additional_pct.min(self.thresholds.new_asset_initial_cap_pct);
        }
        if config.budget_ars <= 0.0 || inputs.portfolio_total_ars <= 0.0 {
            return 0.0;
        }
        let max_amount = inputs.portfolio_total_ars * max_additional_pct / 100.0;
        (max_amount / config.budget_ars * 100.0).clamp(0.0, 100.0)
    }
}

/// Size multiplier by score tier; sub-floor candidates stay listed with
/// zero weight
fn tier_multiplier(score_total: f64) -> f64 {
    if score_total >= 80.0 {
        1.5
    } else if score_total >= 65.0 {
        1.0
    } else if score_total >= OPERABLE_SCORE_FLOOR {
        0.5
    } else {
        0.0
    }
}

/// Suggested entry price band: around the book when available, around the
/// last trade otherwise
fn entry_band(metrics: &MarketMetricRecord) -> (Option<f64>, Option<f64>) {
    let bid = metrics.bid.filter(|v| *v > 0.0);
    let ask = metrics.ask.filter(|v| *v > 0.0);
    if let (Some(bid), Some(ask)) = (bid, ask) {
        let mid = (bid + ask) / 2.0;
        return (Some(mid * 0.99), Some(ask * 1.01));
    }
    if let Some(last) = metrics.last_price.filter(|v| *v > 0.0) {
        return (Some(last * 0.99), Some(last * 1.01));
    }
    (None, None)
}

fn reason_summary(
    kind: CandidateKind,
    dd: Option<f64>,
    risk: f64,
    value: f64,
    momentum: f64,
    catalyst: f64,
    assessment: &RiskAssessment,
) -> String {
    let dd_part = dd
        .map(|d| format!("dd20={d:.2}%"))
        .unwrap_or_else(|| "dd20=NA".to_string());
    let mut reason = format!(
        "{} | {} | risk={:.1} value={:.1} momentum={:.1} catalyst={:.1}",
        kind.as_str(),
        dd_part,
        risk,
        value,
        momentum,
        catalyst
    );
    if !assessment.flags().is_empty() {
        let flags: Vec<&str> = assessment.flags().iter().map(|f| f.as_str()).collect();
        reason.push_str(&format!(" | flags={}", flags.join(",")));
    }
    reason
}

/// The size-bounded display subset: hard-filter passers in score order
pub fn top_operable(candidates: &[OpportunityCandidate], top_n: usize) -> Vec<OpportunityCandidate> {
    candidates
        .iter()
        .filter(|c| c.filters_passed)
        .take(top_n)
        .cloned()
        .collect()
}
