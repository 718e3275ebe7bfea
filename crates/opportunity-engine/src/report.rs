//! Markdown run report.
//!
//! Renders a completed run for humans: run metadata, the operable table
//! with entry bands and sizing, and the per-symbol reason summaries.

use chrono::{DateTime, Utc};

use advisor_core::{OpportunityCandidate, RunConfig};

use crate::builder::top_operable;

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

/// Render a run and its candidate list as a Markdown report
pub fn report_markdown(
    created_at_utc: DateTime<Utc>,
    config: &RunConfig,
    candidates: &[OpportunityCandidate],
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Portfolio Opportunities".to_string());
    lines.push(String::new());
    lines.push(format!("- `created_at_utc`: {}", created_at_utc.to_rfc3339()));
    lines.push(format!("- `as_of`: {}", config.as_of));
    lines.push(format!("- `mode`: {}", config.mode.as_str()));
    lines.push(format!("- `budget_ars`: {:.2}", config.budget_ars));
    lines.push(format!("- `universe`: {}", config.universe));
    lines.push(String::new());
    lines.push("## Top operable candidates".to_string());

    let top = top_operable(candidates, config.top_n);
    if top.is_empty() {
        lines.push("- No operable candidates for this run.".to_string());
        return lines.join("\n") + "\n";
    }

    lines.push(String::new());
    lines.push("| Symbol | Type | Score | Entry Low | Entry High | Weight % | Amount ARS |".to_string());
    lines.push("|---|---:|---:|---:|---:|---:|---:|".to_string());
    for c in &top {
        lines.push(format!(
            "| {} | {} | {:.2} | {} | {} | {} | {} |",
            c.symbol,
            c.candidate_type.as_str(),
            c.score_total,
            fmt_opt(c.entry_low),
            fmt_opt(c.entry_high),
            fmt_opt(c.suggested_weight_pct),
            fmt_opt(c.suggested_amount_ars),
        ));
    }
    lines.push(String::new());
    lines.push("## Reasons and risks".to_string());
    for c in &top {
        lines.push(format!("- **{}**: {}", c.symbol, c.reason_summary));
    }
    lines.push(String::new());
    lines.push(
        "Note: this does not place real orders; simulate and confirm explicitly.".to_string(),
    );
    lines.join("\n") + "\n"
}
