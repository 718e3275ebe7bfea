//! Price-based factor scorers.
//!
//! All scorers are pure functions over a chronologically sorted price
//! series. Missing data degrades to neutral (50) or None, never to an
//! error; drawdown is the only scorer allowed to report "no data".

use chrono::{Duration, NaiveDate};

use advisor_core::PricePoint;

/// Lookback window for the drawdown measure
const DRAWDOWN_WINDOW: usize = 20;
/// Lookback window for the value (mean-reversion) measure
const VALUE_WINDOW: usize = 28;

fn last_n(series: &[PricePoint], n: usize) -> &[PricePoint] {
    let start = series.len().saturating_sub(n);
    &series[start..]
}

/// Most recent price on or before `target`, relying on ascending date order
pub fn price_on_or_before(series: &[PricePoint], target: NaiveDate) -> Option<f64> {
    let mut out = None;
    for p in series {
        if p.date <= target {
            out = Some(p.price);
        } else {
            break;
        }
    }
    out
}

/// Current price vs. the 20-point window maximum, in percent.
///
/// Negative when the symbol trades below its recent high; None on an empty
/// series.
pub fn drawdown_pct(series: &[PricePoint]) -> Option<f64> {
    let window = last_n(series, DRAWDOWN_WINDOW);
    let cur = window.last()?.price;
    let max = window.iter().map(|p| p.price).fold(f64::MIN, f64::max);
    if max <= 0.0 {
        return None;
    }
    Some((cur / max - 1.0) * 100.0)
}

/// Deviation of the current price from the 28-point mean, mapped so that
/// trading below the recent average scores above 50. Neutral 50 without data.
pub fn value_score(series: &[PricePoint]) -> f64 {
    let window = last_n(series, VALUE_WINDOW);
    if window.is_empty() {
        return 50.0;
    }
    let cur = window[window.len() - 1].price;
    let mean = window.iter().map(|p| p.price).sum::<f64>() / window.len() as f64;
    if mean <= 0.0 {
        return 50.0;
    }
    let dev = (cur / mean - 1.0) * 100.0;
    // Cheaper vs recent mean -> higher score.
    (50.0 - dev * 2.0).clamp(0.0, 100.0)
}

/// 7- and 28-day return blend mapped onto [0, 100]. Neutral 50 when no
/// current price exists; a missing lookback price contributes zero return.
pub fn momentum_score(series: &[PricePoint], as_of: NaiveDate) -> f64 {
    let Some(p_now) = price_on_or_before(series, as_of).filter(|p| *p > 0.0) else {
        return 50.0;
    };
    let r7 = price_on_or_before(series, as_of - Duration::days(7))
        .filter(|p| *p > 0.0)
        .map(|p| (p_now / p - 1.0) * 100.0)
        .unwrap_or(0.0);
    let r28 = price_on_or_before(series, as_of - Duration::days(28))
        .filter(|p| *p > 0.0)
        .map(|p| (p_now / p - 1.0) * 100.0)
        .unwrap_or(0.0);
    (50.0 + r7 * 2.0 + r28 * 1.0).clamp(0.0, 100.0)
}
