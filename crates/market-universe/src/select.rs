//! Per-symbol snapshot selection.

use std::collections::HashMap;

use chrono::NaiveDate;

use advisor_core::{MarketMetricRecord, MetricSource, PricePoint};

/// Pick the freshest metrics record per symbol as of `as_of`.
///
/// Latest date wins; on a date tie a quote pull beats a panel pull (quotes
/// are considered more authoritative).
pub fn latest_metrics_by_symbol(
    rows: &[MarketMetricRecord],
    as_of: NaiveDate,
) -> HashMap<String, MarketMetricRecord> {
    let mut by_symbol: HashMap<String, MarketMetricRecord> = HashMap::new();
    for r in rows {
        if r.symbol.is_empty() || r.snapshot_date > as_of {
            continue;
        }
        match by_symbol.get(&r.symbol) {
            None => {
                by_symbol.insert(r.symbol.clone(), r.clone());
            }
            Some(cur) => {
                if r.snapshot_date > cur.snapshot_date
                    || (r.snapshot_date == cur.snapshot_date
                        && r.source == MetricSource::Quote
                        && cur.source != MetricSource::Quote)
                {
                    by_symbol.insert(r.symbol.clone(), r.clone());
                }
            }
        }
    }
    by_symbol
}

/// Build a chronological price series per symbol from snapshot rows.
///
/// Rows after `as_of` or without a positive last price are dropped. Rows are
/// not deduplicated by source; callers store one canonical row per
/// (symbol, date, source).
pub fn price_series_by_symbol(
    rows: &[MarketMetricRecord],
    as_of: NaiveDate,
) -> HashMap<String, Vec<PricePoint>> {
    let mut by_symbol: HashMap<String, Vec<PricePoint>> = HashMap::new();
    for r in rows {
        if r.symbol.is_empty() || r.snapshot_date > as_of {
            continue;
        }
        let Some(price) = r.last_price.filter(|p| *p > 0.0) else {
            continue;
        };
        by_symbol.entry(r.symbol.clone()).or_default().push(PricePoint {
            date: r.snapshot_date,
            price,
        });
    }
    for series in by_symbol.values_mut() {
        series.sort_by_key(|p| p.date);
    }
    by_symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn row(
        symbol: &str,
        date: NaiveDate,
        price: Option<f64>,
        source: MetricSource,
    ) -> MarketMetricRecord {
        MarketMetricRecord {
            snapshot_date: date,
            symbol: symbol.to_string(),
            market: "bcba".to_string(),
            last_price: price,
            bid: None,
            ask: None,
            spread_pct: None,
            daily_var_pct: None,
            operations_count: None,
            volume_amount: None,
            source,
        }
    }

    #[test]
    fn test_latest_prefers_newest_date() {
        let rows = vec![
            row("SPY", d(8), Some(98.0), MetricSource::Panel),
            row("SPY", d(9), Some(99.0), MetricSource::Panel),
        ];
        let latest = latest_metrics_by_symbol(&rows, d(10));
        assert_eq!(latest["SPY"].snapshot_date, d(9));
    }

    #[test]
    fn test_latest_prefers_quote_on_date_tie() {
        let rows = vec![
            row("SPY", d(9), Some(99.0), MetricSource::Panel),
            row("SPY", d(9), Some(99.5), MetricSource::Quote),
            row("SPY", d(9), Some(99.2), MetricSource::Panel),
        ];
        let latest = latest_metrics_by_symbol(&rows, d(10));
        assert_eq!(latest["SPY"].source, MetricSource::Quote);
        assert_eq!(latest["SPY"].last_price, Some(99.5));
    }

    #[test]
    fn test_latest_excludes_future_rows() {
        let rows = vec![row("SPY", d(12), Some(99.0), MetricSource::Quote)];
        let latest = latest_metrics_by_symbol(&rows, d(10));
        assert!(latest.is_empty());
    }

    #[test]
    fn test_series_sorted_and_filtered() {
        let rows = vec![
            row("SPY", d(9), Some(99.0), MetricSource::Quote),
            row("SPY", d(7), Some(97.0), MetricSource::Quote),
            row("SPY", d(8), Some(-1.0), MetricSource::Quote),
            row("SPY", d(8), None, MetricSource::Quote),
            row("SPY", d(12), Some(120.0), MetricSource::Quote),
            row("ACWI", d(9), Some(50.0), MetricSource::Panel),
        ];
        let series = price_series_by_symbol(&rows, d(10));
        let spy: Vec<f64> = series["SPY"].iter().map(|p| p.price).collect();
        assert_eq!(spy, vec![97.0, 99.0]);
        assert_eq!(series["ACWI"].len(), 1);
    }

    #[test]
    fn test_series_keeps_duplicate_dates() {
        let rows = vec![
            row("SPY", d(9), Some(99.0), MetricSource::Panel),
            row("SPY", d(9), Some(99.5), MetricSource::Quote),
        ];
        let series = price_series_by_symbol(&rows, d(10));
        assert_eq!(series["SPY"].len(), 2);
    }
}
