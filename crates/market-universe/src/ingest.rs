//! Brokerage payload ingestion.
//!
//! The IOL API returns loosely-typed JSON: panels under `titulos`, top of
//! book under `puntas`, and numeric fields that may arrive as strings or be
//! absent entirely. Coercion into `MarketMetricRecord` happens here once;
//! fields that fail to coerce become None and stay None downstream.

use chrono::NaiveDate;
use serde_json::Value;

use advisor_core::num::{coerce_f64_opt, compute_spread_pct};
use advisor_core::{MarketMetricRecord, MetricSource};

/// Extract the row list from a panel payload (`titulos` or `items`, or a
/// bare array)
pub fn panel_rows(payload: &Value) -> Vec<&Value> {
    let rows = match payload {
        Value::Array(rows) => Some(rows),
        Value::Object(map) => map
            .get("titulos")
            .or_else(|| map.get("items"))
            .and_then(Value::as_array),
        _ => None,
    };
    rows.map(|rows| rows.iter().filter(|r| r.is_object()).collect())
        .unwrap_or_default()
}

/// Top-of-book bid/ask from the `puntas` array (first level only)
fn bid_ask_from_puntas(puntas: Option<&Value>) -> (Option<f64>, Option<f64>) {
    let Some(p0) = puntas.and_then(Value::as_array).and_then(|p| p.first()) else {
        return (None, None);
    };
    let bid = coerce_f64_opt(p0.get("precioCompra"));
    let ask = coerce_f64_opt(p0.get("precioVenta"));
    (bid, ask)
}

fn first_coercible(row: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = coerce_f64_opt(row.get(*key)) {
            return Some(v);
        }
        if row.get(*key).map(|v| !v.is_null()).unwrap_or(false) {
            tracing::debug!(field = *key, "unparsable numeric field in quote row");
        }
    }
    None
}

fn record_from_row(
    snapshot_date: NaiveDate,
    symbol: String,
    row: &Value,
    market: &str,
    source: MetricSource,
) -> MarketMetricRecord {
    let (bid, ask) = bid_ask_from_puntas(row.get("puntas"));
    let last_price = first_coercible(row, &["ultimoPrecio"]);
    let daily_var_pct = first_coercible(row, &["variacionPorcentual", "variacionDiaria"]);
    let operations_count = first_coercible(row, &["cantidadOperaciones"]);
    let volume_amount =
        first_coercible(row, &["volumenOperado", "montoOperado", "volumenNominal"]);
    MarketMetricRecord {
        snapshot_date,
        symbol,
        market: market.to_string(),
        last_price,
        bid,
        ask,
        spread_pct: compute_spread_pct(bid, ask),
        daily_var_pct,
        operations_count,
        volume_amount,
        source,
    }
}

/// Build a snapshot record from an individual quote payload
pub fn record_from_quote(
    snapshot_date: NaiveDate,
    symbol: &str,
    quote: &Value,
    market: &str,
) -> MarketMetricRecord {
    record_from_row(
        snapshot_date,
        symbol.to_string(),
        quote,
        market,
        MetricSource::Quote,
    )
}

/// Build a snapshot record from one panel row; None when the row carries no
/// symbol
pub fn record_from_panel(
    snapshot_date: NaiveDate,
    row: &Value,
    market: &str,
) -> Option<MarketMetricRecord> {
    let symbol = row
        .get("simbolo")
        .or_else(|| row.get("symbol"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    Some(record_from_row(
        snapshot_date,
        symbol.to_string(),
        row,
        market,
        MetricSource::Panel,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_record_from_quote() {
        let quote = json!({
            "ultimoPrecio": 100.0,
            "puntas": [{"precioCompra": 99.0, "precioVenta": 101.0}],
            "variacionPorcentual": 0.5,
            "cantidadOperaciones": 20,
            "volumenOperado": 100000.0,
        });
        let rec = record_from_quote(day(), "SPY", &quote, "bcba");
        assert_eq!(rec.symbol, "SPY");
        assert_eq!(rec.source, MetricSource::Quote);
        assert_eq!(rec.last_price, Some(100.0));
        assert_eq!(rec.bid, Some(99.0));
        assert_eq!(rec.ask, Some(101.0));
        assert!((rec.spread_pct.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(rec.operations_count, Some(20.0));
    }

    #[test]
    fn test_record_from_quote_missing_fields_default_to_none() {
        let quote = json!({
            "ultimoPrecio": "n/a",
            "variacionDiaria": "1.25",
        });
        let rec = record_from_quote(day(), "ACWI", &quote, "bcba");
        assert_eq!(rec.last_price, None);
        assert_eq!(rec.bid, None);
        assert_eq!(rec.spread_pct, None);
        // fallback key, numeric string
        assert_eq!(rec.daily_var_pct, Some(1.25));
        assert_eq!(rec.volume_amount, None);
    }

    #[test]
    fn test_volume_fallback_chain() {
        let quote = json!({"montoOperado": 5000.0});
        let rec = record_from_quote(day(), "SPY", &quote, "bcba");
        assert_eq!(rec.volume_amount, Some(5000.0));

        let quote = json!({"volumenNominal": 123.0});
        let rec = record_from_quote(day(), "SPY", &quote, "bcba");
        assert_eq!(rec.volume_amount, Some(123.0));
    }

    #[test]
    fn test_panel_rows_shapes() {
        let wrapped = json!({"titulos": [{"simbolo": "SPY"}, {"simbolo": "ACWI"}]});
        assert_eq!(panel_rows(&wrapped).len(), 2);

        let items = json!({"items": [{"simbolo": "SPY"}]});
        assert_eq!(panel_rows(&items).len(), 1);

        let bare = json!([{"simbolo": "SPY"}, "not-a-row"]);
        assert_eq!(panel_rows(&bare).len(), 1);

        assert!(panel_rows(&json!("nope")).is_empty());
    }

    #[test]
    fn test_record_from_panel_requires_symbol() {
        let row = json!({
            "simbolo": "SPY",
            "ultimoPrecio": 100.0,
            "puntas": [{"precioCompra": 99.0, "precioVenta": 101.0}],
        });
        let rec = record_from_panel(day(), &row, "bcba").unwrap();
        assert_eq!(rec.symbol, "SPY");
        assert_eq!(rec.source, MetricSource::Panel);

        assert!(record_from_panel(day(), &json!({"simbolo": "  "}), "bcba").is_none());
        assert!(record_from_panel(day(), &json!({"ultimoPrecio": 1.0}), "bcba").is_none());
    }
}
