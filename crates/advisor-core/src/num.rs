//! Lenient numeric coercion.
//!
//! Brokerage payloads mix numbers, numeric strings, and nulls for the same
//! field. Every scorer treats a field that fails to coerce as absent, so the
//! try-parse-default-on-failure policy lives here and nowhere else.

use serde_json::Value;

/// Coerce a JSON value to f64, returning None for anything non-numeric
pub fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce an optional JSON field to f64
pub fn coerce_f64_opt(v: Option<&Value>) -> Option<f64> {
    v.and_then(coerce_f64)
}

/// Percentage bid/ask spread relative to mid; None when either side is
/// missing or non-positive
pub fn compute_spread_pct(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    let (bid, ask) = (bid?, ask?);
    if bid <= 0.0 || ask <= 0.0 {
        return None;
    }
    let mid = (bid + ask) / 2.0;
    if mid <= 0.0 {
        return None;
    }
    Some((ask - bid) / mid * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_f64_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_f64(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_f64(&json!(7)), Some(7.0));
        assert_eq!(coerce_f64(&json!("3.25")), Some(3.25));
        assert_eq!(coerce_f64(&json!(" 10 ")), Some(10.0));
    }

    #[test]
    fn test_coerce_f64_defaults_bad_input_to_none() {
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!("n/a")), None);
        assert_eq!(coerce_f64(&json!([1.0])), None);
        assert_eq!(coerce_f64(&json!({"v": 1.0})), None);
        assert_eq!(coerce_f64(&json!(true)), None);
    }

    #[test]
    fn test_spread_pct() {
        // bid 99, ask 101 -> mid 100 -> 2%
        let s = compute_spread_pct(Some(99.0), Some(101.0)).unwrap();
        assert!((s - 2.0).abs() < 1e-9);
        assert_eq!(compute_spread_pct(None, Some(101.0)), None);
        assert_eq!(compute_spread_pct(Some(0.0), Some(101.0)), None);
        assert_eq!(compute_spread_pct(Some(99.0), Some(-1.0)), None);
    }
}
