//! Capped proportional waterfall allocation.

use std::collections::HashMap;

const TOTAL_WEIGHT: f64 = 100.0;
const EPS: f64 = 1e-9;

/// Distribute 100 points of sizing weight across symbols in proportion to
/// `raw_weights`, never letting any symbol exceed its entry in `caps`.
///
/// Each pass fixes every symbol whose proportional share meets its cap at
/// that cap and removes it from the pool; when no symbol hits its cap the
/// remainder is distributed proportionally in one final pass. Each pass
/// removes at least one symbol or terminates, so the loop is bounded by the
/// symbol count. The distributed total equals 100 unless caps are jointly
/// binding, in which case it is the sum of the caps reached.
pub fn allocate_with_caps(
    raw_weights: &HashMap<String, f64>,
    caps: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let mut symbols: Vec<&str> = raw_weights
        .iter()
        .filter(|(_, w)| **w > 0.0)
        .map(|(s, _)| s.as_str())
        .collect();
    symbols.sort_unstable();
    if symbols.is_empty() {
        return HashMap::new();
    }

    let weight = |s: &str| raw_weights.get(s).copied().unwrap_or(0.0).max(0.0);
    let cap = |s: &str| caps.get(s).copied().unwrap_or(0.0).max(0.0);

    let mut alloc: HashMap<String, f64> = symbols.iter().map(|s| (s.to_string(), 0.0)).collect();
    let mut active = symbols.clone();
    let mut remaining_total = TOTAL_WEIGHT;

    for _ in 0..symbols.len() {
        if active.is_empty() || remaining_total <= EPS {
            break;
        }
        let total_w: f64 = active.iter().map(|s| weight(s)).sum();
        if total_w <= 1e-12 {
            break;
        }
        let mut capped: Vec<&str> = Vec::new();
        for s in &active {
            let proposed = remaining_total * weight(s) / total_w;
            if proposed >= cap(s) - EPS {
                alloc.insert(s.to_string(), cap(s));
                remaining_total -= cap(s);
                capped.push(*s);
            }
        }
        if capped.is_empty() {
            for s in &active {
                alloc.insert(s.to_string(), remaining_total * weight(s) / total_w);
            }
            remaining_total = 0.0;
            break;
        }
        active.retain(|s| !capped.contains(s));
    }

    // Clamp tiny numeric drift.
    for v in alloc.values_mut() {
        *v = v.max(0.0);
    }
    alloc
}
