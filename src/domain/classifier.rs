//! Ranking and selection over per-class integer metrics.
//!
//! None of these functions know which metric they rank; the same code serves
//! method counts, attribute counts and method line counts.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

/// Share of classes reported as "hot".
pub const HOT_CLASS_PERCENT: usize = 10;

/// The top `percent` of entries by value, highest first.
///
/// Ties keep their input order. The limit is `max(1, ceil(len * percent / 100))`
/// in exact integer arithmetic, so any non-empty input yields at least one name.
pub fn top_percent(metric: &IndexMap<String, usize>, percent: usize) -> Vec<String> {
    if metric.is_empty() {
        return Vec::new();
    }
    let limit = (metric.len() * percent).div_ceil(100).max(1);

    let mut ranked: Vec<(&String, usize)> = metric.iter().map(|(name, v)| (name, *v)).collect();
    // sort_by is stable: equal values stay in insertion order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.clone())
        .collect()
}

/// The top 10% of classes by `metric`.
pub fn top_ten_percent(metric: &IndexMap<String, usize>) -> Vec<String> {
    top_percent(metric, HOT_CLASS_PERCENT)
}

/// Classes present in both rankings, in the order of `first`.
pub fn intersection(first: &[String], second: &[String]) -> Vec<String> {
    let other: HashSet<&String> = second.iter().collect();
    first
        .iter()
        .filter(|name| other.contains(name))
        .collect::<IndexSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Classes whose metric is strictly greater than `bound`, in input order.
pub fn over_threshold(metric: &IndexMap<String, usize>, bound: i64) -> Vec<String> {
    metric
        .iter()
        .filter(|(_, value)| i64::try_from(**value).map_or(true, |v| v > bound))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(pairs: &[(&str, usize)]) -> IndexMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_three_classes_yield_single_hot_class() {
        let counts = metric(&[("X", 1), ("Y", 9), ("Z", 0)]);
        assert_eq!(top_ten_percent(&counts), vec!["Y"]);
    }

    #[test]
    fn test_limit_rounds_up() {
        let counts: IndexMap<String, usize> = (0..11).map(|i| (format!("C{i}"), i)).collect();
        assert_eq!(top_ten_percent(&counts), vec!["C10", "C9"]);
    }

    #[test]
    fn test_exact_multiple_of_ten_is_not_over_counted() {
        let counts: IndexMap<String, usize> = (0..30).map(|i| (format!("C{i}"), i)).collect();
        assert_eq!(top_ten_percent(&counts).len(), 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let counts = metric(&[("B", 5), ("A", 5), ("C", 5)]);
        assert_eq!(top_ten_percent(&counts), vec!["B"]);
        assert_eq!(top_percent(&counts, 100), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_empty_metric_ranks_nothing() {
        assert!(top_ten_percent(&IndexMap::new()).is_empty());
    }

    #[test]
    fn test_intersection_preserves_first_order() {
        let a = vec!["X".to_string(), "Y".to_string(), "Z".to_string()];
        let b = vec!["Z".to_string(), "X".to_string()];
        assert_eq!(intersection(&a, &b), vec!["X", "Z"]);
        assert_eq!(intersection(&b, &a), vec!["Z", "X"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let counts = metric(&[("X", 1), ("Y", 9), ("Z", 0)]);
        assert_eq!(over_threshold(&counts, 2), vec!["Y"]);
        assert_eq!(over_threshold(&counts, 1), vec!["Y"]);
        assert!(over_threshold(&counts, 9).is_empty());
        assert_eq!(over_threshold(&counts, -1), vec!["X", "Y", "Z"]);
    }
}
