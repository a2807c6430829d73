//! Sprawl analyzers over an immutable sample set.
//!
//! Each analyzer is a pure function of the [`SampleSet`] and emits one
//! [`SprawlReport`] per category it owns:
//! - Color palette clustering by perceptual distance
//! - Typography (sizes, weights, families, line heights)
//! - Spacing with base-unit inference
//! - Misc (radii, shadows, z-index, opacity, transitions)
//!
//! Pattern analysis groups repeated component shapes and sits beside them.

mod clustering;
mod color;
mod misc;
mod patterns;
mod runner;
mod spacing;
mod typography;


pub use clustering::UnionFind;
pub use color::ColorAnalyzer;
pub use misc::MiscAnalyzer;
pub use patterns::{analyze_patterns, split_percentages, PatternAnalyzer};
pub use runner::{default_analyzers, run_analysis, run_analyzers, Analyzer, AnalysisOutput};
pub use spacing::{infer_base_unit, SpacingAnalyzer};
pub use typography::{detect_type_scale, TypeScale, TypographyAnalyzer};

use crate::types::ValueCount;
use std::collections::HashMap;

/// Counts exact values, ordered by count descending then first appearance.
pub(crate) fn tally<I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push(ValueCount::new(value, 1));
            }
        }
    }
    // Stable: equal counts keep first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The `limit` most used values, numerically ascending where they are numeric.
pub(crate) fn top_values(clusters: &[ValueCount], limit: usize) -> Vec<String> {
    let mut values: Vec<String> = clusters
        .iter()
        .take(limit)
        .map(|c| c.value.clone())
        .collect();
    sort_numeric(&mut values);
    values
}

/// Sorts by leading number when every value has one; otherwise leaves the order alone.
pub(crate) fn sort_numeric(values: &mut [String]) {
    let numbers: Option<Vec<f64>> = values.iter().map(|v| leading_number(v)).collect();
    if let Some(numbers) = numbers {
        let mut paired: Vec<(f64, String)> = numbers.into_iter().zip(values.iter().cloned()).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (slot, (_, value)) in values.iter_mut().zip(paired) {
            *slot = value;
        }
    }
}

fn leading_number(value: &str) -> Option<f64> {
    let first = value
        .trim()
        .split(|c: char| c == ',' || c.is_whitespace())
        .next()?;
    let number = first
        .strip_suffix("px")
        .or_else(|| first.strip_suffix("ms"))
        .unwrap_or(first);
    number.parse().ok()
}
