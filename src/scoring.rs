//! Category and overall scores. Pure functions of the sprawl reports.

use crate::config::ScoreWeights;
use crate::types::{Grade, SprawlReport};

/// `round(max(0, 100 - 100 * max(0, count - ideal) / ideal))`.
///
/// 100 at or below the ideal, falling linearly to 0 at twice the ideal.
pub fn category_score(count: usize, ideal_max: usize) -> u8 {
    if ideal_max == 0 {
        return if count == 0 { 100 } else { 0 };
    }
    let excess = count.saturating_sub(ideal_max) as f64;
    let score = 100.0 - 100.0 * excess / ideal_max as f64;
    score.max(0.0).round() as u8
}

/// Weighted mean of computable category scores, renormalized over the weights
/// of the categories that take part.
///
/// With nothing computable (or all-zero weights) there is no evidence of
/// sprawl and the score is 100.
pub fn overall_score(reports: &[SprawlReport], weights: &ScoreWeights) -> u8 {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for report in reports.iter().filter(|r| r.is_computable()) {
        let weight = weights.weight(report.category);
        weighted_sum += weight * f64::from(report.score);
        total_weight += weight;
    }
    if total_weight > 0.0 {
        (weighted_sum / total_weight).round().clamp(0.0, 100.0) as u8
    } else {
        100
    }
}

pub fn grade(overall: u8) -> Grade {
    Grade::from_score(overall)
}
