//! Ranked remediation plan: biggest recoverable score first, quick wins
//! before slow ones.

use crate::config::ScoreWeights;
use crate::types::{Category, Effort, Finding, ImpactLevel, SprawlReport};

/// Rough cost of consolidating a category, independent of the page.
pub const fn effort_for(category: Category) -> Effort {
    match category {
        Category::Colors
        | Category::FontSizes
        | Category::FontFamilies
        | Category::ZIndex => Effort::Medium,
        Category::FontWeights
        | Category::LineHeights
        | Category::Spacing
        | Category::Radii
        | Category::Shadows
        | Category::Opacity
        | Category::Transitions => Effort::Low,
    }
}

/// Impact level from the category's score gap.
pub fn impact_for(gap: u8) -> ImpactLevel {
    match gap {
        50..=u8::MAX => ImpactLevel::High,
        20..=49 => ImpactLevel::Medium,
        _ => ImpactLevel::Low,
    }
}

/// One finding per computable category scoring below 100.
///
/// Sorted by impact points descending, then effort ascending, then category
/// order, so the plan is stable for identical reports.
pub fn build_fix_plan(reports: &[SprawlReport], weights: &ScoreWeights) -> Vec<Finding> {
    let mut findings: Vec<Finding> = reports
        .iter()
        .filter(|r| r.is_computable() && r.score < 100)
        .map(|r| finding(r, weights))
        .collect();

    findings.sort_by(|a, b| {
        b.impact_points
            .total_cmp(&a.impact_points)
            .then_with(|| a.effort.cmp(&b.effort))
            .then_with(|| a.category.cmp(&b.category))
    });
    findings
}

fn finding(report: &SprawlReport, weights: &ScoreWeights) -> Finding {
    let gap = 100 - report.score;
    let points = f64::from(gap) * weights.weight(report.category);
    let category = report.category;
    let count = report.cluster_count();

    Finding {
        category,
        title: format!("Consolidate {}", category.label()),
        description: format!(
            "{} distinct {} in use where a consistent system needs at most {}; \
             map the outliers onto the proposed scale.",
            count,
            category.label(),
            report.ideal_max
        ),
        impact: impact_for(gap),
        impact_points: (points * 100.0).round() / 100.0,
        effort: effort_for(category),
        current_count: count,
        target_max: report.ideal_max,
        suggested_values: report.proposed_scale.clone(),
    }
}
