use crate::config::AnalysisConfig;
use crate::css::format_px;
use crate::types::{Category, ReportDetail, SampleSet, SprawlReport};
use crate::Result;

use super::{tally, top_values, Analyzer};

/// Margin, padding and gap sprawl, with base-unit inference.
#[derive(Debug, Clone, Copy)]
pub struct SpacingAnalyzer {
    pub tolerance_px: f64,
    /// Minimum share of samples that must sit on the unit's grid.
    pub threshold: f64,
    pub max_unit_px: u32,
    pub min_unit_px: u32,
}

impl Default for SpacingAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl SpacingAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            tolerance_px: config.base_unit_tolerance_px,
            threshold: config.base_unit_threshold,
            max_unit_px: config.base_unit_max_px,
            min_unit_px: config.base_unit_min_px,
        }
    }

    pub fn base_unit(&self, values: &[f64]) -> Option<f64> {
        infer_base_unit(
            values,
            self.max_unit_px,
            self.min_unit_px,
            self.tolerance_px,
            self.threshold,
        )
    }
}

/// Largest whole-pixel unit, scanned from `max_px` down to `min_px`, for which
/// at least `threshold` of the values lie within `tolerance_px` of a positive
/// multiple of it. Values are weighted by occurrence.
///
/// A candidate must also divide at least one value exactly; otherwise a page
/// using only `16px` would report a `17px` unit. Units no wider than the
/// tolerance window (`unit <= 2 * tolerance + 1`) are skipped, since every
/// whole-pixel value lies within tolerance of one of their multiples.
pub fn infer_base_unit(
    values: &[f64],
    max_px: u32,
    min_px: u32,
    tolerance_px: f64,
    threshold: f64,
) -> Option<f64> {
    if values.is_empty() || min_px == 0 {
        return None;
    }
    let window = 2.0 * tolerance_px + 1.0;
    (min_px..=max_px).rev().map(f64::from).find(|&unit| {
        if unit <= window {
            return false;
        }
        let divides_one = values.iter().any(|&v| (v - snap(v, unit)).abs() < 0.01);
        if !divides_one {
            return false;
        }
        let on_grid = values
            .iter()
            .filter(|&&v| (v - snap(v, unit)).abs() <= tolerance_px)
            .count();
        on_grid as f64 / values.len() as f64 >= threshold
    })
}

/// Nearest positive multiple of `unit`.
fn snap(value: f64, unit: f64) -> f64 {
    (value / unit).round().max(1.0) * unit
}

fn spacing_values(samples: &SampleSet) -> Vec<f64> {
    samples
        .layout
        .iter()
        .flat_map(|s| {
            s.margin
                .values()
                .into_iter()
                .chain(s.padding.values())
                .chain(s.row_gap)
                .chain(s.column_gap)
        })
        .filter(|v| *v > 0.0)
        .collect()
}

impl Analyzer for SpacingAnalyzer {
    fn name(&self) -> &'static str {
        "spacing"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Spacing]
    }

    fn analyze(&self, samples: &SampleSet) -> Result<Vec<SprawlReport>> {
        let values = spacing_values(samples);
        let clusters = tally(values.iter().copied().map(format_px));
        let ideal = Category::Spacing.ideal_max();
        let unit = self.base_unit(&values);

        let proposed = match unit {
            Some(unit) => {
                let mut steps: Vec<f64> = values.iter().map(|&v| snap(v, unit)).collect();
                steps.sort_by(f64::total_cmp);
                steps.dedup();
                steps.into_iter().take(ideal).map(format_px).collect()
            }
            None => top_values(&clusters, ideal),
        };

        let report = SprawlReport::measured(Category::Spacing, clusters.len(), clusters, proposed);
        let report = if report.cluster_count() > 0 {
            report.with_detail(ReportDetail::BaseUnit { unit })
        } else {
            report
        };
        Ok(vec![report])
    }
}
