use crate::css::{format_px, parse_px};
use crate::types::{Category, ReportDetail, SampleSet, SprawlReport, ValueCount};
use crate::Result;

use super::{sort_numeric, tally, top_values, Analyzer};

/// Common modular type-scale ratios, minor second through golden ratio.
const SCALE_RATIOS: [f64; 8] = [1.067, 1.125, 1.2, 1.25, 1.333, 1.414, 1.5, 1.618];

/// A detected modular scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeScale {
    pub base: f64,
    pub ratio: f64,
    /// Fraction of distinct sizes lying on the scale.
    pub fit: f64,
}

/// Finds the ratio that best explains the observed font sizes.
///
/// The base is the most used size (smaller wins ties). A size lies on the scale
/// when it is within `tolerance_px` of `base * ratio^k` for the nearest integer
/// `k`. Small ratios fit almost anything, so equal fits keep the larger ratio.
/// Needs at least two distinct sizes.
pub fn detect_type_scale(sizes: &[ValueCount], tolerance_px: f64) -> Option<TypeScale> {
    let parsed: Vec<(f64, usize)> = sizes
        .iter()
        .filter_map(|c| parse_px(&c.value).map(|px| (px, c.count)))
        .filter(|(px, _)| *px > 0.0)
        .collect();
    if parsed.len() < 2 {
        return None;
    }
    let base = parsed
        .iter()
        .copied()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.total_cmp(&a.0)))
        .map(|(px, _)| px)?;

    let mut best: Option<TypeScale> = None;
    for ratio in SCALE_RATIOS {
        let on_scale = parsed
            .iter()
            .filter(|(size, _)| {
                let step = ((size / base).ln() / ratio.ln()).round();
                (size - base * ratio.powf(step)).abs() <= tolerance_px
            })
            .count();
        let fit = on_scale as f64 / parsed.len() as f64;
        if best.map_or(true, |b| fit >= b.fit) {
            best = Some(TypeScale { base, ratio, fit });
        }
    }
    best
}

/// Font size, weight, family and line-height sprawl over text elements.
/// Values are compared exactly.
#[derive(Debug, Clone, Copy)]
pub struct TypographyAnalyzer {
    pub scale_tolerance_px: f64,
}

impl Default for TypographyAnalyzer {
    fn default() -> Self {
        Self {
            scale_tolerance_px: 1.0,
        }
    }
}

impl TypographyAnalyzer {
    fn font_sizes(&self, samples: &SampleSet) -> SprawlReport {
        let clusters = tally(
            samples
                .text
                .iter()
                .filter_map(|s| s.font_size)
                .filter(|px| *px > 0.0)
                .map(format_px),
        );
        let scale = detect_type_scale(&clusters, self.scale_tolerance_px);
        let proposed = top_values(&clusters, Category::FontSizes.ideal_max());
        let report = SprawlReport::measured(Category::FontSizes, clusters.len(), clusters, proposed);
        match scale {
            Some(s) => report.with_detail(ReportDetail::TypeScale {
                base: s.base,
                ratio: s.ratio,
                fit: s.fit,
            }),
            None => report,
        }
    }
}

fn exact(category: Category, values: impl Iterator<Item = String>, numeric: bool) -> SprawlReport {
    let clusters = tally(values);
    let mut proposed: Vec<String> = clusters
        .iter()
        .take(category.ideal_max())
        .map(|c| c.value.clone())
        .collect();
    if numeric {
        sort_numeric(&mut proposed);
    }
    SprawlReport::measured(category, clusters.len(), clusters, proposed)
}

impl Analyzer for TypographyAnalyzer {
    fn name(&self) -> &'static str {
        "typography"
    }

    fn categories(&self) -> &'static [Category] {
        &[
            Category::FontSizes,
            Category::FontWeights,
            Category::FontFamilies,
            Category::LineHeights,
        ]
    }

    fn analyze(&self, samples: &SampleSet) -> Result<Vec<SprawlReport>> {
        let text = &samples.text;
        Ok(vec![
            self.font_sizes(samples),
            exact(
                Category::FontWeights,
                text.iter().filter_map(|s| s.font_weight.clone()),
                true,
            ),
            exact(
                Category::FontFamilies,
                text.iter().filter_map(|s| s.font_family.clone()),
                false,
            ),
            exact(
                Category::LineHeights,
                text.iter().filter_map(|s| s.line_height.clone()),
                true,
            ),
        ])
    }
}
