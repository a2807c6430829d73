use crate::color::trim_float;
use crate::css::{normalize_duration, normalize_radius, normalize_shadow};
use crate::types::{Category, SampleSet, SprawlReport};
use crate::Result;

use super::{tally, top_values, Analyzer};

/// Radius, shadow, z-index, opacity and transition sprawl over layout elements.
/// Default values (no radius, no shadow, `auto`, fully opaque, instant) are not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiscAnalyzer;

fn report<I>(category: Category, values: I, sort: bool) -> SprawlReport
where
    I: IntoIterator<Item = String>,
{
    let clusters = tally(values);
    let ideal = category.ideal_max();
    let proposed = if sort {
        top_values(&clusters, ideal)
    } else {
        clusters.iter().take(ideal).map(|c| c.value.clone()).collect()
    };
    SprawlReport::measured(category, clusters.len(), clusters, proposed)
}

fn z_index(value: &str) -> Option<String> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("auto") {
        return None;
    }
    v.parse::<i64>().ok().map(|z| z.to_string())
}

impl Analyzer for MiscAnalyzer {
    fn name(&self) -> &'static str {
        "misc"
    }

    fn categories(&self) -> &'static [Category] {
        &[
            Category::Radii,
            Category::Shadows,
            Category::ZIndex,
            Category::Opacity,
            Category::Transitions,
        ]
    }

    fn analyze(&self, samples: &SampleSet) -> Result<Vec<SprawlReport>> {
        let layout = &samples.layout;
        Ok(vec![
            report(
                Category::Radii,
                layout
                    .iter()
                    .filter_map(|s| s.border_radius.as_deref().and_then(normalize_radius)),
                true,
            ),
            // Shadows rank by use; there is no natural numeric order.
            report(
                Category::Shadows,
                layout
                    .iter()
                    .filter_map(|s| s.box_shadow.as_deref().and_then(normalize_shadow)),
                false,
            ),
            report(
                Category::ZIndex,
                layout
                    .iter()
                    .filter_map(|s| s.z_index.as_deref().and_then(z_index)),
                true,
            ),
            report(
                Category::Opacity,
                layout
                    .iter()
                    .filter_map(|s| s.opacity)
                    .filter(|o| *o < 1.0)
                    .map(|o| trim_float(o, 2)),
                true,
            ),
            report(
                Category::Transitions,
                layout.iter().filter_map(|s| {
                    s.transition_duration
                        .as_deref()
                        .and_then(normalize_duration)
                }),
                true,
            ),
        ])
    }
}
