use std::collections::{BTreeMap, HashMap};

use crate::config::AnalysisConfig;
use crate::css::{format_px, normalize_radius};
use crate::types::{Pattern, PatternAnalysis, SampleSet, StyleSample};

const MAX_EXAMPLE_SELECTORS: usize = 3;

/// Groups layout elements sharing tag, rounded size, background and radius.
#[derive(Debug, Clone, Copy)]
pub struct PatternAnalyzer {
    pub min_occurrences: usize,
    pub size_bucket_px: f64,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl PatternAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            min_occurrences: config.pattern_min_occurrences,
            size_bucket_px: config.pattern_size_bucket_px,
        }
    }

    pub fn analyze(&self, samples: &SampleSet) -> PatternAnalysis {
        analyze_patterns(&samples.layout, self.min_occurrences, self.size_bucket_px)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapeKey {
    tag: String,
    width: i64,
    height: i64,
    background: String,
    radius: String,
}

impl ShapeKey {
    fn of(sample: &StyleSample, bucket: f64) -> Self {
        let bucket = if bucket > 0.0 { bucket } else { 1.0 };
        Self {
            tag: sample.tag.clone(),
            width: (sample.rect.width / bucket).round() as i64,
            height: (sample.rect.height / bucket).round() as i64,
            background: sample
                .background_color
                .map(|c| c.to_hex())
                .unwrap_or_else(|| "none".to_string()),
            radius: sample
                .border_radius
                .as_deref()
                .and_then(normalize_radius)
                .unwrap_or_else(|| "0px".to_string()),
        }
    }
}

/// Groups elements by [`ShapeKey`]. Groups smaller than `min_occurrences` are
/// one-offs. Patterns rank by count; equal counts keep first-seen order.
pub fn analyze_patterns(
    elements: &[StyleSample],
    min_occurrences: usize,
    size_bucket_px: f64,
) -> PatternAnalysis {
    let mut index: HashMap<ShapeKey, usize> = HashMap::new();
    let mut groups: Vec<(ShapeKey, Vec<&StyleSample>)> = Vec::new();
    for el in elements {
        let key = ShapeKey::of(el, size_bucket_px);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(el),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![el]));
            }
        }
    }

    let mut one_offs = 0;
    let mut patterns = Vec::new();
    for (key, members) in groups {
        if members.len() < min_occurrences.max(1) {
            one_offs += members.len();
        } else {
            patterns.push(to_pattern(&key, &members, size_bucket_px));
        }
    }
    patterns.sort_by(|a, b| b.count.cmp(&a.count));

    let total_elements = elements.len();
    let in_patterns = total_elements - one_offs;
    let [coverage, one_off_percentage] = split_percentages([in_patterns, one_offs]);

    PatternAnalysis {
        patterns,
        one_offs,
        coverage,
        one_off_percentage,
        total_elements,
    }
}

fn to_pattern(key: &ShapeKey, members: &[&StyleSample], bucket: f64) -> Pattern {
    let bucket = if bucket > 0.0 { bucket } else { 1.0 };
    let width = format_px(key.width as f64 * bucket);
    let height = format_px(key.height as f64 * bucket);

    let mut examples: Vec<String> = Vec::new();
    for m in members {
        if examples.len() == MAX_EXAMPLE_SELECTORS {
            break;
        }
        if !examples.contains(&m.selector) {
            examples.push(m.selector.clone());
        }
    }

    let mut properties = BTreeMap::new();
    properties.insert("width".to_string(), width.clone());
    properties.insert("height".to_string(), height.clone());
    properties.insert("background".to_string(), key.background.clone());
    properties.insert("borderRadius".to_string(), key.radius.clone());

    Pattern {
        name: format!(
            "{} {}x{}",
            key.tag,
            width.trim_end_matches("px"),
            height.trim_end_matches("px")
        ),
        count: members.len(),
        tags: vec![key.tag.clone()],
        properties,
        example_selectors: examples,
        color: (key.background != "none").then(|| key.background.clone()),
    }
}

/// Integer percentages summing to exactly 100 (largest remainder; ties go to
/// the earlier part). All zeros when the total is zero.
pub fn split_percentages<const N: usize>(parts: [usize; N]) -> [u8; N] {
    let total: usize = parts.iter().sum();
    let mut out = [0u8; N];
    if total == 0 {
        return out;
    }
    let mut remainders: Vec<(usize, usize)> = Vec::with_capacity(N);
    let mut assigned = 0usize;
    for (i, part) in parts.iter().enumerate() {
        let scaled = part * 100;
        out[i] = (scaled / total) as u8;
        assigned += scaled / total;
        remainders.push((scaled % total, i));
    }
    // Larger remainder first, then earlier index.
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for (_, i) in remainders.into_iter().take(100 - assigned) {
        out[i] += 1;
    }
    out
}
