use std::collections::BTreeMap;

use crate::color::{color_name, delta_e, LabColor, Rgba};
use crate::types::{
    Category, ColorEntry, ColorRole, ReportDetail, SampleSet, SprawlReport, ValueCount,
};
use crate::Result;

use super::{Analyzer, UnionFind};

/// LAB chroma at which a color reads as an accent rather than a neutral.
const ACCENT_CHROMA: f64 = 30.0;

/// Clusters every observed text, background and border color by ΔE.
#[derive(Debug, Clone, Copy)]
pub struct ColorAnalyzer {
    /// Colors closer than this (CIE76) are one cluster.
    pub delta_e_threshold: f64,
}

impl Default for ColorAnalyzer {
    fn default() -> Self {
        Self {
            delta_e_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Usage {
    text: usize,
    background: usize,
    border: usize,
}

impl Usage {
    fn total(&self) -> usize {
        self.text + self.background + self.border
    }

    fn add(&mut self, other: &Usage) {
        self.text += other.text;
        self.background += other.background;
        self.border += other.border;
    }

    fn dominant(&self) -> ColorRole {
        let mut role = ColorRole::Text;
        let mut best = self.text;
        if self.background > best {
            role = ColorRole::Background;
            best = self.background;
        }
        if self.border > best {
            role = ColorRole::Border;
        }
        role
    }
}

#[derive(Debug, Clone)]
struct Observed {
    hex: String,
    rgba: Rgba,
    lab: LabColor,
    usage: Usage,
}

impl ColorAnalyzer {
    pub fn new(delta_e_threshold: f64) -> Self {
        Self { delta_e_threshold }
    }

    /// Single-link clusters over distinct colors. Membership depends only on
    /// the set of colors, never on the order they were observed in.
    pub fn palette(&self, samples: &SampleSet) -> (usize, Vec<ColorEntry>) {
        let observed = observe(samples);
        let distinct = observed.len();

        let mut uf = UnionFind::new(distinct);
        for i in 0..distinct {
            for j in (i + 1)..distinct {
                if delta_e(observed[i].lab, observed[j].lab) < self.delta_e_threshold {
                    uf.union(i, j);
                }
            }
        }

        let mut entries: Vec<ColorEntry> = uf
            .groups()
            .into_iter()
            .map(|members| {
                let mut usage = Usage::default();
                for &m in &members {
                    usage.add(&observed[m].usage);
                }
                // Most used member names the cluster; ties go to the smaller hex.
                let rep = members
                    .iter()
                    .map(|&m| &observed[m])
                    .max_by(|a, b| {
                        a.usage
                            .total()
                            .cmp(&b.usage.total())
                            .then_with(|| b.hex.cmp(&a.hex))
                    })
                    .unwrap_or(&observed[members[0]]);
                let role = if rep.lab.chroma() >= ACCENT_CHROMA {
                    ColorRole::Accent
                } else {
                    usage.dominant()
                };
                ColorEntry {
                    hex: rep.hex.clone(),
                    lab: rep.lab.to_array(),
                    count: usage.total(),
                    role,
                    name: color_name(&rep.rgba).to_string(),
                    members: members.iter().map(|&m| observed[m].hex.clone()).collect(),
                }
            })
            .collect();

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.hex.cmp(&b.hex)));
        (distinct, entries)
    }
}

/// Distinct painted colors keyed by hex, so iteration order is independent of
/// document order. Translucent colors are flattened onto what they paint over
/// before keying, so `rgba(0,0,0,0.5)` text on white counts as mid gray.
fn observe(samples: &SampleSet) -> Vec<Observed> {
    let page = samples
        .page_background
        .map(|c| c.over(Rgba::WHITE))
        .unwrap_or(Rgba::WHITE);
    let mut by_hex: BTreeMap<String, (Rgba, Usage)> = BTreeMap::new();
    let mut record = |color: Option<Rgba>, backdrop: Rgba, bump: fn(&mut Usage)| {
        if let Some(c) = color.filter(|c| !c.is_transparent()) {
            let painted = c.over(backdrop);
            let entry = by_hex
                .entry(painted.to_hex())
                .or_insert_with(|| (painted, Usage::default()));
            bump(&mut entry.1);
        }
    };

    for s in &samples.text {
        let backdrop = s.background_color.map(|b| b.over(page)).unwrap_or(page);
        record(s.color, backdrop, |u| u.text += 1);
    }
    for s in &samples.layout {
        let backdrop = s.background_color.map(|b| b.over(page)).unwrap_or(page);
        record(s.background_color, page, |u| u.background += 1);
        record(s.border_color, backdrop, |u| u.border += 1);
    }

    by_hex
        .into_iter()
        .map(|(hex, (rgba, usage))| Observed {
            hex,
            rgba,
            lab: rgba.to_lab(),
            usage,
        })
        .collect()
}

impl Analyzer for ColorAnalyzer {
    fn name(&self) -> &'static str {
        "color"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Colors]
    }

    fn analyze(&self, samples: &SampleSet) -> Result<Vec<SprawlReport>> {
        let (distinct, entries) = self.palette(samples);
        let clusters: Vec<ValueCount> = entries
            .iter()
            .map(|e| ValueCount::new(e.hex.clone(), e.count))
            .collect();
        let proposed: Vec<String> = entries
            .iter()
            .take(Category::Colors.ideal_max())
            .map(|e| e.hex.clone())
            .collect();

        let mut report = SprawlReport::measured(Category::Colors, distinct, clusters, proposed);
        if !entries.is_empty() {
            report = report.with_detail(ReportDetail::Palette { entries });
        }
        let images = samples.background_image_count();
        if images > 0 {
            report = report.with_note(format!(
                "{} element(s) paint a background image or gradient; those colors are not computable",
                images
            ));
        }
        Ok(vec![report])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReportStatus, StyleSample};

    fn text(color: Rgba) -> StyleSample {
        StyleSample {
            tag: "p".into(),
            color: Some(color),
            ..StyleSample::default()
        }
    }

    #[test]
    fn near_duplicates_merge_and_keep_distinct_count() {
        let samples = SampleSet {
            text: vec![
                text(Rgba::opaque(30, 64, 175)),
                text(Rgba::opaque(30, 64, 175)),
                text(Rgba::opaque(31, 65, 176)),
                text(Rgba::opaque(220, 38, 38)),
            ],
            ..SampleSet::default()
        };
        let reports = ColorAnalyzer::default().analyze(&samples).unwrap();
        let report = &reports[0];
        assert_eq!(report.distinct_value_count, 3);
        assert_eq!(report.cluster_count(), 2);
        assert_eq!(report.clusters[0], ValueCount::new("#1e40af", 3));
        assert_eq!(report.score, 100);
    }

    #[test]
    fn roles_follow_usage_and_chroma() {
        let samples = SampleSet {
            text: vec![text(Rgba::opaque(17, 24, 39)), text(Rgba::opaque(37, 99, 235))],
            layout: vec![StyleSample {
                background_color: Some(Rgba::WHITE),
                ..StyleSample::default()
            }],
            ..SampleSet::default()
        };
        let (_, entries) = ColorAnalyzer::default().palette(&samples);
        let role = |hex: &str| entries.iter().find(|e| e.hex == hex).map(|e| e.role);
        assert_eq!(role("#111827"), Some(ColorRole::Text));
        assert_eq!(role("#ffffff"), Some(ColorRole::Background));
        assert_eq!(role("#2563eb"), Some(ColorRole::Accent));
    }

    #[test]
    fn translucent_text_does_not_merge_with_its_opaque_base() {
        let samples = SampleSet {
            text: vec![
                text(Rgba { r: 0, g: 0, b: 0, a: 0.5 }),
                text(Rgba::opaque(0, 0, 0)),
            ],
            ..SampleSet::default()
        };
        let (distinct, entries) = ColorAnalyzer::default().palette(&samples);
        assert_eq!(distinct, 2);
        let hexes: Vec<&str> = entries.iter().map(|e| e.hex.as_str()).collect();
        assert!(hexes.contains(&"#000000"));
        assert!(hexes.contains(&"#808080"));
    }

    #[test]
    fn transparent_and_missing_colors_are_ignored() {
        let samples = SampleSet {
            text: vec![
                text(Rgba { r: 0, g: 0, b: 0, a: 0.0 }),
                StyleSample::default(),
            ],
            ..SampleSet::default()
        };
        let report = &ColorAnalyzer::default().analyze(&samples).unwrap()[0];
        assert_eq!(report.status, ReportStatus::NoData);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn background_images_are_noted() {
        let samples = SampleSet {
            layout: vec![StyleSample {
                background_color: Some(Rgba::WHITE),
                has_background_image: true,
                ..StyleSample::default()
            }],
            ..SampleSet::default()
        };
        let report = &ColorAnalyzer::default().analyze(&samples).unwrap()[0];
        assert_eq!(report.notes.len(), 1);
        assert!(report.notes[0].contains("not computable"));
    }
}
