//! Analysis output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DsaError;
use crate::scoring::category_score;

/// A measured style dimension. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Colors,
    FontSizes,
    FontWeights,
    FontFamilies,
    LineHeights,
    Spacing,
    Radii,
    Shadows,
    ZIndex,
    Opacity,
    Transitions,
}

impl Category {
    pub const fn all() -> [Category; 11] {
        [
            Category::Colors,
            Category::FontSizes,
            Category::FontWeights,
            Category::FontFamilies,
            Category::LineHeights,
            Category::Spacing,
            Category::Radii,
            Category::Shadows,
            Category::ZIndex,
            Category::Opacity,
            Category::Transitions,
        ]
    }

    /// Largest count a tidy design system would need.
    pub const fn ideal_max(self) -> usize {
        match self {
            Category::Colors => 15,
            Category::FontSizes => 10,
            Category::FontWeights => 4,
            Category::FontFamilies => 3,
            Category::LineHeights => 6,
            Category::Spacing => 12,
            Category::Radii => 5,
            Category::Shadows => 5,
            Category::ZIndex => 5,
            Category::Opacity => 5,
            Category::Transitions => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Colors => "colors",
            Category::FontSizes => "font-sizes",
            Category::FontWeights => "font-weights",
            Category::FontFamilies => "font-families",
            Category::LineHeights => "line-heights",
            Category::Spacing => "spacing",
            Category::Radii => "radii",
            Category::Shadows => "shadows",
            Category::ZIndex => "z-index",
            Category::Opacity => "opacity",
            Category::Transitions => "transitions",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::Colors => "colors",
            Category::FontSizes => "font sizes",
            Category::FontWeights => "font weights",
            Category::FontFamilies => "font families",
            Category::LineHeights => "line heights",
            Category::Spacing => "spacing values",
            Category::Radii => "border radii",
            Category::Shadows => "box shadows",
            Category::ZIndex => "z-index values",
            Category::Opacity => "opacity values",
            Category::Transitions => "transition durations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Category::all()
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| DsaError::Config(format!("Unknown category: {}", s)))
    }
}

/// Whether a report carries a real measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportStatus {
    Measured,
    /// Nothing to measure; scored 100.
    NoData,
    /// The analyzer failed; excluded from the overall score.
    NotComputable { reason: String },
}

/// A clustered value and how many samples fell into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

impl ValueCount {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Text,
    Background,
    Border,
    Accent,
}

/// One palette cluster, keyed by its most common member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub hex: String,
    pub lab: [f64; 3],
    pub count: usize,
    pub role: ColorRole,
    pub name: String,
    /// Distinct hex values merged into this cluster.
    pub members: Vec<String>,
}

/// Category-specific inference attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportDetail {
    Palette { entries: Vec<ColorEntry> },
    TypeScale { base: f64, ratio: f64, fit: f64 },
    BaseUnit { unit: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprawlReport {
    pub category: Category,
    pub status: ReportStatus,
    pub distinct_value_count: usize,
    pub ideal_max: usize,
    pub score: u8,
    /// Ordered by count descending.
    pub clusters: Vec<ValueCount>,
    pub proposed_scale: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ReportDetail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl SprawlReport {
    /// Builds a measured report scored on the cluster count.
    pub fn measured(
        category: Category,
        distinct_value_count: usize,
        clusters: Vec<ValueCount>,
        proposed_scale: Vec<String>,
    ) -> Self {
        if clusters.is_empty() {
            return Self::no_data(category);
        }
        let ideal_max = category.ideal_max();
        Self {
            category,
            status: ReportStatus::Measured,
            distinct_value_count,
            ideal_max,
            score: category_score(clusters.len(), ideal_max),
            clusters,
            proposed_scale,
            detail: None,
            notes: Vec::new(),
        }
    }

    pub fn no_data(category: Category) -> Self {
        Self {
            category,
            status: ReportStatus::NoData,
            distinct_value_count: 0,
            ideal_max: category.ideal_max(),
            score: 100,
            clusters: Vec::new(),
            proposed_scale: Vec::new(),
            detail: None,
            notes: Vec::new(),
        }
    }

    pub fn not_computable(category: Category, reason: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::NotComputable {
                reason: reason.into(),
            },
            ..Self::no_data(category)
        }
    }

    pub fn with_detail(mut self, detail: ReportDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_computable(&self) -> bool {
        !matches!(self.status, ReportStatus::NotComputable { .. })
    }

    /// Count the score is judged on.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// A recurring component shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub count: usize,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub example_selectors: Vec<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub patterns: Vec<Pattern>,
    pub one_offs: usize,
    /// Percent of elements inside a pattern.
    pub coverage: u8,
    /// Complement of `coverage`; both are zero when nothing was sampled.
    pub one_off_percentage: u8,
    pub total_elements: usize,
}

impl PatternAnalysis {
    /// Every element counted as a one-off, used when grouping could not run.
    pub fn unmatched(total_elements: usize) -> Self {
        Self {
            patterns: Vec::new(),
            one_offs: total_elements,
            coverage: 0,
            one_off_percentage: if total_elements > 0 { 100 } else { 0 },
            total_elements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Ordered cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// One remediation item in the fix plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub impact: ImpactLevel,
    /// Overall-score points recoverable by fixing this category.
    pub impact_points: f64,
    pub effort: Effort,
    pub current_count: usize,
    pub target_max: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenGroup {
    Color,
    FontSize,
    FontWeight,
    FontFamily,
    LineHeight,
    Spacing,
    Radius,
    Shadow,
    ZIndex,
    Opacity,
    Duration,
}

/// A named design value proposed as a consolidation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignToken {
    pub group: TokenGroup,
    /// Kebab-case, unique within an audit.
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_strings() {
        for category in Category::all() {
            let parsed: Category = category.to_string().parse().expect("parse");
            assert_eq!(parsed, category);
        }
        assert_eq!("Z_INDEX".parse::<Category>().unwrap(), Category::ZIndex);
        assert!("gradients".parse::<Category>().is_err());
    }

    #[test]
    fn ideal_maxima_follow_the_table() {
        let expected = [15, 10, 4, 3, 6, 12, 5, 5, 5, 5, 4];
        let actual: Vec<usize> = Category::all().iter().map(|c| c.ideal_max()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn measured_with_no_clusters_is_no_data() {
        let report = SprawlReport::measured(Category::Radii, 0, vec![], vec![]);
        assert_eq!(report.status, ReportStatus::NoData);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn not_computable_scores_are_neutral() {
        let report = SprawlReport::not_computable(Category::Shadows, "analyzer panicked");
        assert!(!report.is_computable());
        assert_eq!(report.score, 100);
        assert!(report.clusters.is_empty());
    }

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn report_status_serializes_tagged() {
        let json = serde_json::to_value(ReportStatus::NotComputable {
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "not_computable");
        assert_eq!(json["reason"], "boom");
    }
}
