use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Viewport;

use super::report::{DesignToken, Finding, Grade, PatternAnalysis, SprawlReport};

/// Where the page screenshot ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRef {
    pub path: PathBuf,
    pub bytes: usize,
}

/// How much of the page was sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSummary {
    pub text_elements: usize,
    pub layout_elements: usize,
    pub truncated: usize,
    pub background_images: usize,
}

/// Outcome of one audit run. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub viewport: Viewport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotRef>,
    pub samples: SampleSummary,
    /// One per category, in [`Category::all`](super::Category::all) order.
    pub sprawl_reports: Vec<SprawlReport>,
    pub pattern_analysis: PatternAnalysis,
    pub overall_score: u8,
    pub grade: Grade,
    pub fix_plan: Vec<Finding>,
    pub token_proposals: Vec<DesignToken>,
}

impl AuditResult {
    pub fn report(&self, category: super::Category) -> Option<&SprawlReport> {
        self.sprawl_reports.iter().find(|r| r.category == category)
    }
}
