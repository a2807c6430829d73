//! Core data types shared by the sampler, analyzers and report assembly.
//!
//! - [`sample`] - immutable per-element style snapshots
//! - [`report`] - per-category sprawl reports, patterns, findings and tokens
//! - [`audit`] - the assembled [`AuditResult`]

mod audit;
mod report;
mod sample;

pub use audit::{AuditResult, SampleSummary, ScreenshotRef};
pub use report::{
    Category, ColorEntry, ColorRole, DesignToken, Effort, Finding, Grade, ImpactLevel, Pattern,
    PatternAnalysis, ReportDetail, ReportStatus, SprawlReport, TokenGroup, ValueCount,
};
pub use sample::{BoundingBox, SampleSet, Sides, StyleSample};
