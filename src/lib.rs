//! Design Sprawl Auditor (DSA) Library
//!
//! Measures how consistent a live web page's visual design is. A page is
//! loaded in a headless browser, computed styles are sampled from its
//! elements, and each style category (colors, type, spacing, radii, shadows,
//! and so on) is scored by how far its distinct-value count exceeds what a
//! disciplined design system would use.
//!
//! # Module Overview
//!
//! - [`browser`] - Headless page loading via a Playwright helper process
//! - [`sampler`] - Raw capture to typed [`SampleSet`]
//! - [`analysis`] - Sprawl analyzers and repeated-pattern detection
//! - [`scoring`] / [`fix_plan`] / [`tokens`] - Pure post-processing of reports
//! - [`audit`] - The [`Auditor`] orchestrating one run
//! - [`store`] - Persistence of completed audits
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//!
//! # Example
//!
//! ```no_run
//! use dsa_lib::{Auditor, Config, PlaywrightLoader, PlaywrightOptions, VettedUrl};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> dsa_lib::Result<()> {
//! let config = Config::default();
//! let loader = PlaywrightLoader::new(PlaywrightOptions::from_config(&config));
//! let auditor = Auditor::new(config, loader);
//!
//! let url = VettedUrl::parse("https://example.com")?;
//! let result = auditor.run_audit(&url, None, CancellationToken::new()).await?;
//! println!("{} ({})", result.overall_score, result.grade);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod audit;
pub mod browser;
pub mod color;
pub mod config;
pub mod css;
pub mod error;
pub mod fix_plan;
pub mod output;
pub mod progress;
pub mod sampler;
pub mod scoring;
pub mod store;
pub mod target;
pub mod tokens;
pub mod types;

pub use analysis::{
    default_analyzers, run_analysis, run_analyzers, AnalysisOutput, Analyzer, PatternAnalyzer,
};
pub use audit::Auditor;
pub use browser::{LoadedPage, PageLoader, PlaywrightLoader, PlaywrightOptions, Screenshot};
pub use color::Rgba;
pub use config::{Config, ScoreWeights, Viewport};
pub use error::{DsaError, ErrorCategory, ErrorPayload, Result};
pub use fix_plan::build_fix_plan;
pub use output::{AuditOutput, DsaOutput, ErrorOutput, DSA_OUTPUT_VERSION};
pub use progress::{AuditContext, AuditPhase, ProgressCallback, ProgressClosed, ProgressUpdate};
pub use sampler::sample_page;
pub use scoring::{category_score, grade, overall_score};
pub use store::{FileStore, MemoryStore, ReportId, ReportStore};
pub use target::VettedUrl;
pub use tokens::{export, propose_tokens, ExportFormat};
pub use types::{
    AuditResult, Category, DesignToken, Finding, Grade, PatternAnalysis, SampleSet,
    SprawlReport,
};
