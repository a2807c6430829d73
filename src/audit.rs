//! Audit orchestration: load, sample, analyze, score, assemble.

use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::analysis::run_analysis;
use crate::browser::PageLoader;
use crate::config::Config;
use crate::fix_plan::build_fix_plan;
use crate::progress::{AuditContext, AuditPhase, ProgressCallback};
use crate::sampler::sample_page;
use crate::scoring::{grade, overall_score};
use crate::store::{ReportId, ReportStore};
use crate::target::VettedUrl;
use crate::tokens::propose_tokens;
use crate::types::{AuditResult, SampleSummary, ScreenshotRef};
use crate::{DsaError, Result};

/// Runs audits against pages from one loader. Holds no per-audit state, so a
/// single auditor can serve concurrent audits.
#[derive(Debug, Clone)]
pub struct Auditor<L> {
    config: Config,
    loader: L,
}

impl<L: PageLoader> Auditor<L> {
    pub fn new(config: Config, loader: L) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Single entry point: progress goes to `on_progress`, `cancel` aborts.
    pub async fn run_audit(
        &self,
        url: &VettedUrl,
        on_progress: Option<ProgressCallback>,
        cancel: CancellationToken,
    ) -> Result<AuditResult> {
        self.run(url, &AuditContext::new(on_progress, cancel)).await
    }

    /// Runs one audit. Load and sample failures keep their kind; anything
    /// unexpected is logged and surfaces as [`DsaError::Internal`].
    pub async fn run(&self, url: &VettedUrl, ctx: &AuditContext) -> Result<AuditResult> {
        tracing::info!(url = %url, "audit started");
        match self.run_phases(url, ctx).await {
            Ok(result) => {
                tracing::info!(
                    url = %url,
                    score = result.overall_score,
                    grade = %result.grade,
                    "audit finished"
                );
                Ok(result)
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!(url = %url, "audit cancelled");
                Err(err)
            }
            Err(err @ (DsaError::Load(_) | DsaError::Sample(_) | DsaError::Config(_))) => {
                tracing::warn!(url = %url, error = %err, "audit failed");
                Err(err)
            }
            Err(err) => {
                tracing::error!(url = %url, error = %err, "audit failed unexpectedly");
                Err(DsaError::internal(err.to_string()))
            }
        }
    }

    /// Runs an audit and persists it only when it completes.
    pub async fn run_and_save(
        &self,
        url: &VettedUrl,
        ctx: &AuditContext,
        store: &dyn ReportStore,
    ) -> Result<(ReportId, AuditResult)> {
        let result = self.run(url, ctx).await?;
        ctx.check_cancelled()?;
        let id = store.save(&result)?;
        Ok((id, result))
    }

    async fn run_phases(&self, url: &VettedUrl, ctx: &AuditContext) -> Result<AuditResult> {
        ctx.check_cancelled()?;

        let page = self.loader.load(url, ctx).await?;
        ctx.report(AuditPhase::Load, "page loaded")?;

        let samples = sample_page(&page.capture, &self.config.sampling)?;
        let summary = SampleSummary {
            text_elements: samples.text.len(),
            layout_elements: samples.layout.len(),
            truncated: samples.truncated,
            background_images: samples.background_image_count(),
        };
        ctx.report(
            AuditPhase::Sample,
            format!(
                "sampled {} text and {} layout elements",
                summary.text_elements, summary.layout_elements
            ),
        )?;

        let analysis = run_analysis(Arc::new(samples), &self.config.analysis).await;
        ctx.report(AuditPhase::Analyze, "analysis complete")?;

        let weights = &self.config.weights;
        let overall = overall_score(&analysis.reports, weights);
        let fix_plan = build_fix_plan(&analysis.reports, weights);
        let token_proposals = propose_tokens(&analysis.reports);
        ctx.report(AuditPhase::Score, format!("overall score {}", overall))?;

        let result = AuditResult {
            url: url.to_string(),
            timestamp: Utc::now(),
            viewport: self.config.viewport,
            screenshot: page.screenshot.map(|s| ScreenshotRef {
                bytes: s.bytes.len(),
                path: s.path,
            }),
            samples: summary,
            sprawl_reports: analysis.reports,
            pattern_analysis: analysis.patterns,
            overall_score: overall,
            grade: grade(overall),
            fix_plan,
            token_proposals,
        };
        ctx.report(AuditPhase::Complete, "audit complete")?;
        Ok(result)
    }
}
