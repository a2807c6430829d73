use futures::future::join_all;
use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::types::{Category, PatternAnalysis, SampleSet, SprawlReport};
use crate::Result;

use super::{ColorAnalyzer, MiscAnalyzer, PatternAnalyzer, SpacingAnalyzer, TypographyAnalyzer};

/// Reason attached to categories whose analyzer failed.
const NOT_COMPUTABLE_REASON: &str = "analysis failed for this category";

/// A pure analysis over a sample set, owning a fixed set of categories.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;
    fn categories(&self) -> &'static [Category];
    fn analyze(&self, samples: &SampleSet) -> Result<Vec<SprawlReport>>;
}

/// All sprawl reports plus the pattern analysis for one sample set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    /// One per category, in [`Category::all`] order.
    pub reports: Vec<SprawlReport>,
    pub patterns: PatternAnalysis,
}

/// The analyzers covering every category.
pub fn default_analyzers(config: &AnalysisConfig) -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(ColorAnalyzer::new(config.delta_e_threshold)),
        Arc::new(TypographyAnalyzer::default()),
        Arc::new(SpacingAnalyzer::from_config(config)),
        Arc::new(MiscAnalyzer),
    ]
}

/// Runs analyzers in parallel on the blocking pool and combines their reports
/// in category order, whatever order they finish in.
///
/// An analyzer that errors or panics degrades each of its categories to
/// `not_computable`; categories no analyzer owns are reported the same way.
pub async fn run_analyzers(
    analyzers: &[Arc<dyn Analyzer>],
    samples: Arc<SampleSet>,
) -> Vec<SprawlReport> {
    let handles = analyzers.iter().map(|analyzer| {
        let analyzer = Arc::clone(analyzer);
        let samples = Arc::clone(&samples);
        tokio::task::spawn_blocking(move || analyzer.analyze(&samples))
    });
    let outcomes = join_all(handles).await;

    let mut collected: Vec<SprawlReport> = Vec::new();
    for (analyzer, outcome) in analyzers.iter().zip(outcomes) {
        let failure = match outcome {
            Ok(Ok(reports)) => {
                for category in analyzer.categories() {
                    match reports.iter().find(|r| r.category == *category) {
                        Some(report) => collected.push(report.clone()),
                        None => {
                            tracing::warn!(
                                analyzer = analyzer.name(),
                                %category,
                                "analyzer returned no report for its category"
                            );
                            collected
                                .push(SprawlReport::not_computable(*category, NOT_COMPUTABLE_REASON));
                        }
                    }
                }
                continue;
            }
            Ok(Err(err)) => err.to_string(),
            Err(join_err) => format!("analyzer task failed: {}", join_err),
        };
        tracing::warn!(
            analyzer = analyzer.name(),
            error = %failure,
            "analyzer failed; categories marked not computable"
        );
        for category in analyzer.categories() {
            collected.push(SprawlReport::not_computable(*category, NOT_COMPUTABLE_REASON));
        }
    }

    Category::all()
        .into_iter()
        .map(|category| {
            collected
                .iter()
                .find(|r| r.category == category)
                .cloned()
                .unwrap_or_else(|| SprawlReport::not_computable(category, NOT_COMPUTABLE_REASON))
        })
        .collect()
}

/// Runs every default analyzer and the pattern analysis concurrently.
pub async fn run_analysis(samples: Arc<SampleSet>, config: &AnalysisConfig) -> AnalysisOutput {
    let analyzers = default_analyzers(config);
    let pattern_analyzer = PatternAnalyzer::from_config(config);
    let layout_elements = samples.layout.len();
    let pattern_samples = Arc::clone(&samples);
    let pattern_task =
        tokio::task::spawn_blocking(move || pattern_analyzer.analyze(&pattern_samples));

    let (reports, patterns) = futures::join!(run_analyzers(&analyzers, samples), pattern_task);
    let patterns = settle_patterns(patterns, layout_elements);

    AnalysisOutput { reports, patterns }
}

/// A failed pattern task still accounts for every sampled layout element.
fn settle_patterns(
    outcome: std::result::Result<PatternAnalysis, tokio::task::JoinError>,
    layout_elements: usize,
) -> PatternAnalysis {
    outcome.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "pattern analysis failed; counting all elements as one-offs");
        PatternAnalysis::unmatched(layout_elements)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_pattern_task_keeps_element_totals() {
        let outcome = tokio::task::spawn_blocking(|| -> PatternAnalysis {
            panic!("grouping exploded");
        })
        .await;
        let patterns = settle_patterns(outcome, 7);
        assert!(patterns.patterns.is_empty());
        assert_eq!(patterns.total_elements, 7);
        assert_eq!(patterns.one_offs, 7);
        assert_eq!(patterns.one_off_percentage, 100);
        assert_eq!(patterns.coverage, 0);
        let grouped: usize = patterns.patterns.iter().map(|p| p.count).sum();
        assert_eq!(grouped + patterns.one_offs, patterns.total_elements);
    }

    #[test]
    fn unmatched_with_nothing_sampled_is_all_zero() {
        assert_eq!(PatternAnalysis::unmatched(0), PatternAnalysis::default());
    }
}
