use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dsa_lib::types::ReportStatus;
use dsa_lib::{DsaError, DsaOutput, ErrorOutput};

use crate::cli::OutputFormat;

/// Exit code for a cancelled run (128 + SIGINT).
pub const CANCELLED_EXIT: u8 = 130;

/// Write output in the requested format.
pub fn write_output(
    body: &DsaOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Write raw text (exports) to file or stdout.
pub fn write_text(content: &str, output: Option<&Path>) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Render an error and return the appropriate exit code.
///
/// Cancellation prints nothing and exits 130; everything else exits 2.
pub fn render_error(err: DsaError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    if err.is_cancelled() {
        tracing::debug!("run cancelled");
        return ExitCode::from(CANCELLED_EXIT);
    }
    let payload = DsaOutput::Error(ErrorOutput::new(err.to_payload()));

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

fn write_json_output(body: &DsaOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &DsaOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &DsaOutput, colorize: bool) -> String {
    match body {
        DsaOutput::Audit(out) => {
            let result = &out.result;
            let mut buf = String::new();
            let header = color("[AUDIT]", "36", colorize);
            let score = color(
                &format!("{} ({})", result.overall_score, result.grade),
                score_color_code(result.overall_score),
                colorize,
            );
            writeln!(buf, "{} Design sprawl score {}", header, score).ok();
            writeln!(buf, "URL: {} at {}", result.url, result.viewport).ok();
            writeln!(
                buf,
                "Sampled: {} text, {} layout elements ({} truncated)",
                result.samples.text_elements, result.samples.layout_elements, result.samples.truncated
            )
            .ok();
            if let Some(id) = &out.report_id {
                writeln!(buf, "Report id: {}", id).ok();
            }

            writeln!(buf, "Categories:").ok();
            for report in &result.sprawl_reports {
                let line = match &report.status {
                    ReportStatus::NotComputable { reason } => {
                        format!("{} ({})", color("n/a", "33", colorize), reason)
                    }
                    _ => format!(
                        "{:>3}  {} of {} allowed",
                        color(&report.score.to_string(), score_color_code(report.score), colorize),
                        report.cluster_count(),
                        report.ideal_max
                    ),
                };
                writeln!(buf, "- {:14} {}", report.category.label(), line).ok();
            }

            let findings: Vec<_> = result.fix_plan.iter().take(5).collect();
            if !findings.is_empty() {
                writeln!(buf, "Fix plan (top {}):", findings.len()).ok();
                for finding in findings {
                    writeln!(
                        buf,
                        "- {} [{:?} impact, {:?} effort, +{:.2} pts]",
                        finding.title, finding.impact, finding.effort, finding.impact_points
                    )
                    .ok();
                }
            }

            if !result.pattern_analysis.patterns.is_empty() {
                writeln!(
                    buf,
                    "Repeated patterns: {} ({}% of layout elements)",
                    result.pattern_analysis.patterns.len(),
                    result.pattern_analysis.coverage
                )
                .ok();
            }
            buf
        }
        DsaOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            writeln!(buf, "{} {}", header, out.error.message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Map score to ANSI color code.
fn score_color_code(score: u8) -> &'static str {
    if score >= 90 {
        "32" // green
    } else if score >= 70 {
        "33" // yellow
    } else {
        "31" // red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dsa_lib::types::{
        Category, Effort, Finding, ImpactLevel, PatternAnalysis, SampleSummary, SprawlReport,
        ValueCount,
    };
    use dsa_lib::{AuditOutput, AuditResult, Grade, Viewport};

    fn audit_output() -> DsaOutput {
        let colors = SprawlReport::measured(
            Category::Colors,
            3,
            vec![ValueCount::new("#111111", 3)],
            vec!["#111111".into()],
        );
        let broken = SprawlReport::not_computable(Category::Shadows, "analysis failed for this category");
        DsaOutput::Audit(AuditOutput::new(
            AuditResult {
                url: "https://example.com/".into(),
                timestamp: Utc::now(),
                viewport: Viewport::default(),
                screenshot: None,
                samples: SampleSummary {
                    text_elements: 10,
                    layout_elements: 20,
                    truncated: 0,
                    background_images: 0,
                },
                sprawl_reports: vec![colors, broken],
                pattern_analysis: PatternAnalysis::default(),
                overall_score: 72,
                grade: Grade::C,
                fix_plan: vec![Finding {
                    category: Category::Spacing,
                    title: "Consolidate spacing".into(),
                    description: String::new(),
                    impact: ImpactLevel::Medium,
                    impact_points: 6.3,
                    effort: Effort::Low,
                    current_count: 18,
                    target_max: 12,
                    suggested_values: vec!["4px".into()],
                }],
                token_proposals: Vec::new(),
            },
            None,
        ))
    }

    #[test]
    fn render_error_returns_fatal_exit_code() {
        let code = render_error(DsaError::Config("boom".to_string()), OutputFormat::Json, None);
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn cancellation_exits_130() {
        let code = render_error(DsaError::Cancelled, OutputFormat::Json, None);
        assert_eq!(code, ExitCode::from(CANCELLED_EXIT));
    }

    #[test]
    fn format_pretty_includes_score_categories_and_plan() {
        let pretty = format_pretty(&audit_output(), false);
        assert!(pretty.contains("[AUDIT] Design sprawl score 72 (C)"));
        assert!(pretty.contains("Categories:"));
        assert!(pretty.contains("n/a (analysis failed for this category)"));
        assert!(pretty.contains("Consolidate spacing"));
        assert!(pretty.contains("+6.30 pts"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let output = DsaOutput::Error(ErrorOutput::new(dsa_lib::ErrorPayload {
            category: dsa_lib::ErrorCategory::Config,
            message: "bad input".to_string(),
            remediation: Some("check flags".to_string()),
        }));

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ERROR] bad input"));
        assert!(pretty.contains("Hint: check flags"));
    }
}
