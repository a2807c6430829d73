use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dsa_lib::{export, AuditResult, DsaError, ExportFormat, FileStore, ReportId, ReportStore};
use serde::Deserialize;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_text};

/// A report file is either a bare result or a `dsa audit` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReportFile {
    Envelope { result: Box<AuditResult> },
    Bare(Box<AuditResult>),
}

/// Run the export command.
pub fn run_export(
    report: String,
    store_dir: Option<PathBuf>,
    export_format: ExportFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let result = match load_report(&report, store_dir.as_deref()) {
        Ok(result) => result,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };
    tracing::debug!(url = %result.url, format = %export_format, "exporting tokens");

    let content = match export(&result, export_format) {
        Ok(content) => content,
        Err(err) => return render_error(err, OutputFormat::Json, None),
    };
    if let Err(err) = write_text(&content, output.as_deref()) {
        return render_error(DsaError::Io(err), OutputFormat::Json, None);
    }
    ExitCode::SUCCESS
}

/// Resolve `PATH_OR_ID`: an existing file wins, otherwise a report id looked
/// up in the store.
pub fn load_report(reference: &str, store_dir: Option<&Path>) -> Result<AuditResult, DsaError> {
    let path = Path::new(reference);
    if path.is_file() {
        let json = std::fs::read_to_string(path)?;
        let parsed: ReportFile = serde_json::from_str(&json).map_err(|_| {
            DsaError::Config(format!("{} is not a dsa audit result", path.display()))
        })?;
        return Ok(match parsed {
            ReportFile::Envelope { result } | ReportFile::Bare(result) => *result,
        });
    }

    let Some(id) = ReportId::parse(reference) else {
        return Err(DsaError::NotFound(reference.to_string()));
    };
    let Some(dir) = store_dir else {
        return Err(DsaError::Config(
            "--store-dir is required to look up a report by id".to_string(),
        ));
    };
    FileStore::new(dir)
        .load(&id)?
        .ok_or_else(|| DsaError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dsa_lib::types::{PatternAnalysis, SampleSummary};
    use dsa_lib::{AuditOutput, DsaOutput, Grade, Viewport};

    fn result() -> AuditResult {
        AuditResult {
            url: "https://example.com/".into(),
            timestamp: Utc::now(),
            viewport: Viewport::default(),
            screenshot: None,
            samples: SampleSummary::default(),
            sprawl_reports: Vec::new(),
            pattern_analysis: PatternAnalysis::default(),
            overall_score: 100,
            grade: Grade::A,
            fix_plan: Vec::new(),
            token_proposals: Vec::new(),
        }
    }

    #[test]
    fn reads_bare_results_and_envelopes() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("bare.json");
        std::fs::write(&bare, serde_json::to_string(&result()).unwrap()).unwrap();
        let envelope = dir.path().join("envelope.json");
        let body = DsaOutput::Audit(AuditOutput::new(result(), None));
        std::fs::write(&envelope, serde_json::to_string(&body).unwrap()).unwrap();

        assert_eq!(load_report(bare.to_str().unwrap(), None).unwrap().url, "https://example.com/");
        assert_eq!(load_report(envelope.to_str().unwrap(), None).unwrap().overall_score, 100);
    }

    #[test]
    fn ids_resolve_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let id = store.save(&result()).unwrap();
        let loaded = load_report(id.as_str(), Some(dir.path())).unwrap();
        assert_eq!(loaded.grade, Grade::A);

        let missing = ReportId::generate();
        assert!(matches!(
            load_report(missing.as_str(), Some(dir.path())),
            Err(DsaError::NotFound(_))
        ));
        assert!(matches!(load_report(id.as_str(), None), Err(DsaError::Config(_))));
    }

    #[test]
    fn unknown_references_are_not_found() {
        assert!(matches!(load_report("no-such-report", None), Err(DsaError::NotFound(_))));
    }

    #[test]
    fn garbage_files_are_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\"hello\":1}").unwrap();
        assert!(matches!(
            load_report(file.path().to_str().unwrap(), None),
            Err(DsaError::Config(_))
        ));
    }
}
