use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use dsa_lib::{
    AuditContext, AuditOutput, Auditor, DsaError, DsaOutput, FileStore, PlaywrightLoader,
    PlaywrightOptions, ProgressCallback, ProgressUpdate, VettedUrl,
};
use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::{apply_overrides, format_effective_config, load_config, AuditOverrides};

/// Flags of `dsa audit`.
#[derive(Debug, Clone)]
pub struct AuditArgs {
    pub url: String,
    pub overrides: AuditOverrides,
    pub store_dir: Option<PathBuf>,
    pub screenshot_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Run the audit command.
pub async fn run_audit(
    config_path: Option<PathBuf>,
    verbose: bool,
    args: AuditArgs,
    cancel: CancellationToken,
) -> ExitCode {
    let AuditArgs {
        url,
        overrides,
        store_dir,
        screenshot_dir,
        format,
        output,
    } = args;

    let config = match load_config(config_path.as_deref())
        .and_then(|cfg| apply_overrides(cfg, &overrides))
    {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    if verbose {
        eprintln!("{}", format_effective_config(&config, config_path.as_deref()));
    }

    let url = match VettedUrl::parse(&url) {
        Ok(url) => url,
        Err(err) => return render_error(err, format, output),
    };

    let mut options = PlaywrightOptions::from_config(&config);
    options.screenshot_dir = screenshot_dir;
    let auditor = Auditor::new(config, PlaywrightLoader::new(options));
    let ctx = AuditContext::new(Some(progress_printer(verbose)), cancel);

    let outcome = match &store_dir {
        Some(dir) => {
            let store = FileStore::new(dir);
            auditor
                .run_and_save(&url, &ctx, &store)
                .await
                .map(|(id, result)| (Some(id), result))
        }
        None => auditor.run(&url, &ctx).await.map(|result| (None, result)),
    };
    let (report_id, result) = match outcome {
        Ok(done) => done,
        Err(err) => return render_error(err, format, output),
    };

    let body = DsaOutput::Audit(AuditOutput::new(result, report_id));
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(DsaError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

/// Progress goes to stderr, and only in verbose mode, so stdout stays parseable.
fn progress_printer(verbose: bool) -> ProgressCallback {
    Arc::new(move |update: &ProgressUpdate| {
        tracing::debug!(phase = %update.phase, percent = update.percent, "{}", update.message);
        if verbose {
            eprintln!("[{:>3}%] {}: {}", update.percent, update.phase, update.message);
        }
        Ok(())
    })
}
