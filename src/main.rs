mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_audit, run_export, AuditArgs};
use settings::AuditOverrides;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Audit {
            url,
            viewport,
            nav_timeout,
            network_idle_timeout,
            process_timeout,
            store_dir,
            screenshot_dir,
            format,
            output,
        } => {
            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("interrupt received; cancelling audit");
                    on_ctrl_c.cancel();
                }
            });

            run_audit(
                args.config,
                args.verbose,
                AuditArgs {
                    url,
                    overrides: AuditOverrides {
                        viewport,
                        nav_timeout,
                        network_idle_timeout,
                        process_timeout,
                    },
                    store_dir,
                    screenshot_dir,
                    format,
                    output,
                },
                cancel,
            )
            .await
        }
        Commands::Export {
            report,
            store_dir,
            format,
            output,
        } => run_export(report, store_dir, format, output),
    }
}

/// Logs go to stderr: `DSA_LOG` wins, else `debug` with `--verbose`, else `warn`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("DSA_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
