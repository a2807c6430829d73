//! Page loading through a Playwright helper process.
//!
//! The helper is spawned per navigation attempt and torn down on completion,
//! error, timeout and cancellation alike.

use crate::config::{Config, SamplingLimits, Viewport};
use crate::progress::AuditContext;
use crate::target::VettedUrl;
use crate::{DsaError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::playwright::{
    ensure_node_available, ensure_playwright_available, map_playwright_error,
    map_playwright_status_error, map_spawn_error, SAMPLING_SCRIPT,
};
use super::raw::ScriptOutput;
use super::{LoadedPage, PageLoader, Screenshot};

/// Configuration for the Playwright loader.
#[derive(Debug, Clone)]
pub struct PlaywrightOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    pub viewport: Viewport,
    pub headless: bool,
    pub navigation_timeout: Duration,
    /// Upper bound on waiting for network idle; exceeding it is not an error.
    pub network_idle_timeout: Duration,
    pub settle_delay: Duration,
    /// Timeout for the entire helper process.
    pub process_timeout: Duration,
    pub navigation_retries: u32,
    pub limits: SamplingLimits,
    /// Where screenshots are written; the system temp dir when unset.
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for PlaywrightOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PlaywrightOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            node_command: config.browser.node_command.clone(),
            viewport: config.viewport,
            headless: config.browser.headless,
            navigation_timeout: config.timeouts.navigation,
            network_idle_timeout: config.timeouts.network_idle,
            settle_delay: config.timeouts.settle,
            process_timeout: config.timeouts.process,
            navigation_retries: config.browser.navigation_retries,
            limits: config.sampling,
            screenshot_dir: None,
        }
    }
}

/// Loads pages by running the sampling script under Node.js + Playwright.
#[derive(Debug, Clone)]
pub struct PlaywrightLoader {
    options: PlaywrightOptions,
}

impl PlaywrightLoader {
    pub fn new(options: PlaywrightOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PlaywrightOptions {
        &self.options
    }

    fn screenshot_path(&self) -> PathBuf {
        let dir = self
            .options
            .screenshot_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        dir.join(format!("dsa-{}.png", uuid::Uuid::new_v4()))
    }

    async fn run_once(
        &self,
        url: &VettedUrl,
        screenshot_path: &std::path::Path,
        ctx: &AuditContext,
    ) -> Result<LoadedPage> {
        let opts = &self.options;
        let mut cmd = Command::new(&opts.node_command);
        cmd.arg("-e")
            .arg(SAMPLING_SCRIPT)
            .arg(url.as_str())
            .arg(opts.viewport.width.to_string())
            .arg(opts.viewport.height.to_string())
            .arg(opts.navigation_timeout.as_millis().to_string())
            .arg(opts.network_idle_timeout.as_millis().to_string())
            .arg(opts.settle_delay.as_millis().to_string())
            .arg(screenshot_path.to_string_lossy().to_string())
            .arg(if opts.headless { "1" } else { "0" })
            .arg(opts.limits.max_text_elements.to_string())
            .arg(opts.limits.max_layout_elements.to_string())
            .arg(opts.limits.max_ancestor_depth.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_error(err, &opts.node_command))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout_pipe {
                let _ = out.read_to_end(&mut buf).await;
            }
            buf
        });

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr_pipe {
                let _ = err.read_to_end(&mut buf).await;
            }
            buf
        });

        let status = tokio::select! {
            _ = ctx.cancelled() => {
                let _ = child.kill().await;
                let _ = child.wait().await;
                tracing::debug!(url = %url, "helper killed after cancellation");
                return Err(DsaError::Cancelled);
            }
            waited = timeout(opts.process_timeout, child.wait()) => match waited {
                Ok(Ok(status)) => status,
                Ok(Err(err)) => return Err(DsaError::Io(err)),
                Err(_) => {
                    let _ = child.kill().await;
                    let _ = child.wait().await;
                    return Err(DsaError::load(format!(
                        "helper timed out after {:?}",
                        opts.process_timeout
                    )));
                }
            },
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&stdout);

        if !status.success() {
            let detail = if stdout.trim().is_empty() {
                String::from_utf8_lossy(&stderr).to_string()
            } else {
                stdout.to_string()
            };
            return Err(map_playwright_error(status.to_string(), &detail));
        }

        let output: ScriptOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
            DsaError::sample(format!("unreadable helper output: {} - raw: {}", e, stdout.trim()))
        })?;
        if output.status != "ok" {
            return Err(map_playwright_status_error(
                &output.status,
                output.message.unwrap_or_default(),
            ));
        }
        let capture = output
            .capture
            .ok_or_else(|| DsaError::sample("helper returned ok status but no capture"))?;

        let screenshot = match tokio::fs::read(screenshot_path).await {
            Ok(bytes) => Some(Screenshot {
                path: screenshot_path.to_path_buf(),
                bytes,
            }),
            Err(err) => {
                tracing::warn!(path = %screenshot_path.display(), error = %err, "screenshot missing");
                None
            }
        };

        tracing::debug!(
            url = %url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "page captured"
        );
        Ok(LoadedPage {
            capture,
            screenshot,
        })
    }
}

impl PageLoader for PlaywrightLoader {
    async fn load(&self, url: &VettedUrl, ctx: &AuditContext) -> Result<LoadedPage> {
        let node = &self.options.node_command;
        // Dropping a pending check kills its process.
        tokio::select! {
            _ = ctx.cancelled() => {
                tracing::debug!(url = %url, "cancelled during availability checks");
                return Err(DsaError::Cancelled);
            }
            checked = async {
                ensure_node_available(node).await?;
                ensure_playwright_available(node).await
            } => checked?,
        }

        if let Some(dir) = &self.options.screenshot_dir {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                DsaError::Config(format!("Failed to create screenshot dir: {}", e))
            })?;
        }
        let screenshot_path = self.screenshot_path();
        let attempts = self.options.navigation_retries + 1;
        let mut attempt = 1;
        loop {
            ctx.check_cancelled()?;
            match self.run_once(url, &screenshot_path, ctx).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < attempts && err.is_transient_load() => {
                    tracing::warn!(url = %url, attempt, error = %err, "transient load failure; retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
