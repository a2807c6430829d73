//! Playwright integration for headless browser automation.
//!
//! This module contains the inline Playwright sampling script, error mapping,
//! and availability checks for Node.js and Playwright.

use crate::{DsaError, Result};
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Navigates, settles, screenshots, then samples computed styles in document order.
///
/// argv: url, width, height, navTimeoutMs, idleTimeoutMs, settleMs, screenshotPath,
/// headless, maxText, maxLayout, maxDepth
pub(crate) const SAMPLING_SCRIPT: &str = r#"
const [, url, width, height, navTimeout, idleTimeout, settle, screenshotPath, headlessFlag,
  maxText, maxLayout, maxDepth] = process.argv;

async function run() {
  let browser;
  try {
    const { chromium } = require('playwright');
    browser = await chromium.launch({ headless: headlessFlag !== '0' });
    const context = await browser.newContext({
      viewport: { width: parseInt(width, 10), height: parseInt(height, 10) }
    });
    const page = await context.newPage();

    await page.goto(url, { waitUntil: 'load', timeout: parseInt(navTimeout, 10) });
    // Busy pages never go idle; sample whatever exists when the wait runs out.
    await page
      .waitForLoadState('networkidle', { timeout: parseInt(idleTimeout, 10) })
      .catch(() => {});
    await page.waitForTimeout(parseInt(settle, 10));

    if (screenshotPath) {
      await page.screenshot({ path: screenshotPath, fullPage: false });
    }

    const limits = {
      maxText: parseInt(maxText, 10),
      maxLayout: parseInt(maxLayout, 10),
      maxDepth: parseInt(maxDepth, 10)
    };

    let capture;
    try {
      capture = await page.evaluate(({ maxText, maxLayout, maxDepth }) => {
        const SKIP = new Set(['script', 'style', 'noscript', 'template', 'meta', 'link', 'head', 'br', 'svg', 'path']);

        function selectorHint(el) {
          let hint = el.tagName.toLowerCase();
          if (el.id) hint += '#' + el.id;
          const cls = typeof el.className === 'string' ? el.className.trim().split(/\s+/).filter(Boolean) : [];
          if (cls.length) hint += '.' + cls.slice(0, 2).join('.');
          return hint;
        }

        function backgrounds(el) {
          const chain = [];
          let node = el;
          while (node && node.nodeType === 1 && chain.length < maxDepth) {
            chain.push(window.getComputedStyle(node).backgroundColor);
            node = node.parentElement;
          }
          return chain;
        }

        function record(el, style, rect) {
          return {
            selector: selectorHint(el),
            tag: el.tagName.toLowerCase(),
            rect: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
            backgrounds: backgrounds(el),
            backgroundImage: style.backgroundImage,
            fontSize: style.fontSize,
            fontWeight: style.fontWeight,
            fontFamily: style.fontFamily,
            lineHeight: style.lineHeight,
            color: style.color,
            borderColor: style.borderTopColor,
            borderWidth: style.borderTopWidth,
            margin: [style.marginTop, style.marginRight, style.marginBottom, style.marginLeft],
            padding: [style.paddingTop, style.paddingRight, style.paddingBottom, style.paddingLeft],
            rowGap: style.rowGap,
            columnGap: style.columnGap,
            borderRadius: style.borderRadius,
            boxShadow: style.boxShadow,
            zIndex: style.zIndex,
            opacity: style.opacity,
            transitionDuration: style.transitionDuration
          };
        }

        const body = document.body;
        let pageBackground = body ? window.getComputedStyle(body).backgroundColor : null;
        if (!pageBackground || pageBackground === 'rgba(0, 0, 0, 0)' || pageBackground === 'transparent') {
          pageBackground = window.getComputedStyle(document.documentElement).backgroundColor;
        }

        const text = [];
        const layout = [];
        let truncated = 0;
        if (body) {
          const walker = document.createTreeWalker(body, NodeFilter.SHOW_ELEMENT);
          for (let el = walker.currentNode; el; el = walker.nextNode()) {
            if (text.length >= maxText && layout.length >= maxLayout) {
              truncated++;
              continue;
            }
            if (SKIP.has(el.tagName.toLowerCase())) continue;
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') continue;
            const rect = el.getBoundingClientRect();
            if (rect.width === 0 && rect.height === 0) continue;

            const hasText = Array.from(el.childNodes).some(
              (n) => n.nodeType === Node.TEXT_NODE && n.textContent.trim()
            );
            const rec = record(el, style, rect);
            if (hasText) {
              if (text.length < maxText) text.push(rec);
              else truncated++;
            }
            if (layout.length < maxLayout) layout.push(rec);
            else truncated++;
          }
        }

        return { url: window.location.href, title: document.title, pageBackground, text, layout, truncated };
      }, limits);
    } catch (err) {
      capture = { sampleError: err && err.message ? err.message : String(err) };
    }

    console.log(JSON.stringify({ status: 'ok', capture }));
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    console.log(JSON.stringify({ status: 'error', message }));
    process.exitCode = 1;
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;

/// Timeout for checking node/playwright availability.
pub(crate) const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Script to check if Playwright is installed.
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Error result from the Playwright script.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ScriptError {
    pub status: String,
    pub message: String,
}

/// Maps a spawn error to an appropriate DsaError.
pub(crate) fn map_spawn_error(err: io::Error, command: &str) -> DsaError {
    if err.kind() == io::ErrorKind::NotFound {
        DsaError::Config(format!(
            "Unable to spawn Playwright helper; '{}' was not found on PATH",
            command
        ))
    } else {
        DsaError::Io(err)
    }
}

/// Maps helper output (JSON or plain text) from a failed run to a DsaError.
pub(crate) fn map_playwright_error(status_text: impl Into<String>, output: &str) -> DsaError {
    if let Ok(error) = serde_json::from_str::<ScriptError>(output.trim()) {
        return map_playwright_status_error(&error.status, error.message);
    }
    map_playwright_status_error(&status_text.into(), output.trim().to_string())
}

/// Setup problems become config errors; everything else is a page load failure.
pub(crate) fn map_playwright_status_error(status: &str, message: String) -> DsaError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("cannot find module 'playwright'") {
        DsaError::Config(
            "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
        )
    } else if lower.contains("executable doesn't exist") {
        DsaError::Config(
            "Playwright chromium executable is missing; run `npx playwright install chromium`."
                .to_string(),
        )
    } else {
        DsaError::load(format!("helper status {}: {}", status, message))
    }
}

/// Ensures Node.js is available on the system.
pub(crate) async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            DsaError::Config(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(DsaError::Config(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

/// Ensures the Playwright npm package is installed.
pub(crate) async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            DsaError::Config(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_playwright_error(
            format!("{:?}", output.status),
            &stderr,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_playwright_error_detects_missing_module() {
        let err = map_playwright_error(
            "1",
            r#"{"status":"error","message":"Cannot find module 'playwright'"}"#,
        );
        match err {
            DsaError::Config(msg) => assert!(
                msg.contains("Playwright npm package is missing"),
                "expected missing playwright hint, got: {msg}"
            ),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn map_playwright_error_handles_plain_stderr_missing_module() {
        let err = map_playwright_error(
            "exit status: 1",
            "Error: Cannot find module 'playwright'\n    at Module._resolveFilename",
        );
        assert!(format!("{}", err).contains("npm install playwright"));
    }

    #[test]
    fn missing_browser_binary_is_config_error() {
        let err = map_playwright_status_error(
            "error",
            "browserType.launch: Executable doesn't exist at /root/.cache/ms-playwright".into(),
        );
        assert!(matches!(err, DsaError::Config(ref m) if m.contains("chromium")));
    }

    #[test]
    fn navigation_failures_become_load_errors() {
        let err = map_playwright_error(
            "exit status: 1",
            r#"{"status":"error","message":"page.goto: Timeout 30000ms exceeded."}"#,
        );
        assert!(matches!(err, DsaError::Load(_)));
        assert!(err.is_transient_load());
    }

    #[test]
    fn sampling_script_passes_caps_to_page() {
        assert!(SAMPLING_SCRIPT.contains("maxText"));
        assert!(SAMPLING_SCRIPT.contains("maxLayout"));
        assert!(SAMPLING_SCRIPT.contains("maxDepth"));
        assert!(SAMPLING_SCRIPT.contains("networkidle"));
    }

    #[tokio::test]
    async fn ensure_node_available_fails_for_missing_binary() {
        let result = ensure_node_available("definitely-not-a-binary").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ensure_playwright_available_fails_for_missing_binary() {
        let result = ensure_playwright_available("definitely-not-a-binary").await;
        assert!(result.is_err());
    }
}
