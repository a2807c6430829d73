use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum DsaError {
    #[error("Page load failed: {0}")]
    Load(String),

    #[error("Style sampling failed: {0}")]
    Sample(String),

    #[error("Audit cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),
}

impl DsaError {
    pub fn load(message: impl Into<String>) -> Self {
        DsaError::Load(message.into())
    }

    pub fn sample(message: impl Into<String>) -> Self {
        DsaError::Sample(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DsaError::Internal(message.into())
    }

    /// Cancellation is a normal termination, never a user-visible failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DsaError::Cancelled)
    }

    /// Whether a page load failure is worth another navigation attempt.
    pub fn is_transient_load(&self) -> bool {
        let DsaError::Load(msg) = self else {
            return false;
        };
        let lower = msg.to_ascii_lowercase();
        [
            "timeout",
            "timed out",
            "err_connection_reset",
            "err_connection_closed",
            "err_network_changed",
            "err_name_not_resolved",
            "err_internet_disconnected",
            "net::err_aborted",
        ]
        .iter()
        .any(|needle| lower.contains(needle))
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            DsaError::Load(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("private network") {
                    ErrorPayload::new(
                        ErrorCategory::Load,
                        "The URL points to a private or local network address.".to_string(),
                        "Audit a publicly reachable http(s) URL.",
                    )
                } else if lower.contains("timeout") || lower.contains("timed out") {
                    ErrorPayload::new(
                        ErrorCategory::Load,
                        "The page did not finish loading in time.".to_string(),
                        "Try increasing --nav-timeout/--process-timeout, or check that the site responds.",
                    )
                } else if lower.contains("err_name_not_resolved") {
                    ErrorPayload::new(
                        ErrorCategory::Load,
                        "The host name could not be resolved.".to_string(),
                        "Check the URL for typos.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Load,
                        "The page could not be loaded.".to_string(),
                        "Check that the URL is reachable from this machine and retry.",
                    )
                }
            }
            DsaError::Sample(_) => ErrorPayload::new(
                ErrorCategory::Sample,
                "Styles could not be sampled from the page.".to_string(),
                "The page may block script evaluation; retry or audit a different page.",
            ),
            DsaError::Cancelled => ErrorPayload::new(
                ErrorCategory::Cancelled,
                "The audit was cancelled.".to_string(),
                "Re-run the audit when ready.",
            ),
            DsaError::Internal(_) => ErrorPayload::new(
                ErrorCategory::Internal,
                "The audit failed unexpectedly.".to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
            DsaError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("playwright npm package is missing") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Install Playwright (e.g., `npm install playwright` and `npx playwright install chromium`).",
                    )
                } else if lower.contains("chromium executable") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Run `npx playwright install chromium` to download the browser.",
                    )
                } else if lower.contains("spawn playwright helper")
                    || lower.contains("node command")
                    || lower.contains("not found on path")
                {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Install Node.js and ensure the node binary is on PATH.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags and config values (e.g., --viewport WIDTHxHEIGHT).",
                    )
                }
            }
            DsaError::NotFound(id) => ErrorPayload::new(
                ErrorCategory::NotFound,
                format!("No stored report with id {}", id),
                "Pass a report file path or the id printed by `dsa audit --store-dir`.",
            ),
            DsaError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            DsaError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check that the report file is a JSON audit result.",
            ),
            DsaError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Load,
                format!("Invalid URL: {}", e),
                "Verify the URL format (e.g., https://example.com).",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, DsaError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Load,
    Sample,
    Cancelled,
    Internal,
    Config,
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
