//! Audit context: progress reporting and cancellation threaded through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{DsaError, Result};

/// Coarse pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditPhase {
    Load,
    Sample,
    Analyze,
    Score,
    Complete,
}

impl AuditPhase {
    /// Percentage reported when the phase finishes.
    pub const fn percent(self) -> u8 {
        match self {
            AuditPhase::Load => 40,
            AuditPhase::Sample => 55,
            AuditPhase::Analyze => 80,
            AuditPhase::Score => 95,
            AuditPhase::Complete => 100,
        }
    }
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditPhase::Load => "load",
            AuditPhase::Sample => "sample",
            AuditPhase::Analyze => "analyze",
            AuditPhase::Score => "score",
            AuditPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: AuditPhase,
    pub percent: u8,
    pub message: String,
}

/// The progress sink went away (e.g. the client disconnected).
#[derive(Debug, Clone, Default)]
pub struct ProgressClosed;

impl fmt::Display for ProgressClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("progress receiver closed")
    }
}

impl std::error::Error for ProgressClosed {}

pub type ProgressCallback =
    Arc<dyn Fn(&ProgressUpdate) -> std::result::Result<(), ProgressClosed> + Send + Sync>;

/// Per-audit context. Cloning shares the same cancellation token.
#[derive(Clone, Default)]
pub struct AuditContext {
    progress: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl fmt::Debug for AuditContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditContext")
            .field("progress", &self.progress.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl AuditContext {
    pub fn new(progress: Option<ProgressCallback>, cancel: CancellationToken) -> Self {
        Self { progress, cancel }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Phase-boundary check.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(DsaError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the audit is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Emits a progress update. A failing sink cancels the rest of the audit.
    pub fn report(&self, phase: AuditPhase, message: impl Into<String>) -> Result<()> {
        self.check_cancelled()?;
        let Some(cb) = &self.progress else {
            return Ok(());
        };
        let update = ProgressUpdate {
            phase,
            percent: phase.percent(),
            message: message.into(),
        };
        if let Err(err) = cb(&update) {
            tracing::warn!(%phase, error = %err, "progress callback failed; cancelling audit");
            self.cancel.cancel();
            return Err(DsaError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (ProgressCallback, Arc<Mutex<Vec<ProgressUpdate>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let cb: ProgressCallback = Arc::new(move |u: &ProgressUpdate| {
            sink.lock().unwrap().push(u.clone());
            Ok(())
        });
        (cb, seen)
    }

    #[test]
    fn phases_report_increasing_percentages() {
        let phases = [
            AuditPhase::Load,
            AuditPhase::Sample,
            AuditPhase::Analyze,
            AuditPhase::Score,
            AuditPhase::Complete,
        ];
        assert!(phases.windows(2).all(|w| w[0].percent() < w[1].percent()));
        assert_eq!(AuditPhase::Complete.percent(), 100);
    }

    #[test]
    fn report_forwards_updates() {
        let (cb, seen) = recording();
        let ctx = AuditContext::new(Some(cb), CancellationToken::new());
        ctx.report(AuditPhase::Load, "loaded").unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].phase, AuditPhase::Load);
        assert_eq!(seen[0].percent, 40);
    }

    #[test]
    fn failing_callback_cancels() {
        let cb: ProgressCallback = Arc::new(|_| Err(ProgressClosed));
        let ctx = AuditContext::new(Some(cb), CancellationToken::new());
        let err = ctx.report(AuditPhase::Sample, "x").unwrap_err();
        assert!(err.is_cancelled());
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn no_updates_after_cancellation() {
        let (cb, seen) = recording();
        let token = CancellationToken::new();
        let ctx = AuditContext::new(Some(cb), token.clone());
        token.cancel();
        assert!(ctx.report(AuditPhase::Analyze, "x").is_err());
        assert!(seen.lock().unwrap().is_empty());
    }
}
