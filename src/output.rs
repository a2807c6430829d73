//! JSON envelopes printed by the `dsa` binary.

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::store::ReportId;
use crate::types::AuditResult;

/// Schema version for output payloads.
pub const DSA_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DsaOutput {
    Audit(AuditOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditOutput {
    pub version: String,
    /// Present when the report was persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<ReportId>,
    pub result: AuditResult,
}

impl AuditOutput {
    pub fn new(result: AuditResult, report_id: Option<ReportId>) -> Self {
        Self {
            version: DSA_OUTPUT_VERSION.to_string(),
            report_id,
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
}

impl ErrorOutput {
    pub fn new(error: ErrorPayload) -> Self {
        Self {
            version: DSA_OUTPUT_VERSION.to_string(),
            error,
        }
    }
}
