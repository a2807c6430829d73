//! Persistence of completed audits behind an opaque report id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use crate::types::AuditResult;
use crate::{DsaError, Result};

/// Opaque handle to a stored report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts only ids this crate could have issued.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim())
            .ok()
            .map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stores completed audits. Failed or cancelled audits are never saved.
pub trait ReportStore: Send + Sync {
    fn save(&self, result: &AuditResult) -> Result<ReportId>;
    fn load(&self, id: &ReportId) -> Result<Option<AuditResult>>;
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: Mutex<HashMap<ReportId, AuditResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportStore for MemoryStore {
    fn save(&self, result: &AuditResult) -> Result<ReportId> {
        let id = ReportId::generate();
        self.reports
            .lock()
            .map_err(|_| DsaError::internal("report store lock poisoned"))?
            .insert(id.clone(), result.clone());
        Ok(id)
    }

    fn load(&self, id: &ReportId) -> Result<Option<AuditResult>> {
        Ok(self
            .reports
            .lock()
            .map_err(|_| DsaError::internal("report store lock poisoned"))?
            .get(id)
            .cloned())
    }
}

/// One pretty-printed JSON file per report: `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &ReportId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }
}

impl ReportStore for FileStore {
    fn save(&self, result: &AuditResult) -> Result<ReportId> {
        fs::create_dir_all(&self.dir)?;
        let id = ReportId::generate();
        let json = serde_json::to_string_pretty(result)?;
        fs::write(self.path_for(&id), json)?;
        tracing::debug!(id = %id, dir = %self.dir.display(), "report saved");
        Ok(id)
    }

    fn load(&self, id: &ReportId) -> Result<Option<AuditResult>> {
        let path = self.path_for(id);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Viewport;
    use crate::types::{Grade, PatternAnalysis, SampleSummary};
    use chrono::Utc;

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
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        let original = result();
        let id = store.save(&original).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(original));
        assert_eq!(store.len(), 1);
        assert!(store.load(&ReportId::generate()).unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("reports"));
        let original = result();
        let id = store.save(&original).unwrap();
        assert!(dir.path().join("reports").join(format!("{id}.json")).exists());
        assert_eq!(store.load(&id).unwrap(), Some(original));
        assert!(store.load(&ReportId::generate()).unwrap().is_none());
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(ReportId::parse("../../etc/passwd").is_none());
        let id = ReportId::generate();
        assert_eq!(ReportId::parse(id.as_str()), Some(id));
    }
}
