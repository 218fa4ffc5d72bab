//! Shared application state

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use compliance_engine::ComplianceEngine;
use shared_types::ReportConfig;
use tokio::sync::RwLock;

/// Shared application state. Rule book and report configuration are read-only;
/// every analysis builds its own anchor state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ComplianceEngine>,
    pub report: Arc<ReportConfig>,
    pub upload_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Cached reports older than this are deleted
    pub retention: Duration,
    pub max_upload_bytes: usize,
    /// Download names of cached reports, by job id
    pub downloads: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    pub fn new(engine: ComplianceEngine, report: ReportConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            report: Arc::new(report),
            upload_dir: PathBuf::from("uploads_tmp"),
            reports_dir: PathBuf::from("reports_tmp"),
            static_dir: PathBuf::from("static"),
            retention: Duration::from_secs(90 * 60),
            max_upload_bytes: 50 * 1024 * 1024,
            downloads: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn report_path(&self, job_id: &str) -> PathBuf {
        self.reports_dir.join(format!("{}.pdf", job_id))
    }

    pub fn upload_path(&self, job_id: &str) -> PathBuf {
        self.upload_dir.join(format!("{}.docx", job_id))
    }
}
