//! Time-based sweep of cached reports

use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, error, info};

use crate::state::AppState;

/// Delete `.pdf` files in `dir` last modified at least `retention` ago.
/// Returns how many were removed.
pub fn sweep_expired(dir: &Path, retention: Duration) -> std::io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let now = SystemTime::now();
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        let Ok(modified) = path.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age >= retention {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => debug!(path = %path.display(), "could not remove report: {}", e),
            }
        }
    }
    Ok(removed)
}

/// Sweep the report cache and forget download names of removed reports
pub async fn sweep(state: &AppState) {
    let dir = state.reports_dir.clone();
    let retention = state.retention;
    let removed = match tokio::task::spawn_blocking(move || sweep_expired(&dir, retention)).await {
        Ok(Ok(removed)) => removed,
        Ok(Err(e)) => {
            error!("report sweep failed: {}", e);
            return;
        }
        Err(e) => {
            error!("report sweep task failed: {}", e);
            return;
        }
    };
    if removed == 0 {
        return;
    }
    let mut downloads = state.downloads.write().await;
    downloads.retain(|job_id, _| state.report_path(job_id).exists());
    info!(removed, "expired reports removed");
}

/// Run the sweep on a fixed interval for the lifetime of the server
pub fn spawn_sweeper(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sweep(&state).await;
        }
    });
}
