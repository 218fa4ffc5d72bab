//! API handlers for the thesis server
//!
//! - `POST /api/analyze`: upload a `.docx`, get the summary and a report link
//! - `GET /api/report/{job_id}.pdf`: download a cached report
//! - `GET /health`

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::{
    extract::{Multipart, OriginalUri, Path as UrlPath, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use compliance_engine::{compute_summary, ComplianceEngine};
use report_pdf::{render_report, suggested_file_name, write_report, ReportMeta};
use serde::Serialize;
use serde_json::json;
use shared_types::{AnalysisSummary, ReportConfig};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cleanup;
use crate::error::ServerError;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "thesis-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Analysis response body
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub ok: bool,
    pub job_id: String,
    pub student_name: Option<String>,
    pub thesis_title: Option<String>,
    pub pdf_url: String,
    #[serde(flatten)]
    pub summary: AnalysisSummary,
}

/// Whether an uploaded file name has the `.docx` extension
pub fn is_docx(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

struct Analysed {
    summary: AnalysisSummary,
    student_name: Option<String>,
    thesis_title: Option<String>,
}

/// Parse, check and render one upload. Runs on a blocking thread.
fn analyze_upload(
    engine: &ComplianceEngine,
    config: &ReportConfig,
    upload: &Path,
    report: &Path,
    file_name: &str,
) -> Result<Analysed, ServerError> {
    let started = Instant::now();
    let doc = shared_docx::read_docx_file(upload)?;
    let parsed = started.elapsed();

    let analysis = engine.analyze(&doc);
    let summary = compute_summary(&analysis, config);
    let checked = started.elapsed();

    let bytes = render_report(&analysis, &summary, config, &ReportMeta::new(file_name))?;
    write_report(report, &bytes)?;
    let rendered = started.elapsed();

    info!(
        file = %file_name,
        paragraphs = doc.len(),
        parse_ms = parsed.as_millis() as u64,
        check_ms = (checked - parsed).as_millis() as u64,
        render_ms = (rendered - checked).as_millis() as u64,
        score = summary.weighted_pct,
        "analysis finished"
    );

    Ok(Analysed {
        summary,
        student_name: analysis.student_name,
        thesis_title: analysis.thesis_title,
    })
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    cleanup::sweep(&state).await;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_docx(&file_name) {
            return Err(ServerError::UnsupportedFile);
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or(ServerError::MissingFile)?;

    let job_id = Uuid::new_v4().to_string();
    info!(job_id = %job_id, file = %file_name, bytes = bytes.len(), "analysis requested");

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let upload_path = state.upload_path(&job_id);
    tokio::fs::write(&upload_path, &bytes).await?;

    let engine = state.engine.clone();
    let config = state.report.clone();
    let report_path = state.report_path(&job_id);
    let task_upload: PathBuf = upload_path.clone();
    let task_name = file_name.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        analyze_upload(&engine, &config, &task_upload, &report_path, &task_name)
    })
    .await;

    if let Err(e) = tokio::fs::remove_file(&upload_path).await {
        warn!(job_id = %job_id, "could not remove upload: {}", e);
    }
    let analysed = outcome??;

    let download = suggested_file_name(
        analysed.student_name.as_deref(),
        chrono::Local::now().naive_local(),
    );
    debug!(job_id = %job_id, download = %download, "report cached");
    state.downloads.write().await.insert(job_id.clone(), download);

    Ok(Json(AnalyzeResponse {
        ok: true,
        pdf_url: format!("/api/report/{}.pdf", job_id),
        job_id,
        student_name: analysed.student_name,
        thesis_title: analysed.thesis_title,
        summary: analysed.summary,
    }))
}

/// Handler: GET /api/analyze
pub async fn handle_analyze_get(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "ok": false,
            "error": "Bu adres POST ister: /api/analyze adresine dosya POST isteğiyle gönderilmeli.",
            "got_method": method.as_str(),
            "got_url": uri.to_string(),
        })),
    )
        .into_response()
}

/// Handler: GET /api/report/{job_id}.pdf
pub async fn handle_report(
    State(state): State<AppState>,
    UrlPath(file): UrlPath<String>,
) -> Result<Response, ServerError> {
    let job_id = file
        .strip_suffix(".pdf")
        .filter(|id| Uuid::parse_str(id).is_ok())
        .ok_or(ServerError::ReportNotFound)?;

    let bytes = match tokio::fs::read(state.report_path(job_id)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::ReportNotFound)
        }
        Err(e) => return Err(e.into()),
    };

    let name = state
        .downloads
        .read()
        .await
        .get(job_id)
        .cloned()
        .unwrap_or_else(|| format!("{}.pdf", job_id));
    debug!(job_id = %job_id, bytes = bytes.len(), "report served");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_docx() {
        assert!(is_docx("tez.docx"));
        assert!(is_docx("TEZ.DOCX"));
        assert!(!is_docx("tez.doc"));
        assert!(!is_docx("tez.docx.pdf"));
        assert!(!is_docx(""));
    }
}
