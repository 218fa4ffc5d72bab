//! HTTP endpoint tests using axum-test

use std::io::{Cursor, Write};
use std::path::PathBuf;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use compliance_engine::{ComplianceEngine, RuleBook};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use shared_types::ReportConfig;

use crate::api::is_docx;
use crate::app;
use crate::state::AppState;

const RULES: &str = include_str!("../../../config/rules.yaml");
const REPORT: &str = include_str!("../../../config/report.yaml");

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>T.C.</w:t></w:r></w:p>
<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>ÇUKUROVA ÜNİVERSİTESİ</w:t></w:r></w:p>
<w:p><w:r><w:t>FEN BİLİMLERİ ENSTİTÜSÜ</w:t></w:r></w:p>
<w:p><w:r><w:t>YÜKSEK LİSANS TEZİ</w:t></w:r></w:p>
<w:p><w:r><w:t>Ayşe YILMAZ</w:t></w:r></w:p>
<w:p><w:r><w:t>BÖLÜM 1</w:t></w:r></w:p>
<w:p><w:r><w:t>GİRİŞ</w:t></w:r></w:p>
<w:p><w:pPr><w:ind w:firstLine="709"/></w:pPr><w:r><w:t>Bu çalışmada tez yazım kuralları incelenmektedir.</w:t></w:r></w:p>
<w:p><w:r><w:t>KAYNAKLAR</w:t></w:r></w:p>
<w:p><w:r><w:t>Akın, A., 2020. Güneş enerjisi. Ankara.</w:t></w:r></w:p>
</w:body></w:document>"#;

fn docx_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(DOCUMENT.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf
}

fn scratch() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("thesis-server-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_state() -> AppState {
    let engine = ComplianceEngine::new(RuleBook::from_yaml_str(RULES, "rules.yaml").unwrap());
    let report = ReportConfig::from_yaml_str(REPORT, "report.yaml").unwrap();
    let dir = scratch();
    AppState {
        upload_dir: dir.join("uploads"),
        reports_dir: dir.join("reports"),
        static_dir: dir.join("static"),
        ..AppState::new(engine, report)
    }
}

fn create_test_server() -> (TestServer, AppState) {
    let state = test_state();
    (TestServer::new(app(state.clone())).unwrap(), state)
}

fn upload(name: &str, bytes: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes).file_name(name))
}

#[tokio::test]
async fn test_health_returns_200() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "thesis-server");
}

#[tokio::test]
async fn test_index_is_served() {
    let (server, _) = create_test_server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("/api/analyze"));
}

#[tokio::test]
async fn test_get_analyze_is_method_not_allowed() {
    let (server, _) = create_test_server();
    let response = server.get("/api/analyze").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ok"], false);
    assert_eq!(json["got_method"], "GET");
    assert!(json["got_url"].as_str().unwrap().ends_with("/api/analyze"));
}

#[tokio::test]
async fn test_wrong_extension_is_rejected() {
    let (server, state) = create_test_server();
    let response = server
        .post("/api/analyze")
        .multipart(upload("tez.pdf", b"%PDF-1.7".to_vec()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "Sadece .docx kabul ediliyor.");
    assert!(state.downloads.read().await.is_empty());
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let (server, _) = create_test_server();
    let form = MultipartForm::new().add_text("note", "dosya yok");
    let response = server.post("/api/analyze").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_broken_docx_is_internal_error() {
    let (server, state) = create_test_server();
    let response = server
        .post("/api/analyze")
        .multipart(upload("tez.docx", b"not a zip".to_vec()))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().starts_with("Belge okunamadı"));

    // the upload is removed even when the analysis fails
    let leftovers = std::fs::read_dir(&state.upload_dir).unwrap().count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_analyze_then_download_report() {
    let (server, state) = create_test_server();
    let response = server
        .post("/api/analyze")
        .multipart(upload("tez.docx", docx_bytes()))
        .await;
    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ok"], true);
    let job_id = json["job_id"].as_str().unwrap().to_string();
    let pdf_url = json["pdf_url"].as_str().unwrap().to_string();
    assert_eq!(pdf_url, format!("/api/report/{}.pdf", job_id));

    let overall = &json["overall"];
    let total = overall["total"].as_u64().unwrap();
    assert!(total > 0);
    assert_eq!(
        overall["ok"].as_u64().unwrap() + overall["fail"].as_u64().unwrap(),
        total
    );
    assert!(json["weighted_pct"].as_f64().unwrap() <= 100.0);
    assert!(!json["sections"].as_array().unwrap().is_empty());
    for section in json["sections"].as_array().unwrap() {
        let key = section["key"].as_str().unwrap();
        let violations = json["violations"][key].as_array().unwrap();
        assert_eq!(violations.len() as u64, section["fail"].as_u64().unwrap());
    }

    assert!(state.report_path(&job_id).exists());
    assert_eq!(std::fs::read_dir(&state.upload_dir).unwrap().count(), 0);

    let report = server.get(&pdf_url).await;
    report.assert_status_ok();
    assert_eq!(report.header("content-type"), "application/pdf");
    let disposition = report.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\""));
    assert!(disposition.ends_with(".pdf\""));
    assert!(report.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_unknown_report_is_404() {
    let (server, _) = create_test_server();
    let response = server
        .get(&format!("/api/report/{}.pdf", uuid::Uuid::new_v4()))
        .await;
    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "Rapor bulunamadı veya süresi doldu.");

    server
        .get("/api/report/..%2Fsecret.pdf")
        .await
        .assert_status_not_found();
    server
        .get("/api/report/not-a-job.txt")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_expired_report_is_swept() {
    let (server, mut state) = create_test_server();
    let response = server
        .post("/api/analyze")
        .multipart(upload("tez.docx", docx_bytes()))
        .await;
    response.assert_status_ok();
    let job_id = response.json::<serde_json::Value>()["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    state.retention = std::time::Duration::ZERO;
    crate::cleanup::sweep(&state).await;
    assert!(!state.report_path(&job_id).exists());
    assert!(!state.downloads.read().await.contains_key(&job_id));

    server
        .get(&format!("/api/report/{}.pdf", job_id))
        .await
        .assert_status_not_found();
}

proptest! {
    #[test]
    fn prop_only_docx_extension_accepted(stem in "[a-zA-Z0-9_]{1,12}", ext in "[a-z]{1,5}") {
        let name = format!("{}.{}", stem, ext);
        prop_assert_eq!(is_docx(&name), ext == "docx");
    }
}
