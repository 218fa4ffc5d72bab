//! Command-line thesis format checker
//!
//! Checks one `.docx` thesis against the rule book and writes the PDF report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use compliance_engine::{compute_summary, ComplianceEngine};
use report_pdf::{render_report, suggested_file_name, write_report, ReportMeta};
use shared_types::ReportConfig;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const RULES_FILE: &str = "rules.yaml";
const REPORT_FILE: &str = "report.yaml";

#[derive(Parser, Debug)]
#[command(name = "thesis-check")]
#[command(version, about = "Check a .docx thesis against the format rules")]
struct Args {
    /// Thesis document (.docx)
    file: PathBuf,

    /// Directory holding rules.yaml and report.yaml
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Directory the PDF report is written to
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// `config/` next to the executable, falling back to `./config`
fn default_config_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("config")))
        .filter(|dir| dir.join(RULES_FILE).exists())
        .unwrap_or_else(|| PathBuf::from("config"))
}

fn check_input(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }
    let is_docx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
    if !is_docx {
        bail!("only .docx files are supported: {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    check_input(&args.file)?;

    let config_dir = args.config_dir.clone().unwrap_or_else(default_config_dir);
    let engine = ComplianceEngine::from_path(&config_dir.join(RULES_FILE))
        .with_context(|| format!("loading rules from {}", config_dir.display()))?;
    let config = ReportConfig::from_path(&config_dir.join(REPORT_FILE))
        .with_context(|| format!("loading report configuration from {}", config_dir.display()))?;

    let started = Instant::now();
    let doc = shared_docx::read_docx_file(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    info!(paragraphs = doc.len(), elapsed = ?started.elapsed(), "document parsed");

    let checking = Instant::now();
    let analysis = engine.analyze(&doc);
    let summary = compute_summary(&analysis, &config);
    info!(rules = analysis.total_rules(), elapsed = ?checking.elapsed(), "rules checked");

    for section in &summary.sections {
        info!(
            "{:<32} {:>3}/{:<3} %{:.1}",
            section.label, section.ok, section.total, section.pct
        );
    }

    let rendering = Instant::now();
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let meta = ReportMeta::new(file_name);
    let bytes = render_report(&analysis, &summary, &config, &meta)?;
    let out = args.out_dir.join(suggested_file_name(
        analysis.student_name.as_deref(),
        meta.generated_at.naive_local(),
    ));
    write_report(&out, &bytes)?;
    info!(elapsed = ?rendering.elapsed(), path = %out.display(), "report written");

    info!(
        "Overall: %{:.1} weighted, {}/{} rules passed, total {:?}",
        summary.weighted_pct,
        summary.overall.ok,
        summary.overall.total,
        started.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_input() {
        let dir = std::env::temp_dir().join(format!("thesis-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let docx = dir.join("tez.DOCX");
        let txt = dir.join("tez.txt");
        std::fs::write(&docx, b"x").unwrap();
        std::fs::write(&txt, b"x").unwrap();

        assert!(check_input(&docx).is_ok());
        let err = check_input(&txt).unwrap_err().to_string();
        assert!(err.starts_with("only .docx"), "{}", err);
        let err = check_input(&dir.join("missing.docx")).unwrap_err().to_string();
        assert!(err.starts_with("file not found"), "{}", err);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["thesis-check", "tez.docx", "--out-dir", "out"]).unwrap();
        assert_eq!(args.file, PathBuf::from("tez.docx"));
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert!(args.config_dir.is_none());
        assert!(Args::try_parse_from(["thesis-check"]).is_err());
    }
}
