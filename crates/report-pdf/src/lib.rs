//! PDF compliance report
//!
//! Lays out analysed rule results as one table per section, with vector
//! pass/fail marks and the weighted compliance score at the top. Pages are
//! written with lopdf using the standard Helvetica faces.

pub mod canvas;
pub mod error;
pub mod fonts;
pub mod table;

use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use shared_types::text::fold;
use shared_types::{AnalysisSummary, ReportConfig, ThesisAnalysis};
use tracing::debug;

pub use canvas::{Canvas, Rgb};
pub use error::ReportError;
pub use fonts::Font;

use canvas::{MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use table::{draw_header, draw_rule, section_lead, Columns};

/// Details printed in the report's metadata block
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub file_name: String,
    pub generated_at: DateTime<Local>,
}

impl ReportMeta {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            generated_at: Local::now(),
        }
    }
}

/// Color of a score: green from 90, orange from 70, red below
pub fn score_color(pct: f64) -> Rgb {
    if pct >= 90.0 {
        Rgb::GREEN
    } else if pct >= 70.0 {
        Rgb::ORANGE
    } else {
        Rgb::RED
    }
}

/// Download name for a report: `<student>_<timestamp>.pdf`
pub fn suggested_file_name(student: Option<&str>, at: NaiveDateTime) -> String {
    let mut stem = String::new();
    for c in fold(student.unwrap_or_default()).chars() {
        let c = match c {
            c if c.is_ascii_alphanumeric() => c,
            ' ' | '-' | '_' => '_',
            _ => continue,
        };
        if c == '_' && (stem.is_empty() || stem.ends_with('_')) {
            continue;
        }
        stem.push(c);
    }
    let stem = stem.trim_end_matches('_');
    let stem = if stem.is_empty() { "tez" } else { stem };
    format!("{}_{}.pdf", stem, at.format("%Y%m%d_%H%M%S"))
}

/// Write rendered report bytes, creating the parent directory when needed
pub fn write_report(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let io = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    std::fs::write(path, bytes).map_err(io)
}

fn draw_title_block(
    canvas: &mut Canvas,
    analysis: &ThesisAnalysis,
    summary: &AnalysisSummary,
    config: &ReportConfig,
    meta: &ReportMeta,
) {
    for line in &config.title_lines {
        let width = fonts::text_width(line, Font::Bold, 14.0);
        canvas.y -= 16.0;
        canvas.text((PAGE_WIDTH - width) / 2.0, canvas.y, Font::Bold, 14.0, Rgb::BLACK, line);
    }
    canvas.y -= 12.0;

    if config.show_metadata {
        let mut rows = vec![(
            "Öğrenci",
            analysis.student_name.clone().unwrap_or_else(|| "-".to_string()),
        )];
        if let Some(title) = &analysis.thesis_title {
            rows.push(("Tez başlığı", title.clone()));
        }
        rows.push(("Dosya", meta.file_name.clone()));
        rows.push(("Tarih", meta.generated_at.format("%d.%m.%Y %H:%M").to_string()));
        for (label, value) in rows {
            canvas.y -= 12.0;
            canvas.text(MARGIN, canvas.y, Font::Bold, 9.0, Rgb::BLACK, &format!("{}:", label));
            let lines = fonts::wrap(&value, Font::Regular, 9.0, Canvas::content_width() - 70.0);
            for (k, line) in lines.iter().enumerate() {
                if k > 0 {
                    canvas.y -= 11.0;
                }
                canvas.text(MARGIN + 70.0, canvas.y, Font::Regular, 9.0, Rgb::BLACK, line);
            }
        }
        canvas.y -= 10.0;
    }

    let color = score_color(summary.weighted_pct);
    canvas.y -= 16.0;
    canvas.text(
        MARGIN,
        canvas.y,
        Font::Bold,
        13.0,
        color,
        &format!("Genel Uyum Puanı: %{:.1}", summary.weighted_pct),
    );

    canvas.y -= 12.0;
    let groups: Vec<String> = summary
        .groups
        .iter()
        .filter(|g| g.total > 0)
        .map(|g| format!("{} %{:.1} ({}/{})", g.label, g.pct, g.ok, g.total))
        .collect();
    let detail = format!(
        "{} kuraldan {} uygun (%{:.1})   {}",
        summary.overall.total,
        summary.overall.ok,
        summary.overall.pct,
        groups.join("  |  ")
    );
    canvas.text(MARGIN, canvas.y, Font::Regular, 8.5, Rgb::GRAY, &detail);

    canvas.y -= 12.0;
    let bar_width = Canvas::content_width();
    let filled = bar_width * (summary.weighted_pct.clamp(0.0, 100.0) / 100.0) as f32;
    canvas.fill_rect(MARGIN, canvas.y, bar_width, 5.0, Rgb::LIGHT_GRAY);
    if filled > 0.0 {
        canvas.fill_rect(MARGIN, canvas.y, filled, 5.0, color);
    }
    canvas.y -= 14.0;
}

fn footer(page: usize, pages: usize) -> Vec<Operation> {
    let mut canvas = Canvas::new();
    let label = format!("Sayfa {} / {}", page, pages);
    let width = fonts::text_width(&label, Font::Regular, 8.0);
    canvas.text(PAGE_WIDTH - MARGIN - width, MARGIN / 2.0, Font::Regular, 8.0, Rgb::GRAY, &label);
    canvas.finish().into_iter().flatten().collect()
}

/// Lay out every page's drawing operations
pub fn layout(
    analysis: &ThesisAnalysis,
    summary: &AnalysisSummary,
    config: &ReportConfig,
    meta: &ReportMeta,
) -> Vec<Vec<Operation>> {
    let columns = Columns::from_config(config);
    let mut canvas = Canvas::new();
    draw_title_block(&mut canvas, analysis, summary, config, meta);

    for section in &summary.sections {
        let Some(results) = analysis.section(&section.key) else {
            continue;
        };
        let lead = 24.0 + section_lead(&columns, results.results.first());
        if !canvas.fits(lead) {
            canvas.new_page();
        }
        canvas.y -= 16.0;
        canvas.text(MARGIN, canvas.y, Font::Bold, 11.0, Rgb::BLACK, &section.label);
        let stats = format!("{}/{} uygun (%{:.1})", section.ok, section.total, section.pct);
        let width = fonts::text_width(&stats, Font::Regular, 9.0);
        canvas.text(
            PAGE_WIDTH - MARGIN - width,
            canvas.y,
            Font::Regular,
            9.0,
            score_color(section.pct),
            &stats,
        );
        canvas.y -= 6.0;

        draw_header(&mut canvas, &columns);
        for (i, result) in results.results.iter().enumerate() {
            draw_rule(&mut canvas, &columns, i + 1, result);
        }
        canvas.y -= 8.0;
    }

    let mut pages = canvas.finish();
    let count = pages.len();
    for (i, ops) in pages.iter_mut().enumerate() {
        ops.extend(footer(i + 1, count));
    }
    pages
}

fn font_dict(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(font.base_font().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Serialize laid-out pages into a PDF file
pub fn assemble(pages: Vec<Vec<Operation>>, title: &str) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dict(Font::Regular));
    let bold_id = doc.add_object(font_dict(Font::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let bytes = content
            .encode()
            .map_err(|e| ReportError::ContentError(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), bytes));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(fonts::encode(title)),
        "Producer" => Object::string_literal("thesis-check"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ReportError::SerializationError(e.to_string()))?;
    Ok(buffer)
}

/// Render the full report
pub fn render_report(
    analysis: &ThesisAnalysis,
    summary: &AnalysisSummary,
    config: &ReportConfig,
    meta: &ReportMeta,
) -> Result<Vec<u8>, ReportError> {
    let pages = layout(analysis, summary, config, meta);
    let page_count = pages.len();
    let title = config
        .title_lines
        .first()
        .cloned()
        .unwrap_or_else(|| "Uyum Raporu".to_string());
    let bytes = assemble(pages, &title)?;
    debug!(pages = page_count, bytes = bytes.len(), "report rendered");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use shared_types::{CheckResult, GroupScore, OverallSummary, SectionResults, SectionSummary};

    fn analysis(rules: usize) -> ThesisAnalysis {
        let results = (0..rules)
            .map(|i| {
                if i % 3 == 0 {
                    CheckResult::fail(
                        &format!("Kural {} başlığı", i + 1),
                        Some(i),
                        "Yazı tipi Arial (beklenen: Times New Roman); Punto 11 (beklenen: 12)",
                    )
                } else {
                    CheckResult::pass(&format!("Kural {} başlığı", i + 1), Some(i))
                }
            })
            .collect();
        ThesisAnalysis {
            sections: vec![SectionResults {
                key: "ic_kapak".into(),
                results,
            }],
            student_name: Some("Ayşe Yılmaz".into()),
            thesis_title: Some("GÜNEŞ ENERJİSİ".into()),
            paragraph_count: 10,
        }
    }

    fn summary(analysis: &ThesisAnalysis) -> AnalysisSummary {
        let section = &analysis.sections[0];
        let (ok, total) = (section.passed(), section.results.len());
        let pct = ok as f64 * 100.0 / total as f64;
        AnalysisSummary {
            overall: OverallSummary {
                pct,
                total,
                ok,
                fail: total - ok,
            },
            weighted_pct: pct,
            groups: vec![GroupScore {
                key: "front_matter".into(),
                label: "Ön Kısım".into(),
                weight: 0.15,
                total,
                ok,
                pct,
            }],
            sections: vec![SectionSummary {
                key: section.key.clone(),
                label: "BAŞLIK SAYFASI".into(),
                total,
                ok,
                fail: total - ok,
                pct,
            }],
            violations: Default::default(),
        }
    }

    fn page_text(doc: &Document) -> Vec<u8> {
        doc.get_pages()
            .values()
            .flat_map(|id| doc.get_page_content(*id).unwrap())
            .collect()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_render_single_page_report() {
        let analysis = analysis(6);
        let bytes = render_report(
            &analysis,
            &summary(&analysis),
            &ReportConfig::default(),
            &ReportMeta::new("tez.docx"),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let text = page_text(&doc);
        assert!(contains(&text, b"BASLIK SAYFASI"));
        assert!(contains(&text, b"Ayse Yilmaz"));
        assert!(contains(&text, b"tez.docx"));
        assert!(contains(&text, b"Punto 11"));
        assert!(contains(&text, b"Sayfa 1 / 1"));
    }

    #[test]
    fn test_long_report_spans_pages() {
        let analysis = analysis(120);
        let bytes = render_report(
            &analysis,
            &summary(&analysis),
            &ReportConfig::default(),
            &ReportMeta::new("tez.docx"),
        )
        .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages().len();
        assert!(pages > 2, "{} pages", pages);
        // header row is repeated on continuation pages
        let last = *doc.get_pages().values().last().unwrap();
        let content = doc.get_page_content(last).unwrap();
        assert!(contains(&content, b"Kural"));
        assert!(contains(&content, format!("Sayfa {} / {}", pages, pages).as_bytes()));
    }

    #[test]
    fn test_metadata_block_can_be_hidden() {
        let analysis = analysis(3);
        let config = ReportConfig {
            show_metadata: false,
            ..Default::default()
        };
        let pages = layout(&analysis, &summary(&analysis), &config, &ReportMeta::new("gizli.docx"));
        let text: Vec<u8> = pages
            .iter()
            .flatten()
            .filter(|op| op.operator == "Tj")
            .flat_map(|op| op.operands[0].as_str().unwrap().to_vec())
            .collect();
        assert!(!contains(&text, b"gizli.docx"));
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(95.0), Rgb::GREEN);
        assert_eq!(score_color(90.0), Rgb::GREEN);
        assert_eq!(score_color(70.0), Rgb::ORANGE);
        assert_eq!(score_color(69.9), Rgb::RED);
    }

    #[test]
    fn test_suggested_file_name() {
        let at = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(13, 7, 9)
            .unwrap();
        assert_eq!(
            suggested_file_name(Some("Ayşe Çağla Işık"), at),
            "ayse_cagla_isik_20260504_130709.pdf"
        );
        assert_eq!(suggested_file_name(None, at), "tez_20260504_130709.pdf");
        assert_eq!(suggested_file_name(Some(" / "), at), "tez_20260504_130709.pdf");
        // same folding as the checker, circumflex letters included
        assert_eq!(
            suggested_file_name(Some("Âlim  ÖZGÜR-İNCE"), at),
            format!("{}_20260504_130709.pdf", fold("Âlim ÖZGÜR_İNCE").replace(' ', "_"))
        );
        assert_eq!(
            suggested_file_name(Some("Âlim  ÖZGÜR-İNCE"), at),
            "alim_ozgur_ince_20260504_130709.pdf"
        );
    }

    #[test]
    fn test_write_report_creates_directory() {
        let dir = std::env::temp_dir().join(format!("report-pdf-{}", std::process::id()));
        let path = dir.join("nested").join("r.pdf");
        write_report(&path, b"%PDF-1.7").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
