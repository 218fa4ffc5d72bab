//! Thesis format compliance engine
//!
//! Runs an ordered, sectioned rule book over a parsed `.docx` document. Each
//! rule names a check procedure; checks locate landmarks relative to the ones
//! found before them, compare the effective formatting there with the rule,
//! and record what they found for the checks that follow.

pub mod anchors;
pub mod checks;
pub mod context;
pub mod error;
mod fallback;
pub mod format;
pub mod normalize;
pub mod numbering;
pub mod rules;
pub mod summary;

use std::path::Path;

use shared_docx::Document;
use shared_types::{SectionResults, ThesisAnalysis};
use tracing::{debug, info};

pub use anchors::{AnchorKey, AnchorState, ChapterBlock};
pub use context::CheckContext;
pub use error::{CheckError, RuleConfigError};
pub use rules::{FormatSpec, Rule, RuleBook, RuleSection};
pub use summary::compute_summary;

/// ComplianceEngine entry point
#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    rules: RuleBook,
}

impl ComplianceEngine {
    pub fn new(rules: RuleBook) -> Self {
        Self { rules }
    }

    /// Load the rule book from a `rules.yaml` file
    pub fn from_path(path: &Path) -> Result<Self, RuleConfigError> {
        let rules = RuleBook::from_path(path)?;
        for rule in rules.rules() {
            if !checks::is_known(&rule.check) {
                tracing::warn!(check = %rule.check, title = %rule.title, "rule uses an unknown check");
            }
        }
        info!(
            path = %path.display(),
            sections = rules.sections.len(),
            rules = rules.rule_count(),
            "rule book loaded"
        );
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Run every rule over `doc`, section by section, with a fresh anchor state
    pub fn analyze(&self, doc: &Document) -> ThesisAnalysis {
        let mut ctx = CheckContext::new(doc);
        let mut sections = Vec::with_capacity(self.rules.sections.len());

        for section in &self.rules.sections {
            debug!(section = %section.key, rules = section.rules.len(), "section started");
            let results = section
                .rules
                .iter()
                .map(|rule| {
                    let result = checks::run(&mut ctx, rule);
                    debug!(
                        check = %rule.check,
                        passed = result.passed,
                        paragraph = ?result.paragraph,
                        "rule checked"
                    );
                    result
                })
                .collect();
            sections.push(SectionResults {
                key: section.key.clone(),
                results,
            });
        }

        let analysis = ThesisAnalysis {
            student_name: ctx.student_name(),
            thesis_title: ctx.thesis_title(),
            paragraph_count: doc.len(),
            sections,
        };

        let failed: usize = analysis.sections.iter().map(|s| s.failed()).sum();
        info!(
            paragraphs = doc.len(),
            rules = analysis.total_rules(),
            failed,
            anchors = ctx.state.len(),
            "document analysed"
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_docx::{Alignment, Document, DocumentBuilder, ParagraphBuilder};
    use shared_types::{CheckResult, ThesisAnalysis};

    const BUNDLED_RULES: &str = include_str!("../../../config/rules.yaml");

    fn bundled() -> ComplianceEngine {
        ComplianceEngine::new(RuleBook::from_yaml_str(BUNDLED_RULES, "rules.yaml").unwrap())
    }

    #[test]
    fn test_bundled_rule_book_uses_known_checks() {
        let engine = bundled();
        assert!(engine.rules().rule_count() >= 80);
        for rule in engine.rules().rules() {
            assert!(checks::is_known(&rule.check), "unknown check {}", rule.check);
        }
    }

    #[test]
    fn test_every_rule_yields_one_result() {
        let engine = bundled();
        let doc = DocumentBuilder::new()
            .text("T.C.")
            .text("ÇUKUROVA ÜNİVERSİTESİ")
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(ParagraphBuilder::new("Metin.").first_line(1.25))
            .text("KAYNAKLAR")
            .build();
        let analysis = engine.analyze(&doc);
        assert_eq!(analysis.total_rules(), engine.rules().rule_count());
        for (section, configured) in analysis.sections.iter().zip(&engine.rules().sections) {
            assert_eq!(section.key, configured.key);
            assert_eq!(section.results.len(), configured.rules.len());
        }
    }

    #[test]
    fn test_empty_document_does_not_panic() {
        let engine = bundled();
        let analysis = engine.analyze(&DocumentBuilder::new().build());
        assert_eq!(analysis.paragraph_count, 0);
        assert!(analysis.sections.iter().any(|s| s.failed() > 0));
    }

    fn result<'a>(analysis: &'a ThesisAnalysis, section: &str, title: &str) -> &'a CheckResult {
        analysis
            .section(section)
            .and_then(|s| s.results.iter().find(|r| r.title.starts_with(title)))
            .unwrap_or_else(|| panic!("no result \"{}\" in {}", title, section))
    }

    fn cover_line(text: &str, size: f32) -> ParagraphBuilder {
        ParagraphBuilder::new(text)
            .size(size)
            .bold()
            .align(Alignment::Center)
    }

    struct Cover {
        header_size: f32,
        title: Vec<&'static str>,
        italic_title: bool,
        student_gap: usize,
        thesis_type: &'static str,
    }

    impl Cover {
        fn clean() -> Self {
            Self {
                header_size: 16.0,
                title: vec!["TEZ YAZIM KURALLARININ", "OTOMATİK DENETİMİ"],
                italic_title: false,
                student_gap: 2,
                thesis_type: "YÜKSEK LİSANS TEZİ",
            }
        }

        fn build(&self) -> Document {
            let mut builder = DocumentBuilder::new()
                .paragraph(cover_line("T.C.", self.header_size))
                .paragraph(cover_line("ÇUKUROVA ÜNİVERSİTESİ", 16.0))
                .paragraph(cover_line("FEN BİLİMLERİ ENSTİTÜSÜ", 16.0))
                .paragraph(cover_line("BİLGİSAYAR MÜHENDİSLİĞİ ANABİLİM DALI", 14.0))
                .blanks(3);
            for line in &self.title {
                let p = cover_line(line, 16.0);
                builder = builder.paragraph(if self.italic_title { p.italic() } else { p });
            }
            builder
                .blanks(3)
                .paragraph(cover_line("Ayşe YILMAZ", 14.0))
                .blanks(self.student_gap)
                .paragraph(cover_line(self.thesis_type, 14.0))
                .blanks(3)
                .paragraph(cover_line("HAZİRAN 2024", 14.0))
                .paragraph(cover_line("ADANA", 14.0))
                .build()
        }
    }

    #[test]
    fn test_bundled_clean_cover_passes() {
        let analysis = bundled().analyze(&Cover::clean().build());
        let failures: Vec<_> = analysis
            .section("dis_kapak")
            .unwrap()
            .results
            .iter()
            .filter(|r| !r.passed)
            .collect();
        assert!(failures.is_empty(), "{:#?}", failures);
        assert_eq!(analysis.student_name.as_deref(), Some("Ayşe YILMAZ"));
    }

    #[test]
    fn test_bundled_cover_header_size() {
        let doc = Cover {
            header_size: 14.0,
            ..Cover::clean()
        }
        .build();
        let report = bundled().analyze(&doc);
        let header = result(&report, "dis_kapak", "T.C. ifadesi");
        assert!(!header.passed);
        assert_eq!(header.paragraph, Some(0));
        assert!(header.explanation.contains("14.0"), "{}", header.explanation);
        assert!(header.explanation.contains("16.0"), "{}", header.explanation);
    }

    #[test]
    fn test_bundled_cover_title_at_most_two_lines() {
        let doc = Cover {
            title: vec!["TEZ YAZIM KURALLARININ", "OTOMATİK", "DENETİMİ"],
            ..Cover::clean()
        }
        .build();
        let report = bundled().analyze(&doc);
        let title = result(&report, "dis_kapak", "Tez başlığı en fazla");
        assert!(!title.passed);
        assert!(title.explanation.contains("3 satır; en fazla 2 satır olmalı"), "{}", title.explanation);
    }

    #[test]
    fn test_bundled_cover_title_not_italic() {
        let doc = Cover {
            italic_title: true,
            ..Cover::clean()
        }
        .build();
        let report = bundled().analyze(&doc);
        let title = result(&report, "dis_kapak", "Tez başlığı en fazla");
        assert!(!title.passed);
        assert!(title.explanation.contains("İtalik olmamalı"), "{}", title.explanation);
    }

    #[test]
    fn test_bundled_cover_thesis_type_values() {
        let doc = Cover {
            thesis_type: "SANATTA YETERLİK TEZİ",
            ..Cover::clean()
        }
        .build();
        let report = bundled().analyze(&doc);
        let kind = result(&report, "dis_kapak", "Tez türü 14 punto");
        assert!(!kind.passed);
        assert!(kind.explanation.contains("izin verilen"), "{}", kind.explanation);
    }

    #[test]
    fn test_bundled_cover_student_gap_is_exact() {
        for (gap, passes) in [(1, false), (2, true), (3, false)] {
            let doc = Cover {
                student_gap: gap,
                ..Cover::clean()
            }
            .build();
            let analysis = bundled().analyze(&doc);
            let run = result(&analysis, "dis_kapak", "Öğrenci adı ile tez türü");
            assert_eq!(run.passed, passes, "{} blank lines: {}", gap, run.explanation);
        }
    }

    #[test]
    fn test_bundled_toc_label_gap() {
        let toc = |gap: usize| {
            DocumentBuilder::new()
                .paragraph(cover_line("İÇİNDEKİLER", 12.0))
                .blanks(gap)
                .paragraph(
                    ParagraphBuilder::new("Sayfa")
                        .bold()
                        .align(Alignment::Right),
                )
                .text("ÖZET ..... i")
                .build()
        };
        let engine = bundled();

        let analysis = engine.analyze(&toc(1));
        let label = result(&analysis, "icindekiler", "İçindekiler başlığından sonra");
        assert!(label.passed, "{}", label.explanation);

        let analysis = engine.analyze(&toc(4));
        let label = result(&analysis, "icindekiler", "İçindekiler başlığından sonra");
        assert!(!label.passed);
        assert!(label.explanation.contains("fazladan"), "{}", label.explanation);
    }

    #[test]
    fn test_bundled_abstract_gaps() {
        let page = |author_gap: usize| {
            DocumentBuilder::new()
                .paragraph(cover_line("ÖZET", 12.0))
                .blank()
                .paragraph(cover_line("TEZ YAZIM KURALLARININ OTOMATİK DENETİMİ", 12.0))
                .blank()
                .paragraph(ParagraphBuilder::new("Ayşe YILMAZ").bold())
                .blanks(author_gap)
                .text("Çukurova Üniversitesi Fen Bilimleri Enstitüsü")
                .text("Bilgisayar Mühendisliği Anabilim Dalı")
                .blank()
                .text("Haziran 2024")
                .text("Sayfa: x + 80")
                .blank()
                .text("Bu çalışmada tez yazım kurallarına uygunluk otomatik olarak denetlenmektedir.")
                .build()
        };
        let engine = bundled();

        let analysis = engine.analyze(&page(1));
        for title in [
            "Özet sayfasında tez başlığından sonra",
            "Özet sayfasında öğrenci adından sonra",
            "Özet sayfasında enstitü ve anabilim dalı satırlarından sonra",
        ] {
            let run = result(&analysis, "ozet", title);
            assert!(run.passed, "{}: {}", title, run.explanation);
        }

        let analysis = engine.analyze(&page(2));
        let run = result(&analysis, "ozet", "Özet sayfasında öğrenci adından sonra");
        assert!(!run.passed);
        assert!(run.explanation.contains("fazladan"), "{}", run.explanation);
    }

    #[test]
    fn test_bundled_references_heading_text() {
        let doc = DocumentBuilder::new()
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(ParagraphBuilder::new("Bu çalışmada tez yazım kuralları incelenmektedir.").first_line(1.25))
            .paragraph(cover_line("KAYNAÇA", 12.0))
            .text("Yılmaz, A. (2020). Tez yazımı. Adana.")
            .build();
        let report = bundled().analyze(&doc);
        let heading = result(&report, "kaynaklar", "KAYNAKLAR başlığı");
        assert!(!heading.passed);
        assert_eq!(heading.paragraph, Some(3));
        assert!(heading.explanation.contains("\"KAYNAKLAR\" olmalı"), "{}", heading.explanation);
    }

    #[test]
    fn test_bundled_subheading_levels() {
        let doc = DocumentBuilder::new()
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .text("1.1 Amaç ve kapsam")
            .paragraph(ParagraphBuilder::new("Bu çalışmada tez yazım kuralları incelenmektedir.").first_line(1.25))
            .paragraph(ParagraphBuilder::new("1.1.1 Yöntem").bold())
            .paragraph(ParagraphBuilder::new("Yöntem ayrıntılı olarak bu kısımda anlatılmaktadır.").first_line(1.25))
            .text("KAYNAKLAR")
            .build();
        let analysis = bundled().analyze(&doc);

        let first = result(&analysis, "bolumler", "Birinci düzey");
        assert!(!first.passed);
        assert_eq!(first.paragraph, Some(2));

        let second = result(&analysis, "bolumler", "İkinci düzey");
        assert!(second.passed, "{}", second.explanation);
        assert_eq!(second.paragraph, Some(4));

        let third = result(&analysis, "bolumler", "Üçüncü düzey");
        assert!(third.passed);
        assert!(third.explanation.contains("1.1.1.1 biçiminde"), "{}", third.explanation);
    }

    const LINES: &[&str] = &[
        "",
        "T.C.",
        "ÇUKUROVA ÜNİVERSİTESİ",
        "FEN BİLİMLERİ ENSTİTÜSÜ",
        "KABUL VE ONAY",
        "ÖZET",
        "ABSTRACT",
        "Anahtar Kelimeler: tez, biçim",
        "İÇİNDEKİLER",
        "BÖLÜM 1",
        "GİRİŞ",
        "1.1 Amaç",
        "Şekil 1.1. Düzenek",
        "Tablo 1.1. Sonuçlar",
        "Bu çalışmada tez yazım kurallarına uygunluk incelenmektedir.",
        "KAYNAKLAR",
        "ÖZGEÇMİŞ",
    ];

    proptest! {
        #[test]
        fn prop_analysis_is_idempotent(picks in proptest::collection::vec(0..LINES.len(), 0..40)) {
            let mut builder = DocumentBuilder::new();
            for i in picks {
                builder = builder.text(LINES[i]);
            }
            let doc = builder.build();
            let engine = bundled();
            prop_assert_eq!(engine.analyze(&doc), engine.analyze(&doc));
        }
    }
}
