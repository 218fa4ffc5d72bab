//! Outer cover page

use shared_types::CheckResult;

use super::primitives::{block_check, landmark_check, pattern_issue};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::normalize::{collapse_whitespace, fold, is_upper};
use crate::rules::Rule;

const THESIS_TYPES: &[&str] = &["YÜKSEK LİSANS TEZİ", "DOKTORA TEZİ"];
pub(crate) const TR_MONTH_YEAR: &str =
    r"^(ocak|subat|mart|nisan|mayis|haziran|temmuz|agustos|eylul|ekim|kasim|aralik)\s+\d{4}$";
const TITLE_LINES: usize = 2;

fn no_extra(_: &mut CheckContext<'_>, _: usize, _: &mut Vec<String>) -> Result<(), CheckError> {
    Ok(())
}

pub(crate) fn cover_header(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverHeader, no_extra)
}

pub(crate) fn cover_university(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverUniversity, no_extra)
}

pub(crate) fn cover_institute(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverInstitute, no_extra)
}

/// Department line; the rule's `suffix` (e.g. "ANABİLİM DALI") is checked by
/// the shared content comparison
pub(crate) fn cover_department(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverDepartment, no_extra)
}

/// Title block; its joined text becomes the thesis title other pages are
/// compared with
pub(crate) fn cover_title(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    block_check(
        ctx,
        rule,
        AnchorKey::CoverTitle,
        AnchorKey::CoverTitleEnd,
        TITLE_LINES,
        |ctx, lines, _| {
            let title = lines
                .iter()
                .map(|&i| collapse_whitespace(ctx.text(i)))
                .collect::<Vec<_>>()
                .join(" ");
            if !title.is_empty() {
                ctx.state.thesis_title = Some(title);
            }
            Ok(())
        },
    )
}

pub(crate) fn cover_student(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverStudent, |ctx, index, _| {
        ctx.state.student_name = Some(collapse_whitespace(ctx.text(index)));
        Ok(())
    })
}

pub(crate) fn cover_thesis_type(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverThesisType, |ctx, index, issues| {
        if rule.allowed_values.is_empty() {
            let text = collapse_whitespace(ctx.text(index));
            if !THESIS_TYPES.iter().any(|t| fold(t) == fold(&text)) {
                issues.push(format!(
                    "\"{}\" izin verilen değerlerden biri değil ({})",
                    text,
                    THESIS_TYPES.join(" / ")
                ));
            }
        }
        Ok(())
    })
}

/// Month and year, e.g. "HAZİRAN 2024"
pub(crate) fn cover_date(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverDate, |ctx, index, issues| {
        if rule.pattern.is_none() {
            issues.extend(pattern_issue(ctx.text(index), TR_MONTH_YEAR)?);
        }
        Ok(())
    })
}

/// A single upper-case word
pub(crate) fn cover_city(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CoverCity, |ctx, index, issues| {
        let text = collapse_whitespace(ctx.text(index));
        if text.split(' ').count() != 1 {
            issues.push(format!("\"{}\" tek bir şehir adı değil", text));
        } else if !is_upper(&text) {
            issues.push(format!("\"{}\" büyük harflerle yazılmamış", text));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FormatSpec;
    use pretty_assertions::assert_eq;
    use shared_docx::{Alignment, Document, DocumentBuilder, ParagraphBuilder};

    fn cover(header_size: f32) -> Document {
        DocumentBuilder::new()
            .paragraph(
                ParagraphBuilder::new("T.C.")
                    .bold()
                    .size(header_size)
                    .align(Alignment::Center),
            )
            .text("ÇUKUROVA ÜNİVERSİTESİ")
            .text("FEN BİLİMLERİ ENSTİTÜSÜ")
            .text("BİLGİSAYAR MÜHENDİSLİĞİ ANABİLİM DALI")
            .blanks(3)
            .text("DERİN ÖĞRENME İLE")
            .text("GÖRÜNTÜ SINIFLANDIRMA")
            .blanks(2)
            .text("AHMET YILMAZ")
            .blank()
            .text("YÜKSEK LİSANS TEZİ")
            .blank()
            .text("HAZİRAN 2024")
            .text("ADANA")
            .build()
    }

    fn header_rule() -> Rule {
        Rule {
            format: FormatSpec {
                font_size: Some(16.0),
                bold: Some(true),
                alignment: Some(Alignment::Center),
                ..Default::default()
            },
            ..Rule::new("cover_header", "T.C. ibaresi")
        }
    }

    #[test]
    fn test_cover_header_size() {
        let doc = cover(16.0);
        let mut ctx = CheckContext::new(&doc);
        let result = cover_header(&mut ctx, &header_rule()).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(result.paragraph, Some(0));

        let doc = cover(14.0);
        let mut ctx = CheckContext::new(&doc);
        let result = cover_header(&mut ctx, &header_rule()).unwrap();
        assert!(!result.passed);
        assert_eq!(
            result.explanation,
            "Yazı boyutu 14.0 pt (beklenen: 16.0 pt)"
        );
    }

    #[test]
    fn test_cover_title_records_thesis_title() {
        let doc = cover(16.0);
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            min_blank: Some(3),
            max_blank: Some(3),
            ..Rule::new("cover_title", "Tez başlığı")
        };
        let result = cover_title(&mut ctx, &rule).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(ctx.state.get(AnchorKey::CoverTitleEnd), Some(8));
        assert_eq!(
            ctx.state.thesis_title.as_deref(),
            Some("DERİN ÖĞRENME İLE GÖRÜNTÜ SINIFLANDIRMA")
        );
    }

    #[test]
    fn test_cover_fields_in_order() {
        let doc = cover(16.0);
        let mut ctx = CheckContext::new(&doc);
        let department = Rule {
            suffix: Some("Anabilim Dalı".into()),
            ..Rule::new("cover_department", "Anabilim dalı")
        };
        assert!(cover_department(&mut ctx, &department).unwrap().passed);
        assert!(cover_student(&mut ctx, &Rule::new("cover_student", "Öğrenci")).unwrap().passed);
        assert_eq!(ctx.state.student_name.as_deref(), Some("AHMET YILMAZ"));
        assert!(cover_thesis_type(&mut ctx, &Rule::new("cover_thesis_type", "Tez türü")).unwrap().passed);
        assert!(cover_date(&mut ctx, &Rule::new("cover_date", "Tarih")).unwrap().passed);
        assert!(cover_city(&mut ctx, &Rule::new("cover_city", "Şehir")).unwrap().passed);
    }

    #[test]
    fn test_cover_date_rejects_numeric_date() {
        let doc = DocumentBuilder::new()
            .text("DOKTORA TEZİ")
            .text("06.2024")
            .build();
        let mut ctx = CheckContext::new(&doc);
        ctx.set_anchor(AnchorKey::CoverThesisType, 0);
        let result = cover_date(&mut ctx, &Rule::new("cover_date", "Tarih")).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("06.2024"));
    }
}
