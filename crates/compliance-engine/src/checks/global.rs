//! Whole-document checks: page geometry and the body font

use shared_docx::{Orientation, PageSetup};
use shared_types::CheckResult;

use super::primitives::{at, DEFAULT_MAX_REPORTS};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::format::round2;
use crate::normalize::fold;
use crate::rules::{MarginSpec, PaperSpec, Rule};

const DEFAULT_GEOMETRY_TOLERANCE: f32 = 0.1;
pub(crate) const DEFAULT_EQUATION_FONTS: &[&str] = &["Cambria Math", "Symbol", "MT Extra"];

fn geometry_tolerance(rule: &Rule) -> f32 {
    rule.format
        .indent_tolerance
        .unwrap_or(DEFAULT_GEOMETRY_TOLERANCE)
}

fn margin_issues(setup: &PageSetup, expected: &MarginSpec, tolerance: f32) -> Vec<String> {
    let m = &setup.margins;
    [
        ("Üst", m.top, expected.top),
        ("Alt", m.bottom, expected.bottom),
        ("Sol", m.left, expected.left),
        ("Sağ", m.right, expected.right),
    ]
    .into_iter()
    .filter(|(_, found, want)| (found - want).abs() > tolerance)
    .map(|(side, found, want)| {
        format!(
            "{} kenar boşluğu {:.2} cm (beklenen: {:.2} cm)",
            side,
            round2(found),
            want
        )
    })
    .collect()
}

/// Every section's margins against the portrait or landscape expectation
pub(crate) fn page_margins(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let portrait = rule
        .margins
        .ok_or_else(|| CheckError::missing(&rule.check, "margins"))?;
    let landscape = rule.landscape_margins.unwrap_or(portrait);
    let tolerance = geometry_tolerance(rule);

    if ctx.doc.sections.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            None,
            "Sayfa yapısı bilgisi bulunamadı",
        ));
    }

    let multiple = ctx.doc.sections.len() > 1;
    let mut issues = Vec::new();
    for (n, setup) in ctx.doc.sections.iter().enumerate() {
        let expected = match setup.orientation {
            Orientation::Portrait => &portrait,
            Orientation::Landscape => &landscape,
        };
        for issue in margin_issues(setup, expected, tolerance) {
            if multiple {
                issues.push(format!("Sayfa bölümü {}: {}", n + 1, issue));
            } else {
                issues.push(issue);
            }
        }
    }

    Ok(CheckResult::from_issues(&rule.title, None, issues))
}

/// Paper dimensions of every section (orientation-aware)
pub(crate) fn paper_size(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let paper = rule.paper.unwrap_or_default();
    let tolerance = geometry_tolerance(rule);

    if ctx.doc.sections.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            None,
            "Sayfa yapısı bilgisi bulunamadı",
        ));
    }

    let mut issues = Vec::new();
    for (n, setup) in ctx.doc.sections.iter().enumerate() {
        let PaperSpec { width_cm, height_cm } = paper;
        let (want_w, want_h) = match setup.orientation {
            Orientation::Portrait => (width_cm, height_cm),
            Orientation::Landscape => (height_cm, width_cm),
        };
        if (setup.width_cm - want_w).abs() > tolerance || (setup.height_cm - want_h).abs() > tolerance
        {
            issues.push(format!(
                "Sayfa bölümü {}: kağıt boyutu {:.2} x {:.2} cm (beklenen: {:.2} x {:.2} cm)",
                n + 1,
                round2(setup.width_cm),
                round2(setup.height_cm),
                want_w,
                want_h
            ));
        }
    }

    Ok(CheckResult::from_issues(&rule.title, None, issues))
}

/// Every visible run must use one of the allowed fonts; equation and
/// exempt fonts are ignored, as are paragraphs holding equations or objects
pub(crate) fn document_font(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let allowed: Vec<String> = if rule.fonts.is_empty() {
        rule.format.font_name.iter().map(|f| fold(f)).collect()
    } else {
        rule.fonts.iter().map(|f| fold(f)).collect()
    };
    if allowed.is_empty() {
        return Err(CheckError::missing(&rule.check, "fonts"));
    }

    let mut ignored: Vec<String> = rule.exempt_fonts.iter().map(|f| fold(f)).collect();
    if rule.equation_fonts.is_empty() {
        ignored.extend(DEFAULT_EQUATION_FONTS.iter().map(|f| fold(f)));
    } else {
        ignored.extend(rule.equation_fonts.iter().map(|f| fold(f)));
    }

    let limit = rule.max_reports.unwrap_or(DEFAULT_MAX_REPORTS);
    let mut findings = Vec::new();
    let mut extra = 0usize;

    for p in &ctx.doc.paragraphs {
        if p.is_blank() || p.has_math || p.has_object {
            continue;
        }
        let mut wrong: Vec<String> = Vec::new();
        for run in p.text_runs() {
            let Some(font) = ctx.resolver.run_font(p, &run.props) else {
                continue;
            };
            let folded = fold(&font);
            if allowed.contains(&folded) || ignored.contains(&folded) {
                continue;
            }
            if !wrong.contains(&font) {
                wrong.push(font);
            }
        }
        if wrong.is_empty() {
            continue;
        }
        if findings.len() < limit {
            findings.push(format!("{}: {}", at(p.index), wrong.join(", ")));
        } else {
            extra += 1;
        }
    }

    if findings.is_empty() {
        return Ok(CheckResult::pass(&rule.title, None));
    }
    if extra > 0 {
        findings.push(format!("ve {} paragraf daha", extra));
    }
    let expected = rule
        .fonts
        .first()
        .or(rule.format.font_name.as_ref())
        .cloned()
        .unwrap_or_default();
    Ok(CheckResult::fail(
        &rule.title,
        None,
        format!(
            "Farklı yazı tipi kullanılmış (beklenen: {}): {}",
            expected,
            findings.join("; ")
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::{DocumentBuilder, Margins, ParagraphBuilder, RunProps};

    fn margins_rule() -> Rule {
        Rule {
            margins: Some(MarginSpec {
                top: 3.0,
                bottom: 2.5,
                left: 3.5,
                right: 2.5,
            }),
            ..Rule::new("page_margins", "Kenar boşlukları")
        }
    }

    #[test]
    fn test_page_margins_pass_and_fail() {
        let doc = DocumentBuilder::new().text("x").build();
        let mut ctx = CheckContext::new(&doc);
        assert!(page_margins(&mut ctx, &margins_rule()).unwrap().passed);

        let doc = DocumentBuilder::new()
            .page(PageSetup::a4_portrait(Margins {
                top: 2.5,
                bottom: 2.5,
                left: 3.5,
                right: 2.5,
            }))
            .text("x")
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = page_margins(&mut ctx, &margins_rule()).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.starts_with("Üst kenar boşluğu 2.50 cm"));
    }

    #[test]
    fn test_paper_size_accepts_landscape_a4() {
        let doc = DocumentBuilder::new()
            .page(PageSetup {
                width_cm: 29.7,
                height_cm: 21.0,
                orientation: Orientation::Landscape,
                margins: Margins {
                    top: 2.5,
                    bottom: 2.5,
                    left: 2.5,
                    right: 2.5,
                },
            })
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = paper_size(&mut ctx, &Rule::new("paper_size", "Kağıt boyutu")).unwrap();
        assert!(result.passed, "{}", result.explanation);
    }

    #[test]
    fn test_paper_size_rejects_letter() {
        let doc = DocumentBuilder::new().page(PageSetup::default()).build();
        let mut ctx = CheckContext::new(&doc);
        let result = paper_size(&mut ctx, &Rule::new("paper_size", "Kağıt boyutu")).unwrap();
        assert!(!result.passed);
    }

    #[test]
    fn test_document_font_skips_equations() {
        let doc = DocumentBuilder::new()
            .text("Times ile yazılmış paragraf")
            .paragraph(ParagraphBuilder::new("x = y").font("Cambria Math"))
            .paragraph(ParagraphBuilder::new("formül").font("Arial").math())
            .paragraph(
                ParagraphBuilder::new("Karışık ")
                    .run("metin", RunProps::new().font("Calibri")),
            )
            .build();
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            fonts: vec!["Times New Roman".into()],
            ..Rule::new("document_font", "Yazı tipi")
        };
        let result = document_font(&mut ctx, &rule).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("Paragraf 4: Calibri"));
        assert!(!result.explanation.contains("Arial"));
        assert!(!result.explanation.contains("Cambria"));
    }
}
