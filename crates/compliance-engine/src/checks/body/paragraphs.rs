//! Body text paragraphs

use std::collections::HashSet;

use shared_types::CheckResult;

use super::{chapter_lines, is_caption, is_equation, is_list_item, subheadings};
use crate::anchors::AnchorKey;
use crate::checks::global::DEFAULT_EQUATION_FONTS;
use crate::checks::primitives::{missing, sweep};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::normalize::fold;
use crate::rules::Rule;

/// Paragraph indices of running text: the body minus headings, captions,
/// list items, equations and drawings
pub(crate) fn prose(ctx: &mut CheckContext<'_>, rule: &Rule) -> Vec<usize> {
    let Some(range) = ctx.body_range() else {
        return Vec::new();
    };
    let mut skip: HashSet<usize> = chapter_lines(ctx);
    skip.extend(subheadings(ctx).into_iter().map(|h| h.index));

    let equation_fonts: Vec<String> = if rule.equation_fonts.is_empty() {
        DEFAULT_EQUATION_FONTS.iter().map(|f| fold(f)).collect()
    } else {
        rule.equation_fonts.iter().map(|f| fold(f)).collect()
    };

    let ctx = &*ctx;
    range
        .filter(|i| !skip.contains(i))
        .filter(|&i| {
            let p = &ctx.doc.paragraphs[i];
            !p.is_blank()
                && !p.has_drawing
                && !is_caption(&p.text)
                && !is_list_item(p)
                && !is_equation(ctx, p, &equation_fonts)
        })
        .collect()
}

/// Font, size, spacing, indent and justification of the running text
pub(crate) fn body_paragraphs(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    if ctx.body_range().is_none() {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    }
    let paragraphs = prose(ctx, rule);
    let Some(&first) = paragraphs.first() else {
        return Ok(CheckResult::note(
            &rule.title,
            None,
            "Gövde metni paragrafı bulunamadı (kontrol edilmedi)",
        ));
    };
    tracing::debug!(count = paragraphs.len(), "body paragraphs swept");

    let issues = sweep(ctx, rule, &paragraphs);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FormatSpec;
    use pretty_assertions::assert_eq;
    use shared_docx::{Alignment, DocumentBuilder, ParagraphBuilder, RunProps};

    fn justified(text: &str) -> ParagraphBuilder {
        ParagraphBuilder::new(text)
            .align(Alignment::Justify)
            .first_line(1.25)
    }

    fn rule() -> Rule {
        Rule {
            format: FormatSpec {
                alignment: Some(Alignment::Justify),
                first_line_indent_cm: Some(1.25),
                ..Default::default()
            },
            ..Rule::new("body_paragraphs", "Gövde metni")
        }
    }

    #[test]
    fn test_headings_captions_lists_and_equations_are_skipped() {
        let doc = DocumentBuilder::new()
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(justified("Bu çalışmada güneş panellerinin verimliliği incelenmiştir."))
            .text("1.1 Amaç")
            .paragraph(justified("Amaç bölümünde çalışmanın hedefleri açıklanmaktadır."))
            .paragraph(ParagraphBuilder::empty().drawing())
            .text("Şekil 1.1. Düzenek")
            .text("• birinci madde")
            .paragraph(ParagraphBuilder::new("x = 2").math())
            .text("E ≈ mc²")
            .paragraph(
                ParagraphBuilder::empty().run("α + β", RunProps::new().font("Cambria Math")),
            )
            .text("KAYNAKLAR")
            .build();
        let mut ctx = CheckContext::new(&doc);
        assert_eq!(prose(&mut ctx, &rule()), vec![2, 4]);
        let result = body_paragraphs(&mut ctx, &rule()).unwrap();
        assert!(result.passed, "{}", result.explanation);
    }

    #[test]
    fn test_unindented_paragraph_is_reported() {
        let doc = DocumentBuilder::new()
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(justified("Birinci paragraf kurallara uygundur."))
            .paragraph(ParagraphBuilder::new("İkinci paragrafta girinti unutulmuştur.").align(Alignment::Justify))
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = body_paragraphs(&mut ctx, &rule()).unwrap();
        assert!(!result.passed);
        assert_eq!(
            result.explanation,
            "Paragraf 4: İlk satır girintisi 0.00 cm (beklenen: 1.25 cm)"
        );
    }
}
