//! Bulleted and numbered list items in the body

use std::collections::HashSet;

use shared_types::CheckResult;

use super::{is_list_item, subheadings};
use crate::anchors::AnchorKey;
use crate::checks::primitives::{missing, sweep};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::rules::Rule;

pub(crate) fn list_items(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let Some(range) = ctx.body_range() else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };
    // auto-numbered headings carry list numbering too
    let headings: HashSet<usize> = subheadings(ctx).into_iter().map(|h| h.index).collect();
    let doc = ctx.doc;
    let items: Vec<usize> = range
        .filter(|i| !headings.contains(i))
        .filter(|&i| {
            let p = &doc.paragraphs[i];
            !p.is_blank() && is_list_item(p)
        })
        .collect();

    let Some(&first) = items.first() else {
        return Ok(CheckResult::note(
            &rule.title,
            None,
            "Liste öğesi bulunamadı (kontrol edilmedi)",
        ));
    };
    let issues = sweep(ctx, rule, &items);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FormatSpec;
    use shared_docx::{DocumentBuilder, ParagraphBuilder, Style};

    #[test]
    fn test_list_items_indent() {
        let doc = DocumentBuilder::new()
            .style(Style::paragraph("Heading2", "heading 2"))
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(ParagraphBuilder::new("Amaç").style("Heading2").numbered(1))
            .paragraph(ParagraphBuilder::new("birinci hedef").numbered(0).left_indent(1.0))
            .paragraph(ParagraphBuilder::new("a) ikinci hedef").left_indent(0.5))
            .build();
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            format: FormatSpec {
                left_indent_cm: Some(1.0),
                ..Default::default()
            },
            ..Rule::new("list_items", "Listeler")
        };
        let result = list_items(&mut ctx, &rule).unwrap();
        assert!(!result.passed);
        assert_eq!(result.paragraph, Some(3));
        assert_eq!(
            result.explanation,
            "Paragraf 5: Sol girinti 0.50 cm (beklenen: 1.00 cm)"
        );
    }

    #[test]
    fn test_no_lists_is_a_note() {
        let doc = DocumentBuilder::new().text("BÖLÜM 1").text("GİRİŞ").text("Metin.").build();
        let mut ctx = CheckContext::new(&doc);
        let result = list_items(&mut ctx, &Rule::new("list_items", "Listeler")).unwrap();
        assert!(result.passed);
    }
}
