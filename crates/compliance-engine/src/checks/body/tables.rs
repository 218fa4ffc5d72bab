//! Tables: caption placement, caption format and numbering

use shared_docx::{BodyNode, Document};
use shared_types::CheckResult;

use super::{capped, caption_number, caption_numbering, node_after, node_before, CaptionKind};
use crate::anchors::AnchorKey;
use crate::checks::primitives::{at, missing};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::rules::Rule;

fn is_table_caption(doc: &Document, node: Option<(usize, &BodyNode)>) -> bool {
    matches!(node, Some((_, BodyNode::Paragraph(j)))
        if caption_number(&doc.paragraphs[*j].text, CaptionKind::Table).is_some())
}

fn is_table(node: Option<(usize, &BodyNode)>) -> bool {
    matches!(node, Some((_, BodyNode::Table(_))))
}

/// Table captions stand directly above their tables
pub(crate) fn table_captions(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(range) = ctx.body_range() else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };
    let doc = ctx.doc;
    let start = doc.body_position(range.start).unwrap_or(0);
    let end = doc.body_position(range.end).unwrap_or(doc.body.len());
    let tables: Vec<usize> = (start..end)
        .filter(|&pos| matches!(doc.body[pos], BodyNode::Table(_)))
        .collect();
    let captions: Vec<usize> = range
        .filter(|&i| caption_number(&doc.paragraphs[i].text, CaptionKind::Table).is_some())
        .collect();
    if tables.is_empty() && captions.is_empty() {
        return Ok(CheckResult::note(
            &rule.title,
            None,
            "Tablo bulunamadı (kontrol edilmedi)",
        ));
    }

    let mut issues = Vec::new();
    for &caption in &captions {
        let Some(pos) = doc.body_position(caption) else {
            continue;
        };
        if !is_table(node_after(doc, pos)) {
            if is_table(node_before(doc, pos)) {
                issues.push(format!(
                    "{}: tablo başlığı tablonun altında; tablonun üstünde olmalı",
                    at(caption)
                ));
            } else {
                issues.push(format!("{}: tablo başlığının altında tablo yok", at(caption)));
            }
        }

        let found = ctx.resolver.check(&doc.paragraphs[caption], &rule.format);
        if !found.is_empty() {
            issues.push(format!("{}: {}", at(caption), found.join(", ")));
        }
    }

    for &pos in &tables {
        let before = node_before(doc, pos);
        // a caption below the table was reported above
        if is_table_caption(doc, before) || is_table_caption(doc, node_after(doc, pos)) {
            continue;
        }
        match before {
            Some((_, BodyNode::Paragraph(j))) => issues.push(format!(
                "{} sonrasındaki tablonun üstünde tablo başlığı yok",
                at(*j)
            )),
            _ => issues.push("Tablonun üstünde tablo başlığı yok".to_string()),
        }
    }

    Ok(CheckResult::from_issues(
        &rule.title,
        captions.first().copied(),
        capped(rule, issues),
    ))
}

pub(crate) fn table_numbering(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    Ok(caption_numbering(ctx, rule, CaptionKind::Table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::DocumentBuilder;

    fn chapter() -> DocumentBuilder {
        DocumentBuilder::new()
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .text("Örneklem aşağıda özetlenmiştir.")
    }

    fn rule() -> Rule {
        Rule::new("table_captions", "Tablo başlıkları")
    }

    #[test]
    fn test_captions_above_tables_pass() {
        let doc = chapter()
            .text("Tablo 1.1. Örneklem özellikleri")
            .table(&["Yaş", "Sayı"])
            .text("Sonuçlar aşağıdaki tabloda yer almaktadır.")
            .text("Tablo 1.2. Sonuçlar")
            .table(&["Değer", "Birim"])
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = table_captions(&mut ctx, &rule()).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(result.paragraph, Some(3));
        assert!(table_numbering(&mut ctx, &rule()).unwrap().passed);
    }

    #[test]
    fn test_caption_below_table_fails() {
        let doc = chapter()
            .table(&["Yaş", "Sayı"])
            .text("Tablo 1.1. Örneklem özellikleri")
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = table_captions(&mut ctx, &rule()).unwrap();
        assert!(!result.passed);
        assert_eq!(
            result.explanation,
            "Paragraf 4: tablo başlığı tablonun altında; tablonun üstünde olmalı"
        );
    }

    #[test]
    fn test_uncaptioned_table_fails() {
        let doc = chapter().table(&["Yaş", "Sayı"]).text("Devam.").build();
        let mut ctx = CheckContext::new(&doc);
        let result = table_captions(&mut ctx, &rule()).unwrap();
        assert!(!result.passed);
        assert_eq!(
            result.explanation,
            "Paragraf 3 sonrasındaki tablonun üstünde tablo başlığı yok"
        );
    }

    #[test]
    fn test_table_outside_body_is_ignored() {
        let doc = DocumentBuilder::new()
            .text("TABLOLAR LİSTESİ")
            .table(&["Tablo 1.1", "3"])
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .text("Metin.")
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = table_captions(&mut ctx, &rule()).unwrap();
        assert!(result.passed);
        assert!(result.explanation.contains("kontrol edilmedi"));
    }
}
