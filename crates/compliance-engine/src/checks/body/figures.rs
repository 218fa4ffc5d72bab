//! Figures: caption placement, caption format and numbering

use shared_docx::{BodyNode, Document};
use shared_types::CheckResult;

use super::{capped, caption_number, caption_numbering, node_after, node_before, CaptionKind};
use crate::anchors::AnchorKey;
use crate::checks::primitives::{at, missing};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::rules::Rule;

fn is_figure_caption(doc: &Document, index: usize) -> bool {
    caption_number(&doc.paragraphs[index].text, CaptionKind::Figure).is_some()
}

fn is_drawing(doc: &Document, node: &BodyNode) -> bool {
    matches!(node, BodyNode::Paragraph(i) if doc.paragraphs[*i].has_drawing)
}

/// Caption paragraph directly below the drawing in paragraph `index`
fn caption_below(doc: &Document, index: usize) -> Option<usize> {
    let pos = doc.body_position(index)?;
    match node_after(doc, pos)? {
        (_, BodyNode::Paragraph(j)) if is_figure_caption(doc, *j) => Some(*j),
        _ => None,
    }
}

/// Caption directly above the drawing that does not belong to an earlier one
fn caption_above(doc: &Document, index: usize) -> Option<usize> {
    let pos = doc.body_position(index)?;
    let (caption_pos, node) = node_before(doc, pos)?;
    let BodyNode::Paragraph(j) = node else {
        return None;
    };
    if !is_figure_caption(doc, *j) {
        return None;
    }
    match node_before(doc, caption_pos) {
        Some((_, previous)) if is_drawing(doc, previous) => None,
        _ => Some(*j),
    }
}

/// Every drawing in the body has its caption right below it
pub(crate) fn figure_captions(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(range) = ctx.body_range() else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };
    let doc = ctx.doc;
    let figures: Vec<usize> = range.filter(|&i| doc.paragraphs[i].has_drawing).collect();
    let Some(&first) = figures.first() else {
        return Ok(CheckResult::note(
            &rule.title,
            None,
            "Şekil bulunamadı (kontrol edilmedi)",
        ));
    };

    let mut issues = Vec::new();
    let mut captions = Vec::new();
    for &figure in &figures {
        // caption typed into the drawing's own paragraph
        if is_figure_caption(doc, figure) {
            captions.push(figure);
            continue;
        }
        if let Some(caption) = caption_below(doc, figure) {
            captions.push(caption);
            continue;
        }
        match caption_above(doc, figure) {
            Some(caption) => issues.push(format!(
                "{}: şekil başlığı şeklin üstünde; altında olmalı",
                at(caption)
            )),
            None => issues.push(format!("{}: şeklin altında şekil başlığı yok", at(figure))),
        }
    }

    for &caption in &captions {
        let found = ctx.resolver.check(&doc.paragraphs[caption], &rule.format);
        if !found.is_empty() {
            issues.push(format!("{}: {}", at(caption), found.join(", ")));
        }
    }

    Ok(CheckResult::from_issues(&rule.title, Some(first), capped(rule, issues)))
}

pub(crate) fn figure_numbering(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    Ok(caption_numbering(ctx, rule, CaptionKind::Figure))
}
