//! Rule-book driven checks not tied to one page: headings found by markers
//! and blank-line runs after any recorded anchor

use shared_types::CheckResult;

use super::primitives::{
    at, blank_run_after, blank_run_before, blank_run_issues, content_issues, missing, search_end,
};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::find_marked;
use crate::normalize::Markers;
use crate::rules::Rule;

/// Find the first paragraph in `start..end` matching the rule's markers
fn find_heading(
    ctx: &CheckContext<'_>,
    rule: &Rule,
    start: usize,
    end: usize,
) -> Result<Option<usize>, CheckError> {
    if rule.markers.is_empty() {
        return Err(CheckError::missing(&rule.check, "markers"));
    }
    let markers = Markers::compile(&rule.markers)?;
    Ok(find_marked(ctx.doc, &markers, start, end))
}

/// A heading that must appear somewhere in the document. The whole document
/// is searched regardless of `after`/`before`, and no anchor is recorded.
pub(crate) fn required_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(index) = find_heading(ctx, rule, 0, ctx.doc.len())? else {
        return Ok(missing(rule, &format!("\"{}\"", rule.title)));
    };
    let issues = content_issues(ctx, rule, &ctx.doc.paragraphs[index])?;
    Ok(CheckResult::from_issues(&rule.title, Some(index), issues))
}

/// A heading located by markers between the `after` and `before` anchors.
/// Records it under `anchor` and checks the blank run above it when bounded.
pub(crate) fn section_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let predecessor = rule.after.and_then(|k| ctx.anchor(k));
    let start = predecessor.map_or(0, |p| p + 1);
    let end = search_end(ctx, rule);

    let Some(index) = find_heading(ctx, rule, start, end)? else {
        return Ok(missing(rule, &format!("\"{}\"", rule.title)));
    };
    if let Some(key) = rule.anchor {
        ctx.set_anchor(key, index);
    }

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let blanks = blank_run_before(ctx, index, start);
        issues.extend(blank_run_issues(ctx, rule, &blanks));
    }
    issues.extend(content_issues(ctx, rule, &ctx.doc.paragraphs[index])?);

    Ok(CheckResult::from_issues(&rule.title, Some(index), issues))
}

/// Blank paragraphs directly after the `after` anchor must number
/// between `min_blank` and `max_blank`
pub(crate) fn blank_run(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let key = rule
        .after
        .ok_or_else(|| CheckError::missing(&rule.check, "after"))?;
    if !rule.has_blank_bounds() && rule.blank_format.is_none() {
        return Err(CheckError::missing(&rule.check, "min_blank"));
    }
    let Some(anchor) = ctx.anchor(key) else {
        return Ok(missing(rule, key.label()));
    };

    let blanks = blank_run_after(ctx, anchor);
    let issues = blank_run_issues(ctx, rule, &blanks)
        .into_iter()
        .map(|issue| format!("{} sonrası: {}", at(anchor), issue))
        .collect();

    Ok(CheckResult::from_issues(&rule.title, Some(anchor), issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::AnchorKey;
    use proptest::prelude::*;
    use shared_docx::{DocumentBuilder, ParagraphBuilder};

    fn doc_with_gap(gap: usize) -> shared_docx::Document {
        DocumentBuilder::new()
            .text("İÇİNDEKİLER")
            .blanks(gap)
            .text("Sayfa")
            .build()
    }

    fn gap_rule(min: usize, max: usize) -> Rule {
        Rule {
            after: Some(AnchorKey::TocHeading),
            min_blank: Some(min),
            max_blank: Some(max),
            ..Rule::new("blank_run", "Başlık sonrası boşluk")
        }
    }

    #[test]
    fn test_blank_run_reports_actual_count() {
        let doc = doc_with_gap(1);
        let mut ctx = CheckContext::new(&doc);
        let result = blank_run(&mut ctx, &gap_rule(2, 3)).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("1 boş satır"));
        assert_eq!(result.paragraph, Some(0));
    }

    #[test]
    fn test_blank_run_extra_lines() {
        let doc = doc_with_gap(5);
        let mut ctx = CheckContext::new(&doc);
        let result = blank_run(&mut ctx, &gap_rule(2, 3)).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("fazladan"));
    }

    #[test]
    fn test_blank_run_optional_anchor_absent() {
        let doc = DocumentBuilder::new().text("metin").build();
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            must_exist: false,
            ..gap_rule(1, 1)
        };
        let result = blank_run(&mut ctx, &rule).unwrap();
        assert!(result.passed);
        assert!(!result.explanation.is_empty());
    }

    #[test]
    fn test_section_heading_records_anchor() {
        let doc = DocumentBuilder::new()
            .text("giriş")
            .paragraph(ParagraphBuilder::new("SİMGELER VE KISALTMALAR").bold())
            .build();
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            markers: vec!["^simgeler".into()],
            anchor: Some(AnchorKey::AbbreviationsHeading),
            format: crate::rules::FormatSpec {
                bold: Some(true),
                ..Default::default()
            },
            ..Rule::new("section_heading", "Simgeler başlığı")
        };
        let result = section_heading(&mut ctx, &rule).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(ctx.state.get(AnchorKey::AbbreviationsHeading), Some(1));
    }

    #[test]
    fn test_required_heading_ignores_window_and_anchor() {
        let doc = DocumentBuilder::new()
            .text("ÖZET")
            .text("İÇİNDEKİLER")
            .text("BÖLÜM 1")
            .build();
        let rule = Rule {
            markers: vec!["^ozet$".into()],
            after: Some(AnchorKey::TocHeading),
            anchor: Some(AnchorKey::AbstractTrHeading),
            ..Rule::new("required_heading", "ÖZET başlığı bulunmalı")
        };

        let mut ctx = CheckContext::new(&doc);
        let result = required_heading(&mut ctx, &rule).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(result.paragraph, Some(0));
        assert_eq!(ctx.state.get(AnchorKey::AbstractTrHeading), None);

        // the same rule as a section heading only looks after the TOC
        let mut ctx = CheckContext::new(&doc);
        let result = section_heading(&mut ctx, &rule).unwrap();
        assert!(!result.passed);
        assert_eq!(ctx.state.get(AnchorKey::AbstractTrHeading), None);
    }

    #[test]
    fn test_required_heading_needs_markers() {
        let doc = DocumentBuilder::new().text("x").build();
        let mut ctx = CheckContext::new(&doc);
        assert!(required_heading(&mut ctx, &Rule::new("required_heading", "x")).is_err());
    }

    proptest! {
        #[test]
        fn blank_run_bounds(min in 1usize..4, span in 0usize..3, delta in 0usize..3) {
            let max = min + span;

            // exactly the minimum passes
            let doc = doc_with_gap(min);
            let mut ctx = CheckContext::new(&doc);
            prop_assert!(blank_run(&mut ctx, &gap_rule(min, max)).unwrap().passed);

            // one short fails and names the count
            let doc = doc_with_gap(min - 1);
            let mut ctx = CheckContext::new(&doc);
            let short = blank_run(&mut ctx, &gap_rule(min, max)).unwrap();
            prop_assert!(!short.passed);
            let needle = format!("{} boş satır var", min - 1);
            prop_assert!(short.explanation.contains(&needle));

            // anything above the maximum mentions the extra lines
            let doc = doc_with_gap(max + 1 + delta);
            let mut ctx = CheckContext::new(&doc);
            let long = blank_run(&mut ctx, &gap_rule(min, max)).unwrap();
            prop_assert!(!long.passed);
            prop_assert!(long.explanation.contains("fazladan"));
        }
    }
}
