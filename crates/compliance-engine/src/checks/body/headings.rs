//! Numbered sub-headings (`2.1`, `2.1.1`, …)

use std::collections::HashSet;

use shared_types::CheckResult;

use super::{capped, subheadings};
use crate::anchors::AnchorKey;
use crate::checks::primitives::{at, missing, sweep};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::normalize::collapse_whitespace;
use crate::numbering::{check_sequence, NumberedItem};
use crate::rules::Rule;

/// Format of every sub-heading, or of one level when the rule names it
pub(crate) fn subheading_format(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    if ctx.body_range().is_none() {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    }
    let selected: Vec<usize> = subheadings(ctx)
        .into_iter()
        .filter(|h| rule.level.map_or(true, |level| h.level == level as usize))
        .map(|h| h.index)
        .collect();

    let Some(&first) = selected.first() else {
        let what = match rule.level {
            Some(level) => {
                let shape = vec!["1"; usize::from(level).max(1)].join(".");
                format!("{} biçiminde numaralı alt başlık", shape)
            }
            None => "Alt başlık".to_string(),
        };
        return Ok(CheckResult::note(
            &rule.title,
            None,
            format!("{} bulunamadı (kontrol edilmedi)", what),
        ));
    };

    let issues = sweep(ctx, rule, &selected);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

/// Sub-heading numbers follow their chapters without gaps or regressions.
///
/// Chapter lines take part in the sequence as single-level numbers so that a
/// chapter change resets sections to `N.1`; problems on the chapter lines
/// themselves are left to `chapter_headings`.
pub(crate) fn subheading_numbering(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    if ctx.body_range().is_none() {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    }
    let chapters = ctx.chapters();
    let headings = subheadings(ctx);
    let Some(first) = headings.first().map(|h| h.index) else {
        return Ok(CheckResult::note(
            &rule.title,
            None,
            "Alt başlık bulunamadı (kontrol edilmedi)",
        ));
    };

    let mut items: Vec<NumberedItem> = chapters
        .iter()
        .map(|c| NumberedItem::new(c.number_index, vec![c.number], ctx.text(c.number_index)))
        .collect();
    let mut issues = Vec::new();

    for heading in &headings {
        match &heading.number {
            Some(levels) => items.push(NumberedItem::new(
                heading.index,
                levels.clone(),
                ctx.text(heading.index),
            )),
            // automatic list numbering cannot be read back from the text
            None if ctx.doc.paragraphs[heading.index].is_numbered() => {}
            None => issues.push(format!(
                "{}: \"{}\" alt başlığı numaralandırılmamış",
                at(heading.index),
                collapse_whitespace(ctx.text(heading.index))
            )),
        }
    }
    items.sort_by_key(|item| item.paragraph);

    let chapter_lines: HashSet<usize> = chapters.iter().map(|c| c.number_index).collect();
    issues.extend(
        check_sequence(&items)
            .into_iter()
            .filter(|issue| !chapter_lines.contains(&issue.paragraph))
            .map(|issue| issue.describe()),
    );

    Ok(CheckResult::from_issues(&rule.title, Some(first), capped(rule, issues)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FormatSpec;
    use shared_docx::{Document, DocumentBuilder, ParagraphBuilder, Style};

    fn thesis(numbers: &[&str]) -> Document {
        let mut builder = DocumentBuilder::new().text("BÖLÜM 1").text("GİRİŞ");
        let mut chapter = 1;
        for number in numbers {
            let major: u32 = number.split('.').next().and_then(|n| n.parse().ok()).unwrap_or(1);
            while chapter < major {
                chapter += 1;
                builder = builder
                    .text(&format!("BÖLÜM {}", chapter))
                    .text(&format!("BAŞLIK {}", chapter));
            }
            builder = builder
                .paragraph(ParagraphBuilder::new(&format!("{} Alt Başlık", number)).bold())
                .text("Bu paragraf alt başlığın altında yer alan ve yeterince uzun olan bir gövde metnidir.");
        }
        builder.text("KAYNAKLAR").build()
    }

    #[test]
    fn test_clean_numbering_passes() {
        let doc = thesis(&["1.1", "1.2", "1.2.1", "1.2.2", "1.3", "2.1", "2.1.1", "2.2"]);
        let mut ctx = CheckContext::new(&doc);
        let result = subheading_numbering(&mut ctx, &Rule::new("subheading_numbering", "Numaralar")).unwrap();
        assert!(result.passed, "{}", result.explanation);
    }

    #[test]
    fn test_gap_and_wrong_restart_are_flagged() {
        let doc = thesis(&["1.1", "1.3", "2.2"]);
        let mut ctx = CheckContext::new(&doc);
        let result = subheading_numbering(&mut ctx, &Rule::new("subheading_numbering", "Numaralar")).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("1.1 sonrasında 1.3"));
        assert!(result.explanation.contains("2 sonrasında 2.2"));
    }

    #[test]
    fn test_styled_heading_without_number() {
        let doc = DocumentBuilder::new()
            .style(Style::paragraph("Heading2", "heading 2"))
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .paragraph(ParagraphBuilder::new("Amaç").style("Heading2"))
            .build();
        let mut ctx = CheckContext::new(&doc);
        let result = subheading_numbering(&mut ctx, &Rule::new("subheading_numbering", "Numaralar")).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("\"Amaç\" alt başlığı numaralandırılmamış"));
    }

    #[test]
    fn test_format_by_level() {
        let doc = thesis(&["1.1", "1.1.1"]);
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            level: Some(3),
            format: FormatSpec {
                bold: Some(true),
                ..Default::default()
            },
            ..Rule::new("subheading_format", "Üçüncü düzey başlıklar")
        };
        let result = subheading_format(&mut ctx, &rule).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(result.paragraph, Some(4));
    }

    #[test]
    fn test_absent_level_names_number_shape() {
        let doc = thesis(&["1.1"]);
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            level: Some(3),
            ..Rule::new("subheading_format", "İkinci düzey alt başlıklar")
        };
        let result = subheading_format(&mut ctx, &rule).unwrap();
        assert!(result.passed);
        assert!(result.explanation.contains("1.1.1 biçiminde"), "{}", result.explanation);
    }

    #[test]
    fn test_no_subheadings_is_a_note() {
        let doc = thesis(&[]);
        let mut ctx = CheckContext::new(&doc);
        let result = subheading_format(&mut ctx, &Rule::new("subheading_format", "Alt başlıklar")).unwrap();
        assert!(result.passed);
        assert!(result.explanation.contains("kontrol edilmedi"));
    }
}
