//! Building blocks shared by the check procedures
//!
//! Most checks follow one shape: locate the landmark (from a recorded anchor,
//! the rule's markers or the key's default locator), validate the blank run
//! above it, compare its effective format and text with the rule, and record
//! it for the checks that follow. [`landmark_check`] and [`block_check`]
//! implement that shape; the family modules only add what is specific.

use shared_docx::Paragraph;
use shared_types::CheckResult;

use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::{self, block_lines};
use crate::normalize::{collapse_whitespace, compile_marker, fold, Markers};
use crate::rules::{FormatSpec, Rule};

/// Default number of per-paragraph findings listed by sweeping checks
pub(crate) const DEFAULT_MAX_REPORTS: usize = 15;

/// 1-based paragraph label for explanations
pub(crate) fn at(index: usize) -> String {
    format!("Paragraf {}", index + 1)
}

/// A located landmark and the anchor it was searched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Found {
    pub index: usize,
    pub predecessor: Option<usize>,
}

/// Exclusive end of the search window: the rule's `before` anchor, else the document end
pub(crate) fn search_end(ctx: &mut CheckContext<'_>, rule: &Rule) -> usize {
    rule.before
        .and_then(|k| ctx.anchor(k))
        .unwrap_or(ctx.doc.len())
}

/// Predecessor anchor of `key` under this rule
pub(crate) fn predecessor(ctx: &mut CheckContext<'_>, rule: &Rule, key: AnchorKey) -> Option<usize> {
    rule.after
        .or(fallback::landmark(key).after)
        .and_then(|k| ctx.anchor(k))
}

/// Locate the landmark `key`, honouring the rule's `after`, `before` and `markers`
pub(crate) fn locate(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
    key: AnchorKey,
) -> Result<Option<Found>, CheckError> {
    let predecessor = predecessor(ctx, rule, key);
    let end = search_end(ctx, rule);

    let index = if rule.markers.is_empty() {
        fallback::find(ctx, fallback::landmark(key).finder, predecessor, end)
    } else {
        let markers = Markers::compile(&rule.markers)?;
        fallback::find_marked(ctx.doc, &markers, predecessor.map_or(0, |p| p + 1), end)
    };

    Ok(index.map(|index| Found { index, predecessor }))
}

/// Result for a landmark that could not be found
pub(crate) fn missing(rule: &Rule, what: &str) -> CheckResult {
    if rule.must_exist {
        CheckResult::fail(&rule.title, None, format!("{} bulunamadı", what))
    } else {
        CheckResult::note(
            &rule.title,
            None,
            format!("{} bulunamadı (isteğe bağlı bölüm, kontrol edilmedi)", what),
        )
    }
}

/// Blank paragraphs directly after `anchor`
pub(crate) fn blank_run_after(ctx: &CheckContext<'_>, anchor: usize) -> Vec<usize> {
    (anchor + 1..ctx.doc.len())
        .take_while(|&i| ctx.doc.paragraphs[i].is_blank())
        .collect()
}

/// Blank paragraphs directly above `index`, not reaching below `floor`
pub(crate) fn blank_run_before(ctx: &CheckContext<'_>, index: usize, floor: usize) -> Vec<usize> {
    let mut run: Vec<usize> = (floor..index.min(ctx.doc.len()))
        .rev()
        .take_while(|&i| ctx.doc.paragraphs[i].is_blank())
        .collect();
    run.reverse();
    run
}

fn expected_count(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(a), Some(b)) if a == b => format!("tam {}", a),
        (Some(a), Some(b)) => format!("{}-{}", a, b),
        (Some(a), None) => format!("en az {}", a),
        (None, Some(b)) => format!("en fazla {}", b),
        (None, None) => String::new(),
    }
}

/// Count and format violations of a blank-line run against the rule's bounds
pub(crate) fn blank_run_issues(ctx: &CheckContext<'_>, rule: &Rule, blanks: &[usize]) -> Vec<String> {
    blank_run_issues_with(ctx, rule.min_blank, rule.max_blank, rule.blank_format.as_ref(), blanks)
}

pub(crate) fn blank_run_issues_with(
    ctx: &CheckContext<'_>,
    min: Option<usize>,
    max: Option<usize>,
    blank_format: Option<&FormatSpec>,
    blanks: &[usize],
) -> Vec<String> {
    let mut issues = Vec::new();
    let count = blanks.len();
    let expected = expected_count(min, max);

    if let Some(min) = min {
        if count < min {
            issues.push(format!(
                "{} boş satır var (beklenen: {} boş satır)",
                count, expected
            ));
        }
    }
    if let Some(max) = max {
        if count > max {
            issues.push(format!(
                "{} fazladan boş satır var (toplam {}, beklenen: {} boş satır)",
                count - max,
                count,
                expected
            ));
        }
    }

    if let Some(spec) = blank_format {
        for &i in blanks {
            let found = ctx.resolver.check(&ctx.doc.paragraphs[i], spec);
            if !found.is_empty() {
                issues.push(format!("{} (boş satır): {}", at(i), found.join(", ")));
            }
        }
    }

    issues
}

/// Format, exact-text, suffix, allowed-value and pattern checks for one paragraph
pub(crate) fn content_issues(
    ctx: &CheckContext<'_>,
    rule: &Rule,
    p: &Paragraph,
) -> Result<Vec<String>, CheckError> {
    let mut issues = ctx.resolver.check(p, &rule.format);
    let text = collapse_whitespace(&p.text);

    if let Some(exact) = &rule.exact_text {
        let exact = collapse_whitespace(exact);
        if text != exact {
            issues.push(format!("\"{}\" yazılmış; \"{}\" olmalı", text, exact));
        }
    }

    if let Some(suffix) = &rule.suffix {
        if !fold(&text).ends_with(&fold(suffix)) {
            issues.push(format!("Satır \"{}\" ifadesiyle bitmiyor", suffix));
        }
    }

    if !rule.allowed_values.is_empty() && !rule.allowed_values.iter().any(|v| fold(v) == fold(&text)) {
        issues.push(format!(
            "\"{}\" izin verilen değerlerden biri değil ({})",
            text,
            rule.allowed_values.join(" / ")
        ));
    }

    if let Some(pattern) = &rule.pattern {
        if let Some(issue) = pattern_issue(&text, pattern)? {
            issues.push(issue);
        }
    }

    Ok(issues)
}

/// Violation when folded `text` does not match `pattern`
pub(crate) fn pattern_issue(text: &str, pattern: &str) -> Result<Option<String>, CheckError> {
    let re = compile_marker(pattern)?;
    if re.is_match(&fold(text)) {
        Ok(None)
    } else {
        Ok(Some(format!("\"{}\" beklenen biçimde değil", collapse_whitespace(text))))
    }
}

/// Locate a single-paragraph landmark, validate it and record it as `key`.
///
/// `extra` adds check-specific findings for the located paragraph.
pub(crate) fn landmark_check<F>(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
    key: AnchorKey,
    extra: F,
) -> Result<CheckResult, CheckError>
where
    F: FnOnce(&mut CheckContext<'_>, usize, &mut Vec<String>) -> Result<(), CheckError>,
{
    let Some(found) = locate(ctx, rule, key)? else {
        return Ok(missing(rule, key.label()));
    };
    ctx.set_anchor(key, found.index);

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let floor = found.predecessor.map_or(0, |p| p + 1);
        let blanks = blank_run_before(ctx, found.index, floor);
        issues.extend(blank_run_issues(ctx, rule, &blanks));
    }

    let p = &ctx.doc.paragraphs[found.index];
    issues.extend(content_issues(ctx, rule, p)?);
    extra(ctx, found.index, &mut issues)?;

    Ok(CheckResult::from_issues(&rule.title, Some(found.index), issues))
}

/// Like [`landmark_check`] for a block of consecutive lines (titles,
/// program/advisor lines). The first line is recorded as `key`, the last as
/// `end_key`; `extra` receives all lines of the block.
pub(crate) fn block_check<F>(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
    key: AnchorKey,
    end_key: AnchorKey,
    default_max: usize,
    extra: F,
) -> Result<CheckResult, CheckError>
where
    F: FnOnce(&mut CheckContext<'_>, &[usize], &mut Vec<String>) -> Result<(), CheckError>,
{
    let Some(found) = locate(ctx, rule, key)? else {
        return Ok(missing(rule, key.label()));
    };
    ctx.set_anchor(key, found.index);

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let floor = found.predecessor.map_or(0, |p| p + 1);
        let blanks = blank_run_before(ctx, found.index, floor);
        issues.extend(blank_run_issues(ctx, rule, &blanks));
    }

    let max = rule.max_lines.unwrap_or(default_max).max(1);
    let end = search_end(ctx, rule);
    let all = block_lines(ctx.doc, found.index, end, usize::MAX);
    if all.len() > max {
        issues.push(format!("{} satır; en fazla {} satır olmalı", all.len(), max));
    }
    let lines: Vec<usize> = all.into_iter().take(max).collect();
    if let Some(min) = rule.min_lines {
        if lines.len() < min {
            issues.push(format!("{} satır; en az {} satır olmalı", lines.len(), min));
        }
    }
    if let Some(&last) = lines.last() {
        ctx.set_anchor(end_key, last);
    }

    for &i in &lines {
        let found = content_issues(ctx, rule, &ctx.doc.paragraphs[i])?;
        if found.is_empty() {
            continue;
        }
        if lines.len() > 1 {
            issues.push(format!("{}: {}", at(i), found.join(", ")));
        } else {
            issues.extend(found);
        }
    }
    extra(ctx, &lines, &mut issues)?;

    Ok(CheckResult::from_issues(&rule.title, Some(found.index), issues))
}

/// Non-blank paragraphs in `start..end` up to the first one matching `stops`
pub(crate) fn section_paragraphs(
    ctx: &CheckContext<'_>,
    start: usize,
    end: usize,
    stops: &Markers,
) -> Vec<usize> {
    let end = end.min(ctx.doc.len());
    let mut out = Vec::new();
    for i in start..end {
        let p = &ctx.doc.paragraphs[i];
        if p.is_blank() {
            continue;
        }
        if !stops.is_empty() && stops.matches(&p.text) {
            break;
        }
        out.push(i);
    }
    out
}

/// Stop markers of a rule, or the given defaults
pub(crate) fn stop_markers(rule: &Rule, defaults: &[&str]) -> Result<Markers, CheckError> {
    if rule.stop_markers.is_empty() {
        Markers::compile(defaults)
    } else {
        Markers::compile(&rule.stop_markers)
    }
}

/// Markers of a rule field, or the given defaults
pub(crate) fn markers_or(patterns: &[String], defaults: &[&str]) -> Result<Markers, CheckError> {
    if patterns.is_empty() {
        Markers::compile(defaults)
    } else {
        Markers::compile(patterns)
    }
}

/// Compare every paragraph with the rule's format; one finding per offending
/// paragraph, listing at most `max_reports` of them
pub(crate) fn sweep(ctx: &CheckContext<'_>, rule: &Rule, indices: &[usize]) -> Vec<String> {
    let limit = rule.max_reports.unwrap_or(DEFAULT_MAX_REPORTS);
    let mut findings = Vec::new();
    let mut extra = 0usize;

    for &i in indices {
        let issues = ctx.resolver.check(&ctx.doc.paragraphs[i], &rule.format);
        if issues.is_empty() {
            continue;
        }
        if findings.len() < limit {
            findings.push(format!("{}: {}", at(i), issues.join(", ")));
        } else {
            extra += 1;
        }
    }

    if extra > 0 {
        findings.push(format!("ve {} paragraf daha", extra));
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::{DocumentBuilder, ParagraphBuilder};

    #[test]
    fn test_blank_run_helpers() {
        let doc = DocumentBuilder::new()
            .text("a")
            .blanks(3)
            .text("b")
            .build();
        let ctx = CheckContext::new(&doc);
        assert_eq!(blank_run_after(&ctx, 0), vec![1, 2, 3]);
        assert_eq!(blank_run_before(&ctx, 4, 0), vec![1, 2, 3]);
        assert_eq!(blank_run_before(&ctx, 4, 3), vec![3]);
    }

    #[test]
    fn test_blank_run_bounds_messages() {
        let doc = DocumentBuilder::new().blanks(4).build();
        let ctx = CheckContext::new(&doc);
        let few = blank_run_issues_with(&ctx, Some(3), Some(3), None, &[0, 1]);
        assert_eq!(few, vec!["2 boş satır var (beklenen: tam 3 boş satır)"]);
        let many = blank_run_issues_with(&ctx, Some(1), Some(2), None, &[0, 1, 2, 3]);
        assert!(many[0].contains("2 fazladan"));
        assert!(blank_run_issues_with(&ctx, Some(1), Some(4), None, &[0, 1]).is_empty());
    }

    #[test]
    fn test_blank_format_applies_to_each_blank() {
        let doc = DocumentBuilder::new()
            .paragraph(ParagraphBuilder::empty().size(12.0))
            .paragraph(ParagraphBuilder::empty().size(16.0))
            .build();
        let ctx = CheckContext::new(&doc);
        let spec = FormatSpec {
            font_size: Some(12.0),
            ..Default::default()
        };
        let issues = blank_run_issues_with(&ctx, None, None, Some(&spec), &[0, 1]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Paragraf 2 (boş satır)"));
    }

    #[test]
    fn test_content_issues_exact_and_suffix() {
        let doc = DocumentBuilder::new().text("BİLGİSAYAR MÜHENDİSLİĞİ").build();
        let ctx = CheckContext::new(&doc);
        let rule = Rule {
            exact_text: Some("BİLGİSAYAR MÜHENDİSLİĞİ ANABİLİM DALI".into()),
            suffix: Some("Anabilim Dalı".into()),
            ..Rule::new("cover_department", "Anabilim dalı")
        };
        let issues = content_issues(&ctx, &rule, &doc.paragraphs[0]).unwrap();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_missing_respects_must_exist() {
        let required = Rule::new("x", "Başlık");
        let optional = Rule {
            must_exist: false,
            ..Rule::new("x", "Başlık")
        };
        assert!(!missing(&required, "TEŞEKKÜR").passed);
        let note = missing(&optional, "TEŞEKKÜR");
        assert!(note.passed);
        assert!(!note.explanation.is_empty());
    }

    #[test]
    fn test_sweep_limits_reports() {
        let mut builder = DocumentBuilder::new();
        for _ in 0..5 {
            builder = builder.paragraph(ParagraphBuilder::new("x").size(10.0));
        }
        let doc = builder.build();
        let ctx = CheckContext::new(&doc);
        let rule = Rule {
            format: FormatSpec {
                font_size: Some(12.0),
                ..Default::default()
            },
            max_reports: Some(2),
            ..Rule::new("body_paragraphs", "Metin")
        };
        let findings = sweep(&ctx, &rule, &[0, 1, 2, 3, 4]);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[2], "ve 3 paragraf daha");
    }
}
