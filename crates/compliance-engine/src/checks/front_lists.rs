//! Acknowledgements, table of contents, list pages and the abbreviations page

use shared_docx::{BodyNode, Document, Paragraph};
use shared_types::CheckResult;

use super::primitives::{
    at, blank_run_after, blank_run_issues, content_issues, landmark_check, markers_or, missing,
    pattern_issue, section_paragraphs, stop_markers, sweep, DEFAULT_MAX_REPORTS,
};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::FRONT_SECTION_STOPS;
use crate::normalize::{collapse_whitespace, fold};
use crate::rules::Rule;

const PAGE_LABELS: &[&str] = &[r"^sayfa$", r"^page$"];

fn heading(ctx: &mut CheckContext<'_>, rule: &Rule, key: AnchorKey) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, key, |_, _, _| Ok(()))
}

pub(crate) fn acknowledgements_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    heading(ctx, rule, AnchorKey::AcknowledgementsHeading)
}

pub(crate) fn toc_heading(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    heading(ctx, rule, AnchorKey::TocHeading)
}

pub(crate) fn tables_list_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    heading(ctx, rule, AnchorKey::TablesListHeading)
}

pub(crate) fn figures_list_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    heading(ctx, rule, AnchorKey::FiguresListHeading)
}

pub(crate) fn abbreviations_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    heading(ctx, rule, AnchorKey::AbbreviationsHeading)
}

/// Acknowledgement text between its heading and the next front-matter heading
pub(crate) fn acknowledgements_body(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let key = rule.after.unwrap_or(AnchorKey::AcknowledgementsHeading);
    let Some(heading) = ctx.anchor(key) else {
        return Ok(missing(rule, key.label()));
    };
    let stops = stop_markers(rule, FRONT_SECTION_STOPS)?;
    let paragraphs = section_paragraphs(ctx, heading + 1, ctx.doc.len(), &stops);
    let Some(&first) = paragraphs.first() else {
        return Ok(CheckResult::fail(&rule.title, Some(heading), "Metin bulunamadı"));
    };

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let blanks = blank_run_after(ctx, heading);
        issues.extend(blank_run_issues(ctx, rule, &blanks));
    }
    issues.extend(sweep(ctx, rule, &paragraphs));

    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

/// A paragraph in body order: top-level, or inside a table or content control
#[derive(Debug, Clone, Copy)]
struct FlowLine<'a> {
    index: Option<usize>,
    paragraph: &'a Paragraph,
}

impl FlowLine<'_> {
    fn is_blank(&self) -> bool {
        self.paragraph.is_blank()
    }
}

/// Paragraphs following `paragraph`, descending into tables and content
/// controls (Word stores generated tables of contents in either)
fn flow_after(doc: &Document, paragraph: usize) -> Vec<FlowLine<'_>> {
    let mut lines = Vec::new();
    for node in doc.nodes_after(paragraph) {
        match node {
            BodyNode::Paragraph(i) => {
                if let Some(p) = doc.paragraph(*i) {
                    lines.push(FlowLine {
                        index: Some(*i),
                        paragraph: p,
                    });
                }
            }
            BodyNode::Table(ps) | BodyNode::Sdt(ps) => {
                lines.extend(ps.iter().map(|p| FlowLine {
                    index: None,
                    paragraph: p,
                }));
            }
        }
    }
    lines
}

/// Location label; lines inside containers have no paragraph number
fn where_is(line: &FlowLine<'_>, position: usize) -> String {
    match line.index {
        Some(i) => at(i),
        None => format!("Liste satırı {}", position + 1),
    }
}

/// "Sayfa" label under a list heading, possibly inside the TOC container
fn page_label(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
    heading_key: AnchorKey,
    record: Option<AnchorKey>,
) -> Result<CheckResult, CheckError> {
    let Some(heading) = ctx.anchor(heading_key) else {
        return Ok(missing(rule, heading_key.label()));
    };
    let labels = markers_or(&rule.label_markers, PAGE_LABELS)?;
    let flow = flow_after(ctx.doc, heading);

    let blanks = flow.iter().take_while(|l| l.is_blank()).count();
    let Some(line) = flow.get(blanks) else {
        return Ok(missing(rule, "\"Sayfa\" etiketi"));
    };
    if !labels.matches(&line.paragraph.text) {
        return Ok(missing(rule, "\"Sayfa\" etiketi"));
    }
    if let (Some(key), Some(index)) = (record, line.index) {
        ctx.set_anchor(key, index);
    }

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let run: Vec<usize> = flow[..blanks].iter().filter_map(|l| l.index).collect();
        issues.extend(blank_run_issues(ctx, rule, &run));
    }
    issues.extend(content_issues(ctx, rule, line.paragraph)?);

    Ok(CheckResult::from_issues(&rule.title, line.index, issues))
}

pub(crate) fn toc_page_label(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    page_label(ctx, rule, AnchorKey::TocHeading, Some(AnchorKey::TocPageLabel))
}

/// Page label of the list page named by `after`
pub(crate) fn list_page_label(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let key = rule
        .after
        .ok_or_else(|| CheckError::missing(&rule.check, "after"))?;
    page_label(ctx, rule, key, None)
}

/// Entry lines after a list heading, up to the next front-matter heading
fn entries<'a>(
    ctx: &CheckContext<'a>,
    rule: &Rule,
    heading: usize,
) -> Result<Vec<FlowLine<'a>>, CheckError> {
    let stops = stop_markers(rule, FRONT_SECTION_STOPS)?;
    let labels = markers_or(&rule.label_markers, PAGE_LABELS)?;
    let doc: &'a Document = ctx.doc;

    let mut out = Vec::new();
    for line in flow_after(doc, heading) {
        if line.is_blank() {
            continue;
        }
        let text = &line.paragraph.text;
        // top-level headings end the list; container lines are entries even
        // when they repeat a heading's wording
        if line.index.is_some() && stops.matches(text) {
            break;
        }
        if out.is_empty() && labels.matches(text) {
            continue;
        }
        out.push(line);
    }
    Ok(out)
}

/// Format and pattern findings for list entries, capped like [`sweep`]
fn entry_issues(
    ctx: &CheckContext<'_>,
    rule: &Rule,
    lines: &[FlowLine<'_>],
) -> Result<Vec<String>, CheckError> {
    let limit = rule.max_reports.unwrap_or(DEFAULT_MAX_REPORTS);
    let mut findings = Vec::new();
    let mut extra = 0usize;

    for (n, line) in lines.iter().enumerate() {
        let mut issues = ctx.resolver.check(line.paragraph, &rule.format);
        if let Some(pattern) = &rule.pattern {
            issues.extend(pattern_issue(&line.paragraph.text, pattern)?);
        }
        if issues.is_empty() {
            continue;
        }
        if findings.len() < limit {
            findings.push(format!("{}: {}", where_is(line, n), issues.join(", ")));
        } else {
            extra += 1;
        }
    }
    if extra > 0 {
        findings.push(format!("ve {} satır daha", extra));
    }
    Ok(findings)
}

/// Table of contents entries: format of every line and required headings
pub(crate) fn toc_entries(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let Some(heading) = ctx.anchor(AnchorKey::TocHeading) else {
        return Ok(missing(rule, AnchorKey::TocHeading.label()));
    };
    let lines = entries(ctx, rule, heading)?;
    if lines.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            Some(heading),
            "İçindekiler girdileri bulunamadı",
        ));
    }

    let mut issues = entry_issues(ctx, rule, &lines)?;
    let listed = fold(
        &lines
            .iter()
            .map(|l| collapse_whitespace(&l.paragraph.text))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    for keyword in &rule.required_keywords {
        if !listed.contains(&fold(keyword)) {
            issues.push(format!("İçindekilerde \"{}\" yer almıyor", keyword));
        }
    }

    let first = lines.iter().find_map(|l| l.index).unwrap_or(heading);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

/// Entries of the list page named by `after`
pub(crate) fn list_entries(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let key = rule
        .after
        .ok_or_else(|| CheckError::missing(&rule.check, "after"))?;
    let Some(heading) = ctx.anchor(key) else {
        return Ok(missing(rule, key.label()));
    };
    let lines = entries(ctx, rule, heading)?;
    if lines.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            Some(heading),
            "Liste girdisi bulunamadı",
        ));
    }
    let issues = entry_issues(ctx, rule, &lines)?;
    let first = lines.iter().find_map(|l| l.index).unwrap_or(heading);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

/// Symbol and explanation separated by a tab, a colon or a run of spaces
fn has_explanation(text: &str) -> bool {
    let trimmed = text.trim();
    if let Some((symbol, rest)) = trimmed.split_once(|c: char| c == '\t' || c == ':') {
        return !symbol.trim().is_empty() && !rest.trim().is_empty();
    }
    trimmed
        .split_once("  ")
        .map_or(false, |(symbol, rest)| !symbol.trim().is_empty() && !rest.trim().is_empty())
}

pub(crate) fn abbreviations_entries(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let key = rule.after.unwrap_or(AnchorKey::AbbreviationsHeading);
    let Some(heading) = ctx.anchor(key) else {
        return Ok(missing(rule, key.label()));
    };
    let lines = entries(ctx, rule, heading)?;
    if lines.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            Some(heading),
            "Simge veya kısaltma girdisi bulunamadı",
        ));
    }

    let mut issues = entry_issues(ctx, rule, &lines)?;
    let unexplained: Vec<String> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !has_explanation(&l.paragraph.text))
        .map(|(n, l)| where_is(l, n))
        .collect();
    if !unexplained.is_empty() {
        issues.push(format!(
            "Açıklaması ayrılmamış girdi: {}",
            unexplained.join(", ")
        ));
    }

    let first = lines.iter().find_map(|l| l.index).unwrap_or(heading);
    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}
