//! Turkish (ÖZET) and English (ABSTRACT) abstract pages
//!
//! Both pages share one layout; the rule's `language` picks the anchor keys
//! and the language-specific patterns.

use shared_types::CheckResult;

use super::cover::TR_MONTH_YEAR;
use super::primitives::{
    at, block_check, landmark_check, markers_or, pattern_issue, section_paragraphs, sweep,
};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::{FRONT_SECTION_STOPS, KEYWORDS_EN, KEYWORDS_TR};
use crate::normalize::{collapse_whitespace, same_text};
use crate::rules::{Language, Rule};

const EN_MONTH_YEAR: &str = r"^(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{4}$";
/// Roman front-matter count plus arabic body count, e.g. "xii + 85 sayfa"
const PAGE_COUNT: &str = r"^[ivxlc]+\s*\+\s*\d+\s*(sayfa|pages?)$";
const TITLE_LINES: usize = 2;
const PROGRAM_LINES: usize = 3;
const PROGRAM_MIN_LINES: usize = 2;

/// Anchor keys of one abstract page
struct Keys {
    heading: AnchorKey,
    title: AnchorKey,
    title_end: AnchorKey,
    author: AnchorKey,
    program: AnchorKey,
    program_end: AnchorKey,
    date: AnchorKey,
    page_count: AnchorKey,
    body: AnchorKey,
    keywords: AnchorKey,
}

impl Keys {
    fn of(language: Language) -> Self {
        use AnchorKey::*;
        match language {
            Language::Tr => Keys {
                heading: AbstractTrHeading,
                title: AbstractTrTitle,
                title_end: AbstractTrTitleEnd,
                author: AbstractTrAuthor,
                program: AbstractTrProgram,
                program_end: AbstractTrProgramEnd,
                date: AbstractTrDate,
                page_count: AbstractTrPageCount,
                body: AbstractTrBody,
                keywords: AbstractTrKeywords,
            },
            Language::En => Keys {
                heading: AbstractEnHeading,
                title: AbstractEnTitle,
                title_end: AbstractEnTitleEnd,
                author: AbstractEnAuthor,
                program: AbstractEnProgram,
                program_end: AbstractEnProgramEnd,
                date: AbstractEnDate,
                page_count: AbstractEnPageCount,
                body: AbstractEnBody,
                keywords: AbstractEnKeywords,
            },
        }
    }
}

fn keyword_markers(language: Language) -> &'static [&'static str] {
    match language {
        Language::Tr => KEYWORDS_TR,
        Language::En => KEYWORDS_EN,
    }
}

pub(crate) fn abstract_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, Keys::of(rule.language).heading, |_, _, _| Ok(()))
}

/// Title block; the Turkish one must repeat the cover title
pub(crate) fn abstract_title(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let keys = Keys::of(rule.language);
    block_check(ctx, rule, keys.title, keys.title_end, TITLE_LINES, |ctx, lines, issues| {
        if rule.language != Language::Tr {
            return Ok(());
        }
        let title = lines
            .iter()
            .map(|&i| collapse_whitespace(ctx.text(i)))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(expected) = ctx.thesis_title() {
            if !same_text(&title, &expected) {
                issues.push(format!(
                    "Başlık dış kapaktaki tez başlığıyla aynı değil (\"{}\")",
                    expected
                ));
            }
        }
        Ok(())
    })
}

/// Author line, matching the student name on the cover
pub(crate) fn abstract_author(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, Keys::of(rule.language).author, |ctx, index, issues| {
        let author = collapse_whitespace(ctx.text(index));
        if let Some(student) = ctx.student_name() {
            if !same_text(&author, &student) {
                issues.push(format!(
                    "Yazar adı \"{}\" dış kapaktaki \"{}\" ile aynı değil",
                    author, student
                ));
            }
        }
        Ok(())
    })
}

/// Program and advisor lines
pub(crate) fn abstract_program(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let keys = Keys::of(rule.language);
    block_check(ctx, rule, keys.program, keys.program_end, PROGRAM_LINES, |_, lines, issues| {
        if rule.min_lines.is_none() && lines.len() < PROGRAM_MIN_LINES {
            issues.push(format!(
                "{} satır; en az {} satır olmalı",
                lines.len(),
                PROGRAM_MIN_LINES
            ));
        }
        Ok(())
    })
}

pub(crate) fn abstract_date(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, Keys::of(rule.language).date, |ctx, index, issues| {
        if rule.pattern.is_none() {
            let pattern = match rule.language {
                Language::Tr => TR_MONTH_YEAR,
                Language::En => EN_MONTH_YEAR,
            };
            issues.extend(pattern_issue(ctx.text(index), pattern)?);
        }
        Ok(())
    })
}

pub(crate) fn abstract_page_count(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, Keys::of(rule.language).page_count, |ctx, index, issues| {
        if rule.pattern.is_none() {
            issues.extend(pattern_issue(ctx.text(index), PAGE_COUNT)?);
        }
        Ok(())
    })
}

/// Body paragraphs up to the keywords line
pub(crate) fn abstract_body(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let keys = Keys::of(rule.language);
    landmark_check(ctx, rule, keys.body, |ctx, first, issues| {
        let mut stops: Vec<String> = keyword_markers(rule.language)
            .iter()
            .map(|m| m.to_string())
            .collect();
        if rule.stop_markers.is_empty() {
            stops.extend(FRONT_SECTION_STOPS.iter().map(|m| m.to_string()));
        } else {
            stops.extend(rule.stop_markers.iter().cloned());
        }
        let stops = markers_or(&stops, &[])?;
        let rest = section_paragraphs(ctx, first + 1, ctx.doc.len(), &stops);
        issues.extend(sweep(ctx, rule, &rest));
        Ok(())
    })
}

/// "Anahtar Kelimeler:" label in bold, the keywords themselves not bold
pub(crate) fn abstract_keywords(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let keys = Keys::of(rule.language);
    let relaxed = Rule {
        format: rule.format.without_bold(),
        markers: if rule.markers.is_empty() {
            keyword_markers(rule.language)
                .iter()
                .map(|m| m.to_string())
                .collect()
        } else {
            rule.markers.clone()
        },
        ..rule.clone()
    };

    landmark_check(ctx, &relaxed, keys.keywords, |ctx, index, issues| {
        let p = &ctx.doc.paragraphs[index];
        // offsets below refer to the run texts, not the normalized paragraph text
        let joined: String = p.runs.iter().map(|r| r.text.as_str()).collect();
        let Some(colon) = joined.find(':') else {
            issues.push("Etiketten sonra \":\" kullanılmamış".to_string());
            return Ok(());
        };

        let mut offset = 0usize;
        let mut label_plain = false;
        let mut content_bold = false;
        for run in &p.runs {
            let start = offset;
            offset += run.text.len();
            if !run.has_visible_text() {
                continue;
            }
            let bold = ctx
                .resolver
                .run_value(p, &run.props, |r| r.bold)
                .unwrap_or(false);
            if start <= colon {
                label_plain |= !bold;
            }
            if offset > colon + 1 {
                let from = (colon + 1).saturating_sub(start);
                if !run.text[from..].trim().is_empty() {
                    content_bold |= bold;
                }
            }
        }

        if label_plain {
            issues.push("Etiket kalın değil (kalın olmalı)".to_string());
        }
        if content_bold {
            issues.push("Anahtar kelimeler kalın olmamalı".to_string());
        }
        if joined[colon + 1..].trim().is_empty() {
            issues.push(format!("{}: anahtar kelime yazılmamış", at(index)));
        }
        Ok(())
    })
}
