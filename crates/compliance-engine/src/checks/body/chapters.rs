//! Chapter number lines, chapter titles and the gap after each title

use shared_types::CheckResult;

use super::capped;
use crate::anchors::{AnchorKey, ChapterBlock};
use crate::checks::primitives::{
    at, blank_run_after, blank_run_issues, missing, pattern_issue,
};
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::normalize::{collapse_whitespace, same_text};
use crate::rules::Rule;

const FIRST_CHAPTER_TITLE: &str = "GİRİŞ";

fn detected(ctx: &mut CheckContext<'_>) -> Option<Vec<ChapterBlock>> {
    let chapters = ctx.chapters();
    let first = chapters.first()?;
    let last = chapters.last()?;
    ctx.set_anchor(AnchorKey::FirstChapter, first.number_index);
    ctx.set_anchor(AnchorKey::LastChapterTitle, last.title_index);
    Some(chapters)
}

/// Chapter lines numbered 1, 2, 3… in the expected format
pub(crate) fn chapter_headings(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(chapters) = detected(ctx) else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };
    tracing::debug!(count = chapters.len(), "chapters detected");

    let mut issues = Vec::new();
    for (n, chapter) in chapters.iter().enumerate() {
        let expected = n as u32 + 1;
        let i = chapter.number_index;
        if chapter.number != expected {
            issues.push(format!(
                "{}: BÖLÜM {} geliyor; BÖLÜM {} olmalı",
                at(i),
                chapter.number,
                expected
            ));
        }

        let mut found = ctx.resolver.check(&ctx.doc.paragraphs[i], &rule.format);
        if let Some(pattern) = &rule.pattern {
            found.extend(pattern_issue(ctx.text(i), pattern)?);
        }
        if !found.is_empty() {
            issues.push(format!("{}: {}", at(i), found.join(", ")));
        }
    }

    Ok(CheckResult::from_issues(
        &rule.title,
        chapters.first().map(|c| c.number_index),
        capped(rule, issues),
    ))
}

/// Title line right under each chapter line; the first one reads "GİRİŞ"
pub(crate) fn chapter_titles(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(chapters) = detected(ctx) else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };
    let first_title = rule
        .exact_text
        .clone()
        .unwrap_or_else(|| FIRST_CHAPTER_TITLE.to_string());
    let min_gap = rule.min_blank.unwrap_or(0);
    let max_gap = rule.max_blank.unwrap_or(0);

    let mut issues = Vec::new();
    for (n, chapter) in chapters.iter().enumerate() {
        let i = chapter.title_index;
        let gap = i - chapter.number_index - 1;
        if gap > max_gap {
            issues.push(format!(
                "{}: bölüm numarası ile başlık arasında {} boş satır var (beklenen: en fazla {})",
                at(i),
                gap,
                max_gap
            ));
        } else if gap < min_gap {
            issues.push(format!(
                "{}: bölüm numarası ile başlık arasında {} boş satır var (beklenen: en az {})",
                at(i),
                gap,
                min_gap
            ));
        }

        if n == 0 {
            let title = collapse_whitespace(ctx.text(i));
            if !same_text(&title, &first_title) {
                issues.push(format!(
                    "İlk bölümün başlığı \"{}\"; \"{}\" olmalı",
                    title, first_title
                ));
            }
        }

        let found = ctx.resolver.check(&ctx.doc.paragraphs[i], &rule.format);
        if !found.is_empty() {
            issues.push(format!("{}: {}", at(i), found.join(", ")));
        }
    }

    Ok(CheckResult::from_issues(
        &rule.title,
        chapters.first().map(|c| c.title_index),
        capped(rule, issues),
    ))
}

/// Blank run between each chapter title and the text that follows
pub(crate) fn chapter_spacing(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    if !rule.has_blank_bounds() {
        return Err(CheckError::missing(&rule.check, "min_blank"));
    }
    let Some(chapters) = detected(ctx) else {
        return Ok(missing(rule, AnchorKey::FirstChapter.label()));
    };

    let mut issues = Vec::new();
    for chapter in &chapters {
        let blanks = blank_run_after(ctx, chapter.title_index);
        issues.extend(
            blank_run_issues(ctx, rule, &blanks)
                .into_iter()
                .map(|issue| format!("{} sonrası: {}", at(chapter.title_index), issue)),
        );
    }

    Ok(CheckResult::from_issues(
        &rule.title,
        chapters.first().map(|c| c.title_index),
        capped(rule, issues),
    ))
}
