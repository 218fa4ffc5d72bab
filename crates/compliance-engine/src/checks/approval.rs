//! Approval (kabul ve onay) page

use shared_types::CheckResult;

use super::primitives::{
    at, blank_run_after, blank_run_before, blank_run_issues, block_check, content_issues,
    landmark_check, missing, predecessor, search_end, Found,
};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::{
    authority_block, find_marked, find_with_keywords, APPROVAL_KEYWORDS, AUTHORITY_LINES,
    LEGAL_REFERENCE,
};
use crate::normalize::{collapse_whitespace, fold, same_text, Markers};
use crate::rules::Rule;

const TITLE_LINES: usize = 2;

pub(crate) fn approval_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::ApprovalHeading, |_, _, _| Ok(()))
}

/// Title restated under the heading. No blank line may separate them unless
/// the rule says otherwise.
pub(crate) fn approval_title(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let strict;
    let rule = if rule.has_blank_bounds() {
        rule
    } else {
        strict = Rule {
            max_blank: Some(0),
            ..rule.clone()
        };
        &strict
    };

    block_check(
        ctx,
        rule,
        AnchorKey::ApprovalTitle,
        AnchorKey::ApprovalTitleEnd,
        TITLE_LINES,
        |ctx, lines, issues| {
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
        },
    )
}

fn keywords(rule: &Rule) -> Vec<String> {
    if rule.required_keywords.is_empty() {
        APPROVAL_KEYWORDS.iter().map(|k| k.to_string()).collect()
    } else {
        rule.required_keywords.clone()
    }
}

/// The statement paragraph holding every required keyword; blank bounds
/// apply to the run after it
pub(crate) fn approval_statement(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let keywords = keywords(rule);
    let predecessor = predecessor(ctx, rule, AnchorKey::ApprovalStatement);
    let start = predecessor.map_or(0, |p| p + 1);
    let end = search_end(ctx, rule);

    let Some(index) = find_with_keywords(ctx.doc, &keywords, start, end) else {
        // report what the closest candidate lacks
        let folded: Vec<String> = keywords.iter().map(|k| fold(k)).collect();
        let best = (start..end.min(ctx.doc.len()))
            .map(|i| {
                let text = fold(ctx.text(i));
                let hits = folded.iter().filter(|k| text.contains(k.as_str())).count();
                (hits, i)
            })
            .filter(|(hits, _)| *hits > 0)
            .max_by_key(|(hits, i)| (*hits, std::cmp::Reverse(*i)));

        return Ok(match best {
            Some((_, i)) => {
                let text = fold(ctx.text(i));
                let absent: Vec<&str> = keywords
                    .iter()
                    .zip(&folded)
                    .filter(|(_, f)| !text.contains(f.as_str()))
                    .map(|(k, _)| k.as_str())
                    .collect();
                CheckResult::fail(
                    &rule.title,
                    Some(i),
                    format!(
                        "{}: onay metninde eksik ifade: {}",
                        at(i),
                        absent.join(", ")
                    ),
                )
            }
            None => missing(rule, AnchorKey::ApprovalStatement.label()),
        });
    };
    ctx.set_anchor(AnchorKey::ApprovalStatement, index);

    let mut issues = content_issues(ctx, rule, &ctx.doc.paragraphs[index])?;
    if rule.has_blank_bounds() {
        let blanks = blank_run_after(ctx, index);
        issues.extend(
            blank_run_issues(ctx, rule, &blanks)
                .into_iter()
                .map(|issue| format!("Onay metninden sonra {}", issue)),
        );
    }

    Ok(CheckResult::from_issues(&rule.title, Some(index), issues))
}

/// Signature block found by scanning backwards from the legal reference
fn locate_authority(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<Option<(Found, Vec<usize>)>, CheckError> {
    let predecessor = predecessor(ctx, rule, AnchorKey::ApprovalAuthorityBlock);
    let floor = predecessor.map_or(0, |p| p + 1);
    let end = search_end(ctx, rule);

    let legal = if rule.markers.is_empty() {
        Markers::compile(LEGAL_REFERENCE)?
    } else {
        Markers::compile(&rule.markers)?
    };
    let Some(reference) = find_marked(ctx.doc, &legal, floor, end) else {
        return Ok(None);
    };

    let lines = rule.block_lines.unwrap_or(AUTHORITY_LINES).max(1);
    let block = authority_block(ctx.doc, reference, floor, lines);
    let Some(&first) = block.first() else {
        return Ok(None);
    };
    Ok(Some((
        Found {
            index: first,
            predecessor,
        },
        block,
    )))
}

pub(crate) fn approval_authority_block(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some((found, block)) = locate_authority(ctx, rule)? else {
        return Ok(missing(rule, AnchorKey::ApprovalAuthorityBlock.label()));
    };
    ctx.set_anchor(AnchorKey::ApprovalAuthorityBlock, found.index);

    let mut issues = Vec::new();
    let expected = rule.block_lines.unwrap_or(AUTHORITY_LINES);
    if block.len() < expected {
        issues.push(format!(
            "İmza bloğu {} satır; {} satır olmalı",
            block.len(),
            expected
        ));
    }
    for &i in &block {
        let found = content_issues(ctx, rule, &ctx.doc.paragraphs[i])?;
        if !found.is_empty() {
            issues.push(format!("{}: {}", at(i), found.join(", ")));
        }
    }

    Ok(CheckResult::from_issues(&rule.title, Some(found.index), issues))
}

/// Blank gap between the approval statement and the signature block
pub(crate) fn approval_authority_gap(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    if !rule.has_blank_bounds() {
        return Err(CheckError::missing(&rule.check, "min_blank"));
    }
    let start = match ctx.anchor(AnchorKey::ApprovalAuthorityBlock) {
        Some(start) => start,
        None => match locate_authority(ctx, rule)? {
            Some((found, _)) => {
                ctx.set_anchor(AnchorKey::ApprovalAuthorityBlock, found.index);
                found.index
            }
            None => return Ok(missing(rule, AnchorKey::ApprovalAuthorityBlock.label())),
        },
    };

    let floor = ctx
        .anchor(AnchorKey::ApprovalStatement)
        .filter(|s| *s < start)
        .map_or(0, |s| s + 1);
    let blanks = blank_run_before(ctx, start, floor);
    let issues = blank_run_issues(ctx, rule, &blanks);

    Ok(CheckResult::from_issues(&rule.title, Some(start), issues))
}

/// Copyright notice citing the legal reference
pub(crate) fn approval_copyright(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::ApprovalCopyright, |_, _, _| Ok(()))
}
