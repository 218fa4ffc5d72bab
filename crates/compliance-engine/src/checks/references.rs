//! Back matter: references, appendices and the CV

use shared_types::CheckResult;

use super::primitives::{
    blank_run_after, blank_run_issues, landmark_check, missing, section_paragraphs, stop_markers,
    sweep,
};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::BACK_SECTION_STOPS;
use crate::rules::Rule;

/// References heading after the last chapter. Misspelled forms are still
/// recorded as the anchor; the rule's `exact_text` reports the spelling.
pub(crate) fn references_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::ReferencesHeading, |_, _, _| Ok(()))
}

/// Reference list entries up to the appendices or CV
pub(crate) fn references_entries(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some(heading) = ctx.anchor(AnchorKey::ReferencesHeading) else {
        return Ok(missing(rule, AnchorKey::ReferencesHeading.label()));
    };
    let stops = stop_markers(rule, BACK_SECTION_STOPS)?;
    let entries = section_paragraphs(ctx, heading + 1, ctx.doc.len(), &stops);
    let Some(&first) = entries.first() else {
        return Ok(CheckResult::fail(
            &rule.title,
            Some(heading),
            "Kaynak girdisi bulunamadı",
        ));
    };

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let blanks = blank_run_after(ctx, heading);
        issues.extend(
            blank_run_issues(ctx, rule, &blanks)
                .into_iter()
                .map(|issue| format!("Başlıktan sonra {}", issue)),
        );
    }
    issues.extend(sweep(ctx, rule, &entries));

    Ok(CheckResult::from_issues(&rule.title, Some(first), issues))
}

pub(crate) fn appendices_heading(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::AppendicesHeading, |_, _, _| Ok(()))
}

pub(crate) fn cv_heading(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::CvHeading, |_, _, _| Ok(()))
}
