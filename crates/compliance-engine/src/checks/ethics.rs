//! Scientific ethics statement page

use shared_types::CheckResult;

use super::primitives::{
    at, blank_run_after, blank_run_issues, landmark_check, markers_or, missing, section_paragraphs,
    stop_markers, sweep,
};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::error::CheckError;
use crate::fallback::FRONT_SECTION_STOPS;
use crate::normalize::word_count;
use crate::rules::Rule;

/// Sentence stating that no AI tools were used
const AI_NOT_USED: &[&str] = &[
    r"yapay zeka.{0,80}(kullanilmamistir|kullanmadim|kullanmadigimi|yararlanilmamistir|yararlanmadim|yararlanmadigimi)",
];
/// Sentence stating that AI tools were used under supervision
const AI_USED: &[&str] = &[
    r"yapay zeka.{0,120}(kullanilmistir|kullandim|kullandigimi|yararlanilmistir|yararlandim|yararlandigimi)",
];
/// Shorter lines (signature, date) are not body prose
const PROSE_MIN_WORDS: usize = 8;

pub(crate) fn ethics_heading(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    landmark_check(ctx, rule, AnchorKey::EthicsHeading, |_, _, _| Ok(()))
}

/// Statement paragraphs between the heading and the next front-matter heading
fn body(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<Option<(usize, Vec<usize>)>, CheckError> {
    let Some(heading) = ctx.anchor(AnchorKey::EthicsHeading) else {
        return Ok(None);
    };
    let stops = stop_markers(rule, FRONT_SECTION_STOPS)?;
    let paragraphs = section_paragraphs(ctx, heading + 1, ctx.doc.len(), &stops);
    if let Some(&first) = paragraphs.first() {
        ctx.set_anchor(AnchorKey::EthicsBody, first);
    }
    Ok(Some((heading, paragraphs)))
}

/// Blank run after the heading and the format of the statement prose
pub(crate) fn ethics_body(ctx: &mut CheckContext<'_>, rule: &Rule) -> Result<CheckResult, CheckError> {
    let Some((heading, paragraphs)) = body(ctx, rule)? else {
        return Ok(missing(rule, AnchorKey::EthicsHeading.label()));
    };
    if paragraphs.is_empty() {
        return Ok(CheckResult::fail(
            &rule.title,
            Some(heading),
            "Etik beyan metni bulunamadı",
        ));
    }

    let mut issues = Vec::new();
    if rule.has_blank_bounds() {
        let blanks = blank_run_after(ctx, heading);
        issues.extend(blank_run_issues(ctx, rule, &blanks));
    }
    let prose: Vec<usize> = paragraphs
        .iter()
        .copied()
        .filter(|&i| word_count(ctx.text(i)) >= PROSE_MIN_WORDS)
        .collect();
    issues.extend(sweep(ctx, rule, &prose));

    Ok(CheckResult::from_issues(&rule.title, paragraphs.first().copied(), issues))
}

/// Exactly one of the two AI-usage declarations must be present
pub(crate) fn ethics_ai_disclosure(
    ctx: &mut CheckContext<'_>,
    rule: &Rule,
) -> Result<CheckResult, CheckError> {
    let Some((heading, paragraphs)) = body(ctx, rule)? else {
        return Ok(missing(rule, AnchorKey::EthicsHeading.label()));
    };
    let not_used = markers_or(&rule.markers, AI_NOT_USED)?;
    let used = markers_or(&rule.alt_markers, AI_USED)?;

    let not_used_at = paragraphs.iter().copied().find(|&i| not_used.matches(ctx.text(i)));
    let used_at = paragraphs.iter().copied().find(|&i| used.matches(ctx.text(i)));

    Ok(match (not_used_at, used_at) {
        (Some(a), Some(b)) => CheckResult::fail(
            &rule.title,
            Some(a.min(b)),
            format!(
                "Yapay zekâ beyanlarının ikisi birlikte yer alıyor: kullanılmadığı beyanı ({}) ve kullanıldığı beyanı ({}); yalnızca biri bulunmalı",
                at(a),
                at(b)
            ),
        ),
        (None, None) => CheckResult::fail(
            &rule.title,
            Some(heading),
            "Yapay zekâ kullanımına ilişkin beyan bulunamadı; iki beyandan biri yer almalı",
        ),
        (Some(i), None) | (None, Some(i)) => CheckResult::pass(&rule.title, Some(i)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::{Document, DocumentBuilder};

    const NOT_USED: &str =
        "Bu tezin hazırlanmasında yapay zekâ araçlarından yararlanılmamıştır.";
    const USED: &str =
        "Bu tezin yazımında danışman gözetiminde yapay zekâ tabanlı araçlar kullanılmıştır.";

    fn ethics(lines: &[&str]) -> Document {
        let mut builder = DocumentBuilder::new()
            .text("BİLİMSEL ETİK BEYANI")
            .blanks(2);
        for line in lines {
            builder = builder.text(line);
        }
        builder.blank().text("ÖZET").build()
    }

    fn rule() -> Rule {
        Rule::new("ethics_ai_disclosure", "Yapay zekâ beyanı")
    }

    #[test]
    fn test_both_declarations_fail_naming_both() {
        let doc = ethics(&[NOT_USED, USED]);
        let mut ctx = CheckContext::new(&doc);
        let result = ethics_ai_disclosure(&mut ctx, &rule()).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("Paragraf 4"));
        assert!(result.explanation.contains("Paragraf 5"));
    }

    #[test]
    fn test_no_declaration_fails_differently() {
        let doc = ethics(&["Bu çalışmada bilimsel etik ilkelere uyulmuştur."]);
        let mut ctx = CheckContext::new(&doc);
        let result = ethics_ai_disclosure(&mut ctx, &rule()).unwrap();
        assert!(!result.passed);
        assert!(result.explanation.contains("bulunamadı"));
    }

    #[test]
    fn test_single_declaration_passes() {
        for line in [NOT_USED, USED] {
            let doc = ethics(&[line]);
            let mut ctx = CheckContext::new(&doc);
            let result = ethics_ai_disclosure(&mut ctx, &rule()).unwrap();
            assert!(result.passed, "{}: {}", line, result.explanation);
        }
    }

    #[test]
    fn test_body_stops_at_next_heading() {
        let doc = ethics(&[NOT_USED]);
        let mut ctx = CheckContext::new(&doc);
        let rule = Rule {
            min_blank: Some(2),
            max_blank: Some(2),
            ..Rule::new("ethics_body", "Etik beyan metni")
        };
        let result = ethics_body(&mut ctx, &rule).unwrap();
        assert!(result.passed, "{}", result.explanation);
        assert_eq!(ctx.state.get(AnchorKey::EthicsBody), Some(3));
    }
}
