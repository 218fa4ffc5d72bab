//! Summary payloads and the weighted compliance score

use std::collections::BTreeMap;

use shared_types::{
    AnalysisSummary, GroupScore, OverallSummary, ReportConfig, RuleViolation, SectionResults,
    SectionSummary, ThesisAnalysis,
};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn percent(ok: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ok as f64 * 100.0 / total as f64
    }
}

/// Sections to summarise: the configured order, or every analysed section
/// when no order is configured
pub fn summary_sections<'a>(analysis: &'a ThesisAnalysis, config: &ReportConfig) -> Vec<&'a SectionResults> {
    if config.section_order.is_empty() {
        return analysis.sections.iter().collect();
    }
    config
        .section_order
        .iter()
        .filter_map(|key| analysis.section(key))
        .collect()
}

/// Pass share of each score group
pub fn group_scores(analysis: &ThesisAnalysis, config: &ReportConfig) -> Vec<GroupScore> {
    config
        .groups
        .iter()
        .map(|group| {
            let (ok, total) = group
                .sections
                .iter()
                .filter_map(|key| analysis.section(key))
                .fold((0, 0), |(ok, total), s| (ok + s.passed(), total + s.results.len()));
            GroupScore {
                key: group.key.clone(),
                label: group.label.clone(),
                weight: group.weight,
                total,
                ok,
                pct: round1(percent(ok, total)),
            }
        })
        .collect()
}

/// Weighted mean of the group percentages. Groups without rules drop out and
/// the remaining weights are renormalised.
pub fn weighted_score(groups: &[GroupScore]) -> f64 {
    let (sum, weights) = groups
        .iter()
        .filter(|g| g.total > 0 && g.weight > 0.0)
        .fold((0.0, 0.0), |(sum, weights), g| {
            (sum + g.weight * percent(g.ok, g.total), weights + g.weight)
        });
    if weights == 0.0 {
        0.0
    } else {
        round1(sum / weights)
    }
}

/// Failing rules per section, numbered by their 1-based position
pub fn extract_violations(sections: &[&SectionResults]) -> BTreeMap<String, Vec<RuleViolation>> {
    sections
        .iter()
        .map(|section| {
            let violations = section
                .results
                .iter()
                .enumerate()
                .filter(|(_, r)| !r.passed)
                .map(|(i, r)| RuleViolation {
                    no: i + 1,
                    title: r.title.clone(),
                    explanation: r.explanation.trim().to_string(),
                })
                .collect();
            (section.key.clone(), violations)
        })
        .collect()
}

pub fn compute_summary(analysis: &ThesisAnalysis, config: &ReportConfig) -> AnalysisSummary {
    let sections = summary_sections(analysis, config);

    let summaries: Vec<SectionSummary> = sections
        .iter()
        .map(|s| {
            let ok = s.passed();
            SectionSummary {
                key: s.key.clone(),
                label: config.label_for(&s.key),
                total: s.results.len(),
                ok,
                fail: s.failed(),
                pct: round1(percent(ok, s.results.len())),
            }
        })
        .collect();

    let total: usize = summaries.iter().map(|s| s.total).sum();
    let ok: usize = summaries.iter().map(|s| s.ok).sum();
    let groups = group_scores(analysis, config);

    AnalysisSummary {
        overall: OverallSummary {
            pct: round1(percent(ok, total)),
            total,
            ok,
            fail: total - ok,
        },
        weighted_pct: weighted_score(&groups),
        groups,
        sections: summaries,
        violations: extract_violations(&sections),
    }
}
