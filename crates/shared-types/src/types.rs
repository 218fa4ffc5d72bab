use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of one rule applied to one document.
///
/// `paragraph` is the 0-based index of the paragraph the rule anchored on,
/// if it found one. `explanation` joins every violated sub-condition with
/// `"; "`; for passing rules it is empty or an informational note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub paragraph: Option<usize>,
    pub passed: bool,
    pub title: String,
    pub explanation: String,
}

impl CheckResult {
    pub fn pass(title: &str, paragraph: Option<usize>) -> Self {
        Self {
            paragraph,
            passed: true,
            title: title.to_string(),
            explanation: String::new(),
        }
    }

    /// Passing result carrying an informational note (e.g. optional page absent)
    pub fn note(title: &str, paragraph: Option<usize>, note: impl Into<String>) -> Self {
        Self {
            explanation: note.into(),
            ..Self::pass(title, paragraph)
        }
    }

    pub fn fail(title: &str, paragraph: Option<usize>, explanation: impl Into<String>) -> Self {
        Self {
            paragraph,
            passed: false,
            title: title.to_string(),
            explanation: explanation.into(),
        }
    }

    /// Pass when `issues` is empty, otherwise fail with all issues joined
    pub fn from_issues(title: &str, paragraph: Option<usize>, issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Self::pass(title, paragraph)
        } else {
            Self::fail(title, paragraph, issues.join("; "))
        }
    }
}

/// Results of one configured section, in rule order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResults {
    pub key: String,
    pub results: Vec<CheckResult>,
}

impl SectionResults {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }
}

/// Everything one run over a document produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThesisAnalysis {
    pub sections: Vec<SectionResults>,
    pub student_name: Option<String>,
    pub thesis_title: Option<String>,
    pub paragraph_count: usize,
}

impl ThesisAnalysis {
    pub fn section(&self, key: &str) -> Option<&SectionResults> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn total_rules(&self) -> usize {
        self.sections.iter().map(|s| s.results.len()).sum()
    }
}

/// Per-section counts for the JSON payload and the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub key: String,
    pub label: String,
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub pct: f64,
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
}

/// A failing rule as listed to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub no: usize,
    pub title: String,
    pub explanation: String,
}

/// Pass/fail share of one score group (front matter, body, back matter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub key: String,
    pub label: String,
    pub weight: f64,
    pub total: usize,
    pub ok: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub overall: OverallSummary,
    pub weighted_pct: f64,
    pub groups: Vec<GroupScore>,
    pub sections: Vec<SectionSummary>,
    pub violations: BTreeMap<String, Vec<RuleViolation>>,
}
