//! Hierarchical numbering verification (`2.1` → `2.2` → `2.2.1` → `3.1`)

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Leading `N.N[.N[.N]]` with an optional trailing dot, then the heading text
    static ref NUMBER_PREFIX: Regex = Regex::new(r"^\s*(\d{1,3}(?:\.\d{1,3}){1,3})\.?\s+\S").unwrap();
}

/// A numbered heading or caption in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedItem {
    pub paragraph: usize,
    pub levels: Vec<u32>,
    pub text: String,
}

impl NumberedItem {
    pub fn new(paragraph: usize, levels: Vec<u32>, text: &str) -> Self {
        Self {
            paragraph,
            levels,
            text: text.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format_levels(&self.levels)
    }
}

pub fn format_levels(levels: &[u32]) -> String {
    levels
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a dotted number (`"2.3.1"`) into its components
pub fn parse_levels(number: &str) -> Option<Vec<u32>> {
    let levels = number
        .trim()
        .trim_end_matches('.')
        .split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    if levels.is_empty() {
        None
    } else {
        Some(levels)
    }
}

/// Numeric prefix of a sub-heading line (`"2.1. Yöntem"` → `[2, 1]`)
pub fn heading_number(text: &str) -> Option<Vec<u32>> {
    let caps = NUMBER_PREFIX.captures(text)?;
    parse_levels(caps.get(1)?.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceIssueKind {
    /// First item does not start at 1
    BadStart,
    /// Numbers were skipped
    Skip,
    /// Number went backwards or repeated
    Regression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceIssue {
    pub kind: SequenceIssueKind,
    pub paragraph: usize,
    pub previous: Option<String>,
    pub found: String,
}

impl SequenceIssue {
    pub fn describe(&self) -> String {
        let at = self.paragraph + 1;
        match (&self.kind, &self.previous) {
            (SequenceIssueKind::BadStart, _) => {
                format!("Paragraf {}: numaralandırma {} ile başlıyor; 1 ile başlamalı", at, self.found)
            }
            (SequenceIssueKind::Skip, Some(prev)) => {
                format!("Paragraf {}: {} sonrasında {} geliyor (numara atlanmış)", at, prev, self.found)
            }
            (SequenceIssueKind::Regression, Some(prev)) => {
                format!("Paragraf {}: {} sonrasında {} geliyor (numara geriye gidiyor)", at, prev, self.found)
            }
            (_, None) => format!("Paragraf {}: {} numarası hatalı", at, self.found),
        }
    }
}

/// Numbers that may legally follow `prev`
fn successors(prev: &[u32]) -> Vec<Vec<u32>> {
    let mut out = Vec::new();

    // deeper by one level
    let mut deeper = prev.to_vec();
    deeper.push(1);
    out.push(deeper);

    // same level or any shallower level, incremented
    for depth in (1..=prev.len()).rev() {
        let mut next = prev[..depth].to_vec();
        if let Some(last) = next.last_mut() {
            *last += 1;
        }
        out.push(next);
    }

    // next chapter restarts sections at 1
    if prev.len() >= 2 {
        out.push(vec![prev[0] + 1, 1]);
    }

    out
}

/// Verify that numbers advance without gaps or regressions.
///
/// The first item must end in 1. Each later item must be the previous one
/// with a `.1` appended, or the previous one incremented at the same or any
/// shallower level; moving to the next chapter restarts at `X.1`.
pub fn check_sequence(items: &[NumberedItem]) -> Vec<SequenceIssue> {
    let mut issues = Vec::new();
    let mut prev: Option<&NumberedItem> = None;

    for item in items {
        match prev {
            None => {
                if item.levels.last() != Some(&1) {
                    issues.push(SequenceIssue {
                        kind: SequenceIssueKind::BadStart,
                        paragraph: item.paragraph,
                        previous: None,
                        found: item.label(),
                    });
                }
            }
            Some(p) => {
                if !successors(&p.levels).contains(&item.levels) {
                    let kind = if item.levels <= p.levels {
                        SequenceIssueKind::Regression
                    } else {
                        SequenceIssueKind::Skip
                    };
                    issues.push(SequenceIssue {
                        kind,
                        paragraph: item.paragraph,
                        previous: Some(p.label()),
                        found: item.label(),
                    });
                }
            }
        }
        prev = Some(item);
    }

    issues
}
