//! Thesis body: chapters, sub-headings, captions, prose and lists
//!
//! Everything here is scoped to the paragraphs between the first chapter
//! line and the references heading (see [`CheckContext::body_range`]).

pub(crate) mod chapters;
pub(crate) mod figures;
pub(crate) mod headings;
pub(crate) mod lists;
pub(crate) mod paragraphs;
pub(crate) mod tables;

use std::collections::{BTreeSet, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use shared_docx::{BodyNode, Document, Paragraph};
use shared_types::CheckResult;

use super::primitives::{at, missing};
use crate::anchors::AnchorKey;
use crate::context::CheckContext;
use crate::normalize::{collapse_whitespace, fold, word_count};
use crate::numbering::{format_levels, heading_number, parse_levels};
use crate::rules::Rule;

lazy_static! {
    static ref FIGURE_CAPTION: Regex =
        Regex::new(r"^(?:sekil|figure)\s+(\d{1,2}(?:\.\d{1,3})?)\.?(?:\s|:|-|$)").unwrap();
    static ref TABLE_CAPTION: Regex =
        Regex::new(r"^(?:tablo|table)\s+(\d{1,2}(?:\.\d{1,3})?)\.?(?:\s|:|-|$)").unwrap();
    static ref BULLET: Regex = Regex::new(r"^\s*(?:[•▪◦●■\-–\*]|[a-z]\)|\d{1,2}\))\s+").unwrap();
    static ref HEADING_STYLE: Regex = Regex::new(r"^(?:heading|baslik)\s*([1-9])$").unwrap();
}

/// Words that turn a "Tablo 2.1 ..." line into a sentence about the table
const PROSE_MARKERS: &[&str] = &[
    "gosterilmistir",
    "gosterilmektedir",
    "verilmistir",
    "verilmektedir",
    "gorulmektedir",
    "sunulmustur",
    "sunulmaktadir",
    "ozetlenmistir",
    "yer almaktadir",
    "incelendiginde",
    "bakildiginda",
    "ancak",
    "ayrica",
    "dolayisiyla",
];
/// Captions are short; longer lines are prose
const CAPTION_MAX_WORDS: usize = 30;
const SENTENCE_MAX_WORDS: usize = 15;
/// Numbered lines longer than this are prose, not sub-headings
const HEADING_MAX_WORDS: usize = 20;
const MATH_SYMBOLS: &[char] = &[
    '∑', '∏', '∫', '√', '∞', '≤', '≥', '≠', '≈', '±', '∂', '∆', '∇', '∈', '∝',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptionKind {
    Figure,
    Table,
}

impl CaptionKind {
    fn regex(self) -> &'static Regex {
        match self {
            CaptionKind::Figure => &FIGURE_CAPTION,
            CaptionKind::Table => &TABLE_CAPTION,
        }
    }

    pub(crate) fn noun(self) -> &'static str {
        match self {
            CaptionKind::Figure => "Şekil",
            CaptionKind::Table => "Tablo",
        }
    }
}

fn looks_like_caption(text: &str) -> bool {
    let words = word_count(text);
    if words > CAPTION_MAX_WORDS {
        return false;
    }
    let folded = fold(text);
    if folded.trim_end().ends_with('.') {
        let prose = folded
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| PROSE_MARKERS.contains(&w))
            || PROSE_MARKERS
                .iter()
                .filter(|m| m.contains(' '))
                .any(|m| folded.contains(m));
        if words > SENTENCE_MAX_WORDS || prose {
            return false;
        }
    }
    true
}

/// Number of a figure or table caption (`"Şekil 2.3. Düzenek"` → `[2, 3]`)
pub(crate) fn caption_number(text: &str, kind: CaptionKind) -> Option<Vec<u32>> {
    let text = collapse_whitespace(text);
    let folded = fold(&text);
    let caps = kind.regex().captures(&folded)?;
    if !looks_like_caption(&text) {
        return None;
    }
    parse_levels(caps.get(1)?.as_str())
}

pub(crate) fn is_caption(text: &str) -> bool {
    caption_number(text, CaptionKind::Figure).is_some()
        || caption_number(text, CaptionKind::Table).is_some()
}

/// Outline level of a `Heading N` / `Başlık N` paragraph style
pub(crate) fn heading_level(doc: &Document, p: &Paragraph) -> Option<usize> {
    let id = p.style_id()?;
    let name = doc.styles.get(id).map(|s| s.name.as_str()).unwrap_or(id);
    [name, id].iter().find_map(|s| {
        HEADING_STYLE
            .captures(&fold(s))?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    })
}

pub(crate) fn is_list_item(p: &Paragraph) -> bool {
    p.is_numbered() || BULLET.is_match(&p.text)
}

/// Equation paragraphs: OMML, embedded objects, an equation font or math symbols
pub(crate) fn is_equation(ctx: &CheckContext<'_>, p: &Paragraph, equation_fonts: &[String]) -> bool {
    if p.has_math || p.has_object || p.text.contains(MATH_SYMBOLS) {
        return true;
    }
    p.text_runs().any(|r| {
        ctx.resolver
            .run_font(p, &r.props)
            .map_or(false, |f| equation_fonts.contains(&fold(&f)))
    })
}

/// Paragraph indices of every chapter number and title line
pub(crate) fn chapter_lines(ctx: &mut CheckContext<'_>) -> HashSet<usize> {
    ctx.chapters()
        .iter()
        .flat_map(|c| [c.number_index, c.title_index])
        .collect()
}

/// A sub-heading inside the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Subheading {
    pub index: usize,
    pub level: usize,
    /// Typed number prefix; `None` for styled headings without one
    pub number: Option<Vec<u32>>,
}

/// Sub-headings, found by heading style (level 2 and deeper) or by a
/// dotted number prefix on a short line
pub(crate) fn subheadings(ctx: &mut CheckContext<'_>) -> Vec<Subheading> {
    let Some(range) = ctx.body_range() else {
        return Vec::new();
    };
    let chapters = chapter_lines(ctx);
    let doc = ctx.doc;

    range
        .filter_map(|i| {
            let p = &doc.paragraphs[i];
            if p.is_blank() || chapters.contains(&i) {
                return None;
            }
            let text = collapse_whitespace(&p.text);
            if is_caption(&text) {
                return None;
            }
            let number = heading_number(&text);
            let styled = heading_level(doc, p).filter(|l| *l >= 2);
            let level = match (styled, &number) {
                (Some(level), _) => level,
                (None, Some(levels))
                    if word_count(&text) <= HEADING_MAX_WORDS && !text.ends_with('.') =>
                {
                    levels.len()
                }
                _ => return None,
            };
            Some(Subheading {
                index: i,
                level,
                number,
            })
        })
        .collect()
}

fn is_blank_node(doc: &Document, node: &BodyNode) -> bool {
    matches!(node, BodyNode::Paragraph(i) if doc.paragraphs[*i].is_blank())
}

/// First non-blank body node after body position `pos`
pub(crate) fn node_after(doc: &Document, pos: usize) -> Option<(usize, &BodyNode)> {
    doc.body
        .iter()
        .enumerate()
        .skip(pos + 1)
        .find(|(_, node)| !is_blank_node(doc, node))
}

/// Last non-blank body node before body position `pos`
pub(crate) fn node_before(doc: &Document, pos: usize) -> Option<(usize, &BodyNode)> {
    doc.body[..pos.min(doc.body.len())]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, node)| !is_blank_node(doc, node))
}

/// Truncate findings to the rule's report limit
pub(crate) fn capped(rule: &Rule, mut issues: Vec<String>) -> Vec<String> {
    let limit = rule
        .max_reports
        .unwrap_or(super::primitives::DEFAULT_MAX_REPORTS);
    if issues.len() > limit {
        let extra = issues.len() - limit;
        issues.truncate(limit);
        issues.push(format!("ve {} bulgu daha", extra));
    }
    issues
}

/// Caption paragraphs of one kind inside the body, with their numbers
pub(crate) fn captions(ctx: &mut CheckContext<'_>, kind: CaptionKind) -> Vec<(usize, Vec<u32>)> {
    let Some(range) = ctx.body_range() else {
        return Vec::new();
    };
    range
        .filter_map(|i| caption_number(ctx.text(i), kind).map(|levels| (i, levels)))
        .collect()
}

/// Number a caption should carry given the previous one
fn expected_after(previous: Option<&[u32]>, current: &[u32]) -> Vec<u32> {
    match (previous, current) {
        (Some([pc, pn]), [c, _]) if pc == c => vec![*c, pn + 1],
        (_, [c, _]) => vec![*c, 1],
        (Some([pn]), [_]) => vec![pn + 1],
        _ => vec![1],
    }
}

/// Caption numbers must carry their chapter's number and count up from 1
/// within it (or through the whole text for single-level numbers)
pub(crate) fn caption_numbering(ctx: &mut CheckContext<'_>, rule: &Rule, kind: CaptionKind) -> CheckResult {
    if ctx.body_range().is_none() {
        return missing(rule, AnchorKey::FirstChapter.label());
    }
    ctx.chapters();
    let found = captions(ctx, kind);
    let Some(&(first, _)) = found.first() else {
        return CheckResult::note(
            &rule.title,
            None,
            format!("{} başlığı bulunamadı (kontrol edilmedi)", kind.noun()),
        );
    };

    let noun = kind.noun();
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();
    let mut previous: Option<&[u32]> = None;

    for (i, levels) in &found {
        let label = format_levels(levels);
        if !seen.insert(levels.clone()) {
            issues.push(format!("{}: {} {} numarası tekrar kullanılmış", at(*i), noun, label));
            continue;
        }

        let chapter = ctx.state.chapter_of(*i).map(|c| c.number);
        match (levels.as_slice(), chapter) {
            ([c, _], Some(ch)) if *c != ch => issues.push(format!(
                "{}: {} {} BÖLÜM {} içinde; {}.x biçiminde numaralanmalı",
                at(*i),
                noun,
                label,
                ch,
                ch
            )),
            _ => {
                let expected = expected_after(previous, levels);
                if *levels != expected {
                    issues.push(format!(
                        "{}: {} {} (beklenen: {} {})",
                        at(*i),
                        noun,
                        label,
                        noun,
                        format_levels(&expected)
                    ));
                }
            }
        }
        previous = Some(levels.as_slice());
    }

    CheckResult::from_issues(&rule.title, Some(first), capped(rule, issues))
}
