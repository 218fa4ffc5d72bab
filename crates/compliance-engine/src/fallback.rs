//! Default locators for every anchor key
//!
//! A check that needs an anchor nobody recorded asks [`locate`], which
//! searches the document with the key's built-in markers or derives the
//! position from its predecessor in the page layout.

use lazy_static::lazy_static;
use regex::Regex;
use shared_docx::Document;

use crate::anchors::{AnchorKey, ChapterBlock};
use crate::context::CheckContext;
use crate::normalize::{fold, Markers};

pub(crate) const COVER_HEADER: &[&str] = &[r"^t\.?\s?c\.?$"];
pub(crate) const UNIVERSITY: &[&str] = &["universite"];
pub(crate) const INSTITUTE: &[&str] = &["enstitu"];
pub(crate) const THESIS_TYPE: &[&str] = &[r"tezi$", r"thesis$", r"dissertation$"];
pub(crate) const APPROVAL_HEADING: &[&str] = &[r"^(kabul ve )?onay( sayfasi)?$", r"^tez onay"];
pub(crate) const APPROVAL_KEYWORDS: &[&str] = &["tarafindan", "hazirlanan", "kabul edilmistir"];
pub(crate) const LEGAL_REFERENCE: &[&str] = &["5846"];
pub(crate) const ETHICS_HEADING: &[&str] = &[
    r"^(bilimsel )?etik (ilke(lere uygunluk)? )?beyan",
    r"^etik ve bilimsel",
];
pub(crate) const ABSTRACT_TR_HEADING: &[&str] = &[r"^ozet$"];
pub(crate) const ABSTRACT_EN_HEADING: &[&str] = &[r"^abstract$"];
pub(crate) const KEYWORDS_TR: &[&str] = &[r"^anahtar (kelime|sozcuk)ler"];
pub(crate) const KEYWORDS_EN: &[&str] = &[r"^key ?words"];
pub(crate) const ACKNOWLEDGEMENTS_HEADING: &[&str] = &[r"^tesekkur", r"^onsoz$"];
pub(crate) const TOC_HEADING: &[&str] = &[r"^icindekiler$"];
pub(crate) const TABLES_LIST_HEADING: &[&str] = &[r"^tablolar listesi$"];
pub(crate) const FIGURES_LIST_HEADING: &[&str] = &[r"^sekiller listesi$"];
pub(crate) const ABBREVIATIONS_HEADING: &[&str] = &[
    r"^(simgeler ve kisaltmalar|kisaltmalar ve simgeler|simgeler|kisaltmalar)( listesi| dizini)?$",
];
pub(crate) const REFERENCES_HEADING: &[&str] = &[
    r"^kaynak(lar|ca)?$",
    r"^kayna[a-z]{0,4}$",
    r"^ka[iy]?nak[a-z]{0,3}$",
    r"^references?$",
    r"^bibliography$",
];
pub(crate) const APPENDICES_HEADING: &[&str] = &[r"^ekler$", r"^ek\s*[-:]?\s*(\d+|[a-z])?$"];
pub(crate) const CV_HEADING: &[&str] = &[r"^ozgecmis$", r"^curriculum vitae$"];

/// Headings that end a front-matter page
pub(crate) const FRONT_SECTION_STOPS: &[&str] = &[
    r"^ozet$",
    r"^abstract$",
    r"^tesekkur",
    r"^onsoz$",
    r"^icindekiler$",
    r"^tablolar listesi$",
    r"^sekiller listesi$",
    r"^(simgeler|kisaltmalar)",
    r"^(bolum|chapter)\s+(\d+|[ivxlc]+)$",
    r"^\d+\.?\s*bolum$",
    r"^(birinci|ikinci) bolum$",
    r"^(kabul ve )?onay( sayfasi)?$",
    r"^(bilimsel )?etik (ilke(lere uygunluk)? )?beyan",
    r"^giris$",
];

/// Headings that end a back-matter page
pub(crate) const BACK_SECTION_STOPS: &[&str] = &[
    r"^ekler$",
    r"^ek\s*[-:]?\s*(\d+|[a-z])?$",
    r"^ozgecmis$",
    r"^curriculum vitae$",
];

/// Block lengths assumed when deriving an `…End` anchor without a rule
const TITLE_LINES: usize = 2;
const PROGRAM_LINES: usize = 3;
pub(crate) const AUTHORITY_LINES: usize = 3;

const ORDINALS: &[&str] = &[
    "birinci", "ikinci", "ucuncu", "dorduncu", "besinci", "altinci", "yedinci", "sekizinci",
    "dokuzuncu", "onuncu",
];

lazy_static! {
    static ref CHAPTER_LINE: Regex = Regex::new(
        r"^(?:(?:bolum|chapter)\s+(\d{1,2}|[ivxlc]{1,6})|(\d{1,2})\.?\s*bolum|([a-z]+)\s+bolum)$"
    )
    .unwrap();
}

/// How a landmark is found once its predecessor is known
#[derive(Debug, Clone, Copy)]
pub(crate) enum Finder {
    /// First paragraph after the predecessor matching any marker
    Markers(&'static [&'static str]),
    /// First non-blank paragraph after the predecessor
    Next,
    /// Last line of the consecutive non-blank block starting at `start`
    BlockEnd { start: AnchorKey, max_lines: usize },
    /// First paragraph after the predecessor containing every keyword
    Keywords(&'static [&'static str]),
    /// First line of the block standing above the legal reference
    AuthorityBlock,
    FirstChapter,
    LastChapterTitle,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Landmark {
    pub after: Option<AnchorKey>,
    pub finder: Finder,
}

const fn marked(after: Option<AnchorKey>, markers: &'static [&'static str]) -> Landmark {
    Landmark {
        after,
        finder: Finder::Markers(markers),
    }
}

const fn next(after: AnchorKey) -> Landmark {
    Landmark {
        after: Some(after),
        finder: Finder::Next,
    }
}

const fn block_end(start: AnchorKey, max_lines: usize) -> Landmark {
    Landmark {
        after: None,
        finder: Finder::BlockEnd { start, max_lines },
    }
}

/// Default location strategy of each key
pub(crate) fn landmark(key: AnchorKey) -> Landmark {
    use AnchorKey::*;
    match key {
        CoverHeader => marked(None, COVER_HEADER),
        CoverUniversity => marked(Some(CoverHeader), UNIVERSITY),
        CoverInstitute => marked(Some(CoverUniversity), INSTITUTE),
        CoverDepartment => next(CoverInstitute),
        CoverTitle => next(CoverDepartment),
        CoverTitleEnd => block_end(CoverTitle, TITLE_LINES),
        CoverStudent => next(CoverTitleEnd),
        CoverThesisType => marked(Some(CoverStudent), THESIS_TYPE),
        CoverDate => next(CoverThesisType),
        CoverCity => next(CoverDate),

        ApprovalHeading => marked(Some(CoverCity), APPROVAL_HEADING),
        ApprovalTitle => next(ApprovalHeading),
        ApprovalTitleEnd => block_end(ApprovalTitle, TITLE_LINES),
        ApprovalStatement => Landmark {
            after: Some(ApprovalTitleEnd),
            finder: Finder::Keywords(APPROVAL_KEYWORDS),
        },
        ApprovalAuthorityBlock => Landmark {
            after: Some(ApprovalStatement),
            finder: Finder::AuthorityBlock,
        },
        ApprovalCopyright => marked(Some(ApprovalHeading), LEGAL_REFERENCE),

        EthicsHeading => marked(Some(ApprovalHeading), ETHICS_HEADING),
        EthicsBody => next(EthicsHeading),

        AbstractTrHeading => marked(None, ABSTRACT_TR_HEADING),
        AbstractTrTitle => next(AbstractTrHeading),
        AbstractTrTitleEnd => block_end(AbstractTrTitle, TITLE_LINES),
        AbstractTrAuthor => next(AbstractTrTitleEnd),
        AbstractTrProgram => next(AbstractTrAuthor),
        AbstractTrProgramEnd => block_end(AbstractTrProgram, PROGRAM_LINES),
        AbstractTrDate => next(AbstractTrProgramEnd),
        AbstractTrPageCount => next(AbstractTrDate),
        AbstractTrBody => next(AbstractTrPageCount),
        AbstractTrKeywords => marked(Some(AbstractTrHeading), KEYWORDS_TR),

        AbstractEnHeading => marked(None, ABSTRACT_EN_HEADING),
        AbstractEnTitle => next(AbstractEnHeading),
        AbstractEnTitleEnd => block_end(AbstractEnTitle, TITLE_LINES),
        AbstractEnAuthor => next(AbstractEnTitleEnd),
        AbstractEnProgram => next(AbstractEnAuthor),
        AbstractEnProgramEnd => block_end(AbstractEnProgram, PROGRAM_LINES),
        AbstractEnDate => next(AbstractEnProgramEnd),
        AbstractEnPageCount => next(AbstractEnDate),
        AbstractEnBody => next(AbstractEnPageCount),
        AbstractEnKeywords => marked(Some(AbstractEnHeading), KEYWORDS_EN),

        AcknowledgementsHeading => marked(None, ACKNOWLEDGEMENTS_HEADING),
        TocHeading => marked(None, TOC_HEADING),
        TocPageLabel => next(TocHeading),
        TablesListHeading => marked(None, TABLES_LIST_HEADING),
        FiguresListHeading => marked(None, FIGURES_LIST_HEADING),
        AbbreviationsHeading => marked(None, ABBREVIATIONS_HEADING),

        FirstChapter => Landmark {
            after: None,
            finder: Finder::FirstChapter,
        },
        LastChapterTitle => Landmark {
            after: None,
            finder: Finder::LastChapterTitle,
        },

        ReferencesHeading => marked(Some(LastChapterTitle), REFERENCES_HEADING),
        AppendicesHeading => marked(Some(ReferencesHeading), APPENDICES_HEADING),
        CvHeading => marked(Some(ReferencesHeading), CV_HEADING),
    }
}

/// Locate `key` with its default strategy
pub(crate) fn locate(ctx: &mut CheckContext<'_>, key: AnchorKey) -> Option<usize> {
    let lm = landmark(key);
    let predecessor = lm.after.and_then(|k| ctx.anchor(k));
    let end = ctx.doc.len();
    find(ctx, lm.finder, predecessor, end)
}

/// Run a finder between the predecessor (exclusive) and `end` (exclusive)
pub(crate) fn find(
    ctx: &mut CheckContext<'_>,
    finder: Finder,
    predecessor: Option<usize>,
    end: usize,
) -> Option<usize> {
    let start = predecessor.map_or(0, |p| p + 1);
    match finder {
        Finder::Markers(patterns) => {
            let markers = Markers::compile(patterns).ok()?;
            find_marked(ctx.doc, &markers, start, end)
        }
        Finder::Next => {
            predecessor?;
            next_nonblank(ctx.doc, start, end)
        }
        Finder::BlockEnd { start, max_lines } => {
            let first = ctx.anchor(start)?;
            block_lines(ctx.doc, first, end, max_lines).last().copied()
        }
        Finder::Keywords(keywords) => find_with_keywords(ctx.doc, keywords, start, end),
        Finder::AuthorityBlock => {
            let markers = Markers::compile(LEGAL_REFERENCE).ok()?;
            let legal = find_marked(ctx.doc, &markers, start, end)?;
            authority_block(ctx.doc, legal, start, AUTHORITY_LINES)
                .first()
                .copied()
        }
        Finder::FirstChapter => ctx.chapters().first().map(|c| c.number_index),
        Finder::LastChapterTitle => ctx.chapters().last().map(|c| c.title_index),
    }
}

pub(crate) fn find_marked(
    doc: &Document,
    markers: &Markers,
    start: usize,
    end: usize,
) -> Option<usize> {
    let end = end.min(doc.len());
    (start..end).find(|&i| markers.matches(&doc.paragraphs[i].text))
}

pub(crate) fn find_with_keywords<S: AsRef<str>>(
    doc: &Document,
    keywords: &[S],
    start: usize,
    end: usize,
) -> Option<usize> {
    let wanted: Vec<String> = keywords.iter().map(|k| fold(k.as_ref())).collect();
    let end = end.min(doc.len());
    (start..end).find(|&i| {
        let text = fold(&doc.paragraphs[i].text);
        wanted.iter().all(|k| text.contains(k.as_str()))
    })
}

pub(crate) fn next_nonblank(doc: &Document, start: usize, end: usize) -> Option<usize> {
    let end = end.min(doc.len());
    (start..end).find(|&i| !doc.paragraphs[i].is_blank())
}

pub(crate) fn prev_nonblank(doc: &Document, before: usize, floor: usize) -> Option<usize> {
    (floor..before.min(doc.len()))
        .rev()
        .find(|&i| !doc.paragraphs[i].is_blank())
}

/// Consecutive non-blank paragraphs from `start`, at most `max` of them
pub(crate) fn block_lines(doc: &Document, start: usize, end: usize, max: usize) -> Vec<usize> {
    let end = end.min(doc.len());
    (start..end)
        .take_while(|&i| !doc.paragraphs[i].is_blank())
        .take(max)
        .collect()
}

/// Up to `lines` non-blank paragraphs directly above `legal` (blank lines
/// between them allowed), in document order
pub(crate) fn authority_block(doc: &Document, legal: usize, floor: usize, lines: usize) -> Vec<usize> {
    let mut block = Vec::new();
    let mut cursor = legal;
    // skip the blank gap right above the legal reference
    while block.len() < lines {
        match prev_nonblank(doc, cursor, floor) {
            Some(i) => {
                block.push(i);
                cursor = i;
            }
            None => break,
        }
        // the block itself is contiguous
        if cursor == 0 || doc.paragraphs[cursor - 1].is_blank() {
            break;
        }
    }
    block.reverse();
    block
}

fn roman_value(numeral: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut prev = 0u32;
    for c in numeral.chars().rev() {
        let v = match c {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            'l' => 50,
            'c' => 100,
            _ => return None,
        };
        if v < prev {
            total = total.checked_sub(v)?;
        } else {
            total += v;
            prev = v;
        }
    }
    Some(total)
}

/// Chapter number announced by a chapter line (`BÖLÜM 2`, `2. BÖLÜM`, `İKİNCİ BÖLÜM`)
pub(crate) fn chapter_number(text: &str) -> Option<u32> {
    let folded = fold(text);
    let caps = CHAPTER_LINE.captures(&folded)?;
    if let Some(m) = caps.get(1) {
        let s = m.as_str();
        return s.parse().ok().or_else(|| roman_value(s));
    }
    if let Some(m) = caps.get(2) {
        return m.as_str().parse().ok();
    }
    let word = caps.get(3)?.as_str();
    ORDINALS
        .iter()
        .position(|o| *o == word)
        .map(|i| i as u32 + 1)
}

/// Every chapter line whose next non-blank paragraph is taken as its title
pub(crate) fn detect_chapters(doc: &Document) -> Vec<ChapterBlock> {
    let mut chapters = Vec::new();
    let mut i = 0;
    while i < doc.len() {
        if let Some(number) = chapter_number(&doc.paragraphs[i].text) {
            if let Some(title) = next_nonblank(doc, i + 1, doc.len()) {
                if chapter_number(&doc.paragraphs[title].text).is_none() {
                    chapters.push(ChapterBlock {
                        number,
                        number_index: i,
                        title_index: title,
                    });
                    i = title + 1;
                    continue;
                }
            }
        }
        i += 1;
    }
    chapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::DocumentBuilder;

    #[test]
    fn test_chapter_number_forms() {
        assert_eq!(chapter_number("BÖLÜM 1"), Some(1));
        assert_eq!(chapter_number("2. BÖLÜM"), Some(2));
        assert_eq!(chapter_number("BÖLÜM IV"), Some(4));
        assert_eq!(chapter_number("ÜÇÜNCÜ BÖLÜM"), Some(3));
        assert_eq!(chapter_number("CHAPTER 5"), Some(5));
        assert_eq!(chapter_number("BÖLÜM 1 GİRİŞ"), None);
        assert_eq!(chapter_number("ANA BÖLÜM"), None);
    }

    #[test]
    fn test_detect_chapters_pairs_number_and_title() {
        let doc = DocumentBuilder::new()
            .text("İÇİNDEKİLER")
            .text("BÖLÜM 1")
            .text("GİRİŞ")
            .text("Metin.")
            .text("BÖLÜM 2")
            .blank()
            .text("YÖNTEM")
            .build();
        let chapters = detect_chapters(&doc);
        assert_eq!(
            chapters,
            vec![
                ChapterBlock {
                    number: 1,
                    number_index: 1,
                    title_index: 2
                },
                ChapterBlock {
                    number: 2,
                    number_index: 4,
                    title_index: 6
                },
            ]
        );
    }

    #[test]
    fn test_references_markers_tolerate_misspelling() {
        let markers = Markers::compile(REFERENCES_HEADING).unwrap();
        assert!(markers.matches("KAYNAKLAR"));
        assert!(markers.matches("KAYNAÇA"));
        assert!(markers.matches("KAYNAKÇA"));
        assert!(!markers.matches("KAYNAKLAR\t45"));
    }

    #[test]
    fn test_authority_block_scans_backwards() {
        let doc = DocumentBuilder::new()
            .text("... tarafından hazırlanan tez kabul edilmiştir.")
            .blanks(2)
            .text("Prof. Dr. Ayşe KAYA")
            .text("Enstitü Müdürü")
            .blank()
            .text("Not: 5846 sayılı Fikir ve Sanat Eserleri Kanunu...")
            .build();
        assert_eq!(authority_block(&doc, 6, 1, 3), vec![3, 4]);
        assert_eq!(authority_block(&doc, 6, 1, 1), vec![4]);
    }

    #[test]
    fn test_block_lines_stop_at_blank() {
        let doc = DocumentBuilder::new()
            .text("a")
            .text("b")
            .text("c")
            .blank()
            .text("d")
            .build();
        assert_eq!(block_lines(&doc, 0, doc.len(), 5), vec![0, 1, 2]);
        assert_eq!(block_lines(&doc, 0, doc.len(), 2), vec![0, 1]);
    }
}
