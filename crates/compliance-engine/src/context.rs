//! Per-document analysis context handed to every check

use std::ops::Range;

use shared_docx::{Document, Paragraph};

use crate::anchors::{AnchorKey, AnchorState, ChapterBlock};
use crate::fallback;
use crate::format::Resolver;
use crate::normalize::collapse_whitespace;

/// Everything a check may read or record while analysing one document.
///
/// A fresh context is built for every document, so nothing leaks between
/// analyses.
#[derive(Debug)]
pub struct CheckContext<'a> {
    pub doc: &'a Document,
    pub resolver: Resolver<'a>,
    pub state: AnchorState,
    resolving: Vec<AnchorKey>,
}

impl<'a> CheckContext<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            resolver: Resolver::new(doc),
            state: AnchorState::new(),
            resolving: Vec::new(),
        }
    }

    pub fn paragraph(&self, index: usize) -> Option<&'a Paragraph> {
        self.doc.paragraphs.get(index)
    }

    pub fn text(&self, index: usize) -> &'a str {
        self.doc
            .paragraphs
            .get(index)
            .map(|p| p.text.as_str())
            .unwrap_or("")
    }

    /// Index of a landmark: recorded value first, else the key's fallback
    /// locator, whose answer is recorded for later checks.
    pub fn anchor(&mut self, key: AnchorKey) -> Option<usize> {
        if let Some(index) = self.state.get(key) {
            return Some(index);
        }
        if self.resolving.contains(&key) {
            return None;
        }

        self.resolving.push(key);
        let found = fallback::locate(self, key);
        self.resolving.retain(|k| *k != key);

        if let Some(index) = found {
            tracing::debug!(?key, index, "anchor located by fallback");
            self.state.set(key, index);
        }
        found
    }

    pub fn set_anchor(&mut self, key: AnchorKey, index: usize) {
        self.state.set(key, index);
    }

    /// Chapter blocks, detected on first use
    pub fn chapters(&mut self) -> Vec<ChapterBlock> {
        if let Some(chapters) = &self.state.chapters {
            return chapters.clone();
        }
        let chapters = fallback::detect_chapters(self.doc);
        self.state.chapters = Some(chapters.clone());
        chapters
    }

    /// Body scope: from the first chapter line up to the references heading
    pub fn body_range(&mut self) -> Option<Range<usize>> {
        let start = self.anchor(AnchorKey::FirstChapter)?;
        let end = self
            .anchor(AnchorKey::ReferencesHeading)
            .filter(|end| *end > start)
            .unwrap_or(self.doc.len());
        Some(start..end)
    }

    /// Text of the lines from `start` to `end` inclusive, joined by spaces
    fn joined(&self, start: usize, end: usize) -> String {
        (start..=end)
            .map(|i| collapse_whitespace(self.text(i)))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn thesis_title(&mut self) -> Option<String> {
        if self.state.thesis_title.is_none() {
            let start = self.anchor(AnchorKey::CoverTitle)?;
            let end = self.anchor(AnchorKey::CoverTitleEnd).unwrap_or(start);
            self.state.thesis_title = Some(self.joined(start, end.max(start)));
        }
        self.state.thesis_title.clone()
    }

    pub fn student_name(&mut self) -> Option<String> {
        if self.state.student_name.is_none() {
            let index = self.anchor(AnchorKey::CoverStudent)?;
            self.state.student_name = Some(collapse_whitespace(self.text(index)));
        }
        self.state.student_name.clone()
    }

    pub fn into_state(self) -> AnchorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_docx::DocumentBuilder;

    #[test]
    fn test_anchor_falls_back_and_memoizes() {
        let doc = DocumentBuilder::new()
            .text("T.C.")
            .text("ÇUKUROVA ÜNİVERSİTESİ")
            .blank()
            .text("İÇİNDEKİLER")
            .build();
        let mut ctx = CheckContext::new(&doc);
        assert_eq!(ctx.state.get(AnchorKey::TocHeading), None);
        assert_eq!(ctx.anchor(AnchorKey::TocHeading), Some(3));
        assert_eq!(ctx.state.get(AnchorKey::TocHeading), Some(3));
    }

    #[test]
    fn test_recorded_anchor_wins_over_fallback() {
        let doc = DocumentBuilder::new().text("İÇİNDEKİLER").build();
        let mut ctx = CheckContext::new(&doc);
        ctx.set_anchor(AnchorKey::TocHeading, 7);
        assert_eq!(ctx.anchor(AnchorKey::TocHeading), Some(7));
    }

    #[test]
    fn test_missing_anchor_is_none() {
        let doc = DocumentBuilder::new().text("metin").build();
        let mut ctx = CheckContext::new(&doc);
        assert_eq!(ctx.anchor(AnchorKey::ApprovalStatement), None);
        assert_eq!(ctx.anchor(AnchorKey::CoverCity), None);
    }

    #[test]
    fn test_cover_chain_fallback_derives_student() {
        let doc = DocumentBuilder::new()
            .text("T.C.")
            .text("ÇUKUROVA ÜNİVERSİTESİ")
            .text("FEN BİLİMLERİ ENSTİTÜSÜ")
            .text("BİLGİSAYAR MÜHENDİSLİĞİ ANABİLİM DALI")
            .blanks(3)
            .text("DERİN ÖĞRENME İLE")
            .text("GÖRÜNTÜ SINIFLANDIRMA")
            .blanks(2)
            .text("AHMET YILMAZ")
            .build();
        let mut ctx = CheckContext::new(&doc);
        assert_eq!(ctx.student_name().as_deref(), Some("AHMET YILMAZ"));
        assert_eq!(
            ctx.thesis_title().as_deref(),
            Some("DERİN ÖĞRENME İLE GÖRÜNTÜ SINIFLANDIRMA")
        );
    }
}
