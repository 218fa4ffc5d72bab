//! Immutable in-memory model of a WordprocessingML document
//!
//! Only the parts the thesis checks read are modelled: top-level paragraphs
//! with their runs, block-level tables and content controls, the style sheet,
//! document defaults, page setup per section and the theme's latin fonts.
//!
//! Units are normalized at parse time:
//! - font sizes and paragraph spacing in points
//! - indents and page geometry in centimetres
//! - line spacing as a multiple (`lineRule="auto"`) or an absolute point value

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Maximum number of `basedOn` hops followed before a chain is considered broken
pub const MAX_STYLE_DEPTH: usize = 32;

/// Paragraph alignment (`w:jc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map a `w:jc/@w:val` value onto the four visual alignments
    pub fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" | "justify" | "lowKashida" | "mediumKashida"
            | "highKashida" | "thaiDistribute" => Some(Alignment::Justify),
            _ => None,
        }
    }

    /// Turkish display label used in explanations
    pub fn label(&self) -> &'static str {
        match self {
            Alignment::Left => "sola yaslı",
            Alignment::Center => "ortalı",
            Alignment::Right => "sağa yaslı",
            Alignment::Justify => "iki yana yaslı",
        }
    }
}

/// Line spacing as written in `w:spacing/@w:line`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineSpacing {
    /// `lineRule="auto"`: multiple of single spacing (240ths)
    Multiple(f32),
    /// `lineRule="exact"`: points
    Exact(f32),
    /// `lineRule="atLeast"`: points
    AtLeast(f32),
}

/// Theme font slot referenced by `w:asciiTheme` / `w:hAnsiTheme`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeFont {
    Major,
    Minor,
}

/// A run font: either named directly or taken from the theme
#[derive(Debug, Clone, PartialEq)]
pub enum FontRef {
    Named(String),
    Theme(ThemeFont),
}

/// Run-level formatting (`w:rPr`); `None` means "not specified at this level"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProps {
    pub style_id: Option<String>,
    pub font: Option<FontRef>,
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub caps: Option<bool>,
}

impl RunProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, name: &str) -> Self {
        self.font = Some(FontRef::Named(name.to_string()));
        self
    }

    pub fn size(mut self, pt: f32) -> Self {
        self.size = Some(pt);
        self
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bold = Some(on);
        self
    }

    pub fn italic(mut self, on: bool) -> Self {
        self.italic = Some(on);
        self
    }

    pub fn style(mut self, id: &str) -> Self {
        self.style_id = Some(id.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == RunProps::default()
    }
}

/// `w:numPr` reference of a list paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: String,
    pub level: u8,
}

/// Paragraph-level formatting (`w:pPr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProps {
    pub style_id: Option<String>,
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<LineSpacing>,
    pub space_before: Option<f32>,
    pub space_after: Option<f32>,
    /// Left indent in centimetres
    pub left_indent: Option<f32>,
    /// First-line indent in centimetres; negative for a hanging indent
    pub first_line_indent: Option<f32>,
    pub numbering: Option<NumberingRef>,
}

/// A contiguous span of text with one set of run properties
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub props: RunProps,
}

impl Run {
    pub fn new(text: &str, props: RunProps) -> Self {
        Self {
            text: text.to_string(),
            props,
        }
    }

    pub fn has_visible_text(&self) -> bool {
        !is_blank_text(&self.text)
    }
}

/// A paragraph and everything the checks read from it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    /// Position among the top-level body paragraphs (0-based)
    pub index: usize,
    pub text: String,
    pub runs: Vec<Run>,
    pub props: ParagraphProps,
    /// Paragraph-mark run properties; decide the look of empty paragraphs
    pub mark: RunProps,
    pub has_drawing: bool,
    pub has_math: bool,
    pub has_object: bool,
}

impl Paragraph {
    pub fn style_id(&self) -> Option<&str> {
        self.props.style_id.as_deref()
    }

    /// True when the paragraph renders as an empty line
    pub fn is_blank(&self) -> bool {
        is_blank_text(&self.text) && !self.has_drawing && !self.has_math && !self.has_object
    }

    pub fn is_numbered(&self) -> bool {
        self.props.numbering.is_some()
    }

    /// Runs that carry visible characters
    pub fn text_runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(|r| r.has_visible_text())
    }
}

/// Whitespace, NBSP and zero-width characters only
pub fn is_blank_text(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleKind {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "character" => StyleKind::Character,
            "table" => StyleKind::Table,
            "numbering" => StyleKind::Numbering,
            _ => StyleKind::Paragraph,
        }
    }
}

/// A named style from `word/styles.xml`
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub id: String,
    pub name: String,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub run: RunProps,
    pub paragraph: ParagraphProps,
}

impl Style {
    pub fn paragraph(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: StyleKind::Paragraph,
            based_on: None,
            is_default: false,
            run: RunProps::default(),
            paragraph: ParagraphProps::default(),
        }
    }

    pub fn character(id: &str, name: &str) -> Self {
        Self {
            kind: StyleKind::Character,
            ..Self::paragraph(id, name)
        }
    }

    pub fn based_on(mut self, id: &str) -> Self {
        self.based_on = Some(id.to_string());
        self
    }

    pub fn default_style(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_run(mut self, run: RunProps) -> Self {
        self.run = run;
        self
    }

    pub fn with_paragraph(mut self, paragraph: ParagraphProps) -> Self {
        self.paragraph = paragraph;
        self
    }
}

/// All styles keyed by style id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    styles: HashMap<String, Style>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: Style) {
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The style flagged `w:default="1"` for the given kind
    pub fn default_of(&self, kind: StyleKind) -> Option<&Style> {
        self.styles
            .values()
            .find(|s| s.kind == kind && s.is_default)
    }

    /// Style applying to a paragraph: its own style id if known, else the default
    pub fn paragraph_style(&self, id: Option<&str>) -> Option<&Style> {
        id.and_then(|id| self.get(id))
            .or_else(|| self.default_of(StyleKind::Paragraph))
    }

    /// Walk `start` and its `basedOn` ancestors, nearest first.
    ///
    /// Stops at unknown ids, on the first repeated id, or after
    /// [`MAX_STYLE_DEPTH`] hops, so malformed cyclic chains terminate.
    pub fn chain<'a>(&'a self, start: Option<&'a Style>) -> Vec<&'a Style> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = start;

        while let Some(style) = current {
            if out.len() >= MAX_STYLE_DEPTH || !seen.insert(style.id.as_str()) {
                tracing::warn!(style = %style.id, "style chain cycle or depth limit reached");
                break;
            }
            out.push(style);
            current = style.based_on.as_deref().and_then(|id| self.get(id));
        }

        out
    }
}

/// `w:docDefaults`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocDefaults {
    pub run: RunProps,
    pub paragraph: ParagraphProps,
}

/// Latin typefaces of the document theme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeFonts {
    pub major: Option<String>,
    pub minor: Option<String>,
}

impl ThemeFonts {
    pub fn get(&self, slot: ThemeFont) -> Option<&str> {
        match slot {
            ThemeFont::Major => self.major.as_deref(),
            ThemeFont::Minor => self.minor.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page margins in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Page geometry of one document section (`w:sectPr`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width_cm: f32,
    pub height_cm: f32,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl PageSetup {
    pub fn a4_portrait(margins: Margins) -> Self {
        Self {
            width_cm: 21.0,
            height_cm: 29.7,
            orientation: Orientation::Portrait,
            margins,
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        // Word's built-in letter page with 1" margins
        Self {
            width_cm: 21.59,
            height_cm: 27.94,
            orientation: Orientation::Portrait,
            margins: Margins {
                top: 2.54,
                bottom: 2.54,
                left: 2.54,
                right: 2.54,
            },
        }
    }
}

/// A block-level child of `w:body`
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    /// Index into [`Document::paragraphs`]
    Paragraph(usize),
    /// Paragraphs of every cell, row-major
    Table(Vec<Paragraph>),
    /// Paragraphs inside a block-level content control (`w:sdt`)
    Sdt(Vec<Paragraph>),
}

impl BodyNode {
    /// Text of a container node, one line per inner paragraph
    pub fn container_text(&self) -> Option<String> {
        match self {
            BodyNode::Paragraph(_) => None,
            BodyNode::Table(ps) | BodyNode::Sdt(ps) => Some(
                ps.iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

/// Block as produced by a reader before indices are assigned
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Vec<Paragraph>),
    Sdt(Vec<Paragraph>),
}

/// The parsed document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub body: Vec<BodyNode>,
    pub styles: StyleSheet,
    pub defaults: DocDefaults,
    pub sections: Vec<PageSetup>,
    pub theme: ThemeFonts,
    body_position: Vec<usize>,
}

impl Document {
    /// Assign paragraph indices and the paragraph→body-node map
    pub fn assemble(
        blocks: Vec<Block>,
        styles: StyleSheet,
        defaults: DocDefaults,
        sections: Vec<PageSetup>,
        theme: ThemeFonts,
    ) -> Self {
        let mut paragraphs = Vec::new();
        let mut body = Vec::with_capacity(blocks.len());
        let mut body_position = Vec::new();

        for block in blocks {
            match block {
                Block::Paragraph(mut p) => {
                    p.index = paragraphs.len();
                    body_position.push(body.len());
                    body.push(BodyNode::Paragraph(p.index));
                    paragraphs.push(p);
                }
                Block::Table(ps) => body.push(BodyNode::Table(ps)),
                Block::Sdt(ps) => body.push(BodyNode::Sdt(ps)),
            }
        }

        Self {
            paragraphs,
            body,
            styles,
            defaults,
            sections,
            theme,
            body_position,
        }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Position of a top-level paragraph within [`Document::body`]
    pub fn body_position(&self, paragraph: usize) -> Option<usize> {
        self.body_position.get(paragraph).copied()
    }

    /// Body nodes following the given paragraph, in order
    pub fn nodes_after(&self, paragraph: usize) -> &[BodyNode] {
        match self.body_position(paragraph) {
            Some(pos) => &self.body[pos + 1..],
            None => &[],
        }
    }

    /// Section properties governing most of the document (the last `w:sectPr`)
    pub fn main_section(&self) -> Option<&PageSetup> {
        self.sections.last()
    }
}
