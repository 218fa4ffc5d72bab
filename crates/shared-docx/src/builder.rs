//! Programmatic document construction
//!
//! Lets tests and tools describe a thesis paragraph by paragraph without
//! producing WordprocessingML.

use crate::model::{
    Alignment, Block, DocDefaults, Document, FontRef, LineSpacing, Margins, NumberingRef,
    PageSetup, Paragraph, ParagraphProps, Run, RunProps, Style, StyleSheet, ThemeFonts,
};

/// Builder for a [`Document`]
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    blocks: Vec<Block>,
    styles: StyleSheet,
    defaults: DocDefaults,
    sections: Vec<PageSetup>,
    theme: ThemeFonts,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Empty A4 portrait document with 12pt Times New Roman defaults
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            styles: StyleSheet::new(),
            defaults: DocDefaults {
                run: RunProps::new().font("Times New Roman").size(12.0),
                paragraph: ParagraphProps::default(),
            },
            sections: vec![PageSetup::a4_portrait(Margins {
                top: 3.0,
                bottom: 2.5,
                left: 3.5,
                right: 2.5,
            })],
            theme: ThemeFonts::default(),
        }
    }

    pub fn defaults(mut self, run: RunProps, paragraph: ParagraphProps) -> Self {
        self.defaults = DocDefaults { run, paragraph };
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.styles.insert(style);
        self
    }

    pub fn theme(mut self, major: &str, minor: &str) -> Self {
        self.theme = ThemeFonts {
            major: Some(major.to_string()),
            minor: Some(minor.to_string()),
        };
        self
    }

    /// Replace all sections with one page setup
    pub fn page(mut self, setup: PageSetup) -> Self {
        self.sections = vec![setup];
        self
    }

    pub fn paragraph(mut self, p: ParagraphBuilder) -> Self {
        self.blocks.push(Block::Paragraph(p.build()));
        self
    }

    /// Shorthand for a paragraph with a single unformatted run
    pub fn text(self, text: &str) -> Self {
        self.paragraph(ParagraphBuilder::new(text))
    }

    pub fn blank(self) -> Self {
        self.paragraph(ParagraphBuilder::empty())
    }

    pub fn blanks(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.blank();
        }
        self
    }

    /// A table node with one paragraph per cell text
    pub fn table(mut self, cells: &[&str]) -> Self {
        self.blocks.push(Block::Table(
            cells.iter().map(|t| ParagraphBuilder::new(t).build()).collect(),
        ));
        self
    }

    /// A block-level content control with one paragraph per line
    pub fn sdt(mut self, lines: &[&str]) -> Self {
        self.blocks.push(Block::Sdt(
            lines.iter().map(|t| ParagraphBuilder::new(t).build()).collect(),
        ));
        self
    }

    /// Number of top-level paragraphs added so far
    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count()
    }

    pub fn build(self) -> Document {
        Document::assemble(
            self.blocks,
            self.styles,
            self.defaults,
            self.sections,
            self.theme,
        )
    }
}

/// Builder for one [`Paragraph`]; run-level setters apply to every run
#[derive(Debug, Clone, Default)]
pub struct ParagraphBuilder {
    paragraph: Paragraph,
}

impl ParagraphBuilder {
    pub fn new(text: &str) -> Self {
        Self::empty().run(text, RunProps::default())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a run with its own properties
    pub fn run(mut self, text: &str, props: RunProps) -> Self {
        self.paragraph.text.push_str(text);
        self.paragraph.runs.push(Run::new(text, props));
        self
    }

    fn each_run(mut self, f: impl Fn(&mut RunProps)) -> Self {
        for run in &mut self.paragraph.runs {
            f(&mut run.props);
        }
        f(&mut self.paragraph.mark);
        self
    }

    pub fn font(self, name: &str) -> Self {
        self.each_run(|r| r.font = Some(FontRef::Named(name.to_string())))
    }

    pub fn size(self, pt: f32) -> Self {
        self.each_run(|r| r.size = Some(pt))
    }

    pub fn bold(self) -> Self {
        self.each_run(|r| r.bold = Some(true))
    }

    pub fn italic(self) -> Self {
        self.each_run(|r| r.italic = Some(true))
    }

    pub fn style(mut self, id: &str) -> Self {
        self.paragraph.props.style_id = Some(id.to_string());
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.paragraph.props.alignment = Some(alignment);
        self
    }

    pub fn line_spacing(mut self, spacing: LineSpacing) -> Self {
        self.paragraph.props.line_spacing = Some(spacing);
        self
    }

    pub fn spacing(mut self, before: f32, after: f32) -> Self {
        self.paragraph.props.space_before = Some(before);
        self.paragraph.props.space_after = Some(after);
        self
    }

    pub fn left_indent(mut self, cm: f32) -> Self {
        self.paragraph.props.left_indent = Some(cm);
        self
    }

    pub fn first_line(mut self, cm: f32) -> Self {
        self.paragraph.props.first_line_indent = Some(cm);
        self
    }

    pub fn numbered(mut self, level: u8) -> Self {
        self.paragraph.props.numbering = Some(NumberingRef {
            num_id: "1".to_string(),
            level,
        });
        self
    }

    pub fn drawing(mut self) -> Self {
        self.paragraph.has_drawing = true;
        self
    }

    pub fn math(mut self) -> Self {
        self.paragraph.has_math = true;
        self
    }

    pub fn build(self) -> Paragraph {
        self.paragraph
    }
}
