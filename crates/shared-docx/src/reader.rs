//! `.docx` package reader
//!
//! Streams `word/document.xml`, `word/styles.xml` and the theme part with
//! quick-xml and builds the [`Document`] model.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::DocxError;
use crate::model::{
    Block, DocDefaults, Document, PageSetup, Paragraph, Run, RunProps, Style, StyleKind,
    StyleSheet, ThemeFonts,
};
use crate::props::{
    apply_paragraph_property, apply_run_property, apply_section_property, finish_numbering,
    Attrs,
};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const THEME_PART: &str = "word/theme/theme1.xml";

/// Read a `.docx` file from disk
pub fn read_docx_file(path: &Path) -> Result<Document, DocxError> {
    let bytes = std::fs::read(path)?;
    read_docx(&bytes)
}

/// Read a `.docx` package from memory
pub fn read_docx(bytes: &[u8]) -> Result<Document, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles_xml = read_part(&mut archive, STYLES_PART)?;
    let theme_xml = read_part(&mut archive, THEME_PART)?;

    debug!(
        document_bytes = document_xml.len(),
        has_styles = styles_xml.is_some(),
        has_theme = theme_xml.is_some(),
        "read docx parts"
    );

    from_xml_parts(&document_xml, styles_xml.as_deref(), theme_xml.as_deref())
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, DocxError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Build a document from raw part XML (used directly by tests)
pub fn from_xml_parts(
    document_xml: &str,
    styles_xml: Option<&str>,
    theme_xml: Option<&str>,
) -> Result<Document, DocxError> {
    let (styles, defaults) = match styles_xml {
        Some(xml) => read_styles(xml)?,
        None => (StyleSheet::new(), DocDefaults::default()),
    };
    let theme = match theme_xml {
        Some(xml) => read_theme(xml)?,
        None => ThemeFonts::default(),
    };

    let mut body = BodyReader::default();
    body.read(document_xml)?;

    let doc = Document::assemble(body.blocks, styles, defaults, body.sections, theme);
    debug!(
        paragraphs = doc.len(),
        nodes = doc.body.len(),
        styles = doc.styles.len(),
        "assembled document"
    );
    Ok(doc)
}

fn xml_error(part: &str, position: usize, err: quick_xml::Error) -> DocxError {
    DocxError::Xml {
        part: part.to_string(),
        position,
        message: err.to_string(),
    }
}

fn qualified_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn local_part(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

// ============================================================================
// document.xml
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Target {
    #[default]
    None,
    Paragraph,
    Mark,
    Run,
    Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Table,
    Sdt,
}

#[derive(Default)]
struct BodyReader {
    blocks: Vec<Block>,
    sections: Vec<PageSetup>,
    container: Option<(ContainerKind, Vec<Paragraph>)>,
    container_depth: usize,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    section: Option<PageSetup>,
    target: Target,
    in_text: bool,
    skip_depth: usize,
}

impl BodyReader {
    fn read(&mut self, xml: &str) -> Result<(), DocxError> {
        let mut reader = Reader::from_str(xml);

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if self.skip_depth > 0 {
                        self.skip_depth += 1;
                    } else {
                        self.open(&e, false);
                    }
                }
                Ok(Event::Empty(e)) => {
                    if self.skip_depth == 0 {
                        self.open(&e, true);
                        self.close(&qualified_name(&e));
                    }
                }
                Ok(Event::End(e)) => {
                    if self.skip_depth > 0 {
                        self.skip_depth -= 1;
                    } else {
                        self.close(&String::from_utf8_lossy(e.name().as_ref()));
                    }
                }
                Ok(Event::Text(t)) => {
                    if self.skip_depth == 0 && self.in_text {
                        let text = t
                            .unescape()
                            .map_err(|e| xml_error(DOCUMENT_PART, position, e))?;
                        if let Some(run) = self.run.as_mut() {
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(DOCUMENT_PART, position, e)),
                _ => {}
            }
        }

        Ok(())
    }

    fn open(&mut self, e: &BytesStart, empty: bool) {
        let qname = qualified_name(e);
        match qname.as_str() {
            "w:tbl" => self.enter_container(ContainerKind::Table),
            "w:sdt" if self.paragraph.is_none() => self.enter_container(ContainerKind::Sdt),
            "w:p" => {
                self.paragraph = Some(Paragraph::default());
                self.target = Target::None;
            }
            "w:pPr" if self.paragraph.is_some() && self.run.is_none() => {
                self.target = Target::Paragraph;
            }
            "w:rPr" => {
                if self.target == Target::Paragraph {
                    self.target = Target::Mark;
                } else if self.run.is_some() {
                    self.target = Target::Run;
                }
            }
            "w:sectPr" => {
                self.section = Some(PageSetup::default());
                self.target = Target::Section;
            }
            "w:r" if self.paragraph.is_some() => {
                self.run = Some(Run::new("", RunProps::default()));
                self.target = Target::None;
            }
            "w:t" if self.run.is_some() => self.in_text = !empty,
            "w:tab" if self.run.is_some() && self.target == Target::None => {
                self.push_text("\t");
            }
            "w:br" | "w:cr" if self.run.is_some() && self.target == Target::None => {
                let attrs = Attrs::of(e);
                if !matches!(attrs.get("type"), Some("page" | "column")) {
                    self.push_text("\n");
                }
            }
            "w:drawing" | "w:pict" | "mc:AlternateContent" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.has_drawing = true;
                }
                self.skip(empty);
            }
            "w:object" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.has_object = true;
                }
                self.skip(empty);
            }
            "m:oMath" | "m:oMathPara" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.has_math = true;
                }
                self.skip(empty);
            }
            "w:del" | "w:txbxContent" | "w:pPrChange" | "w:rPrChange" | "w:sectPrChange" => {
                self.skip(empty)
            }
            _ => self.apply_property(local_part(&qname), e),
        }
    }

    fn close(&mut self, qname: &str) {
        match qname {
            "w:t" => self.in_text = false,
            "w:r" => {
                if let Some(run) = self.run.take() {
                    if let Some(p) = self.paragraph.as_mut() {
                        p.text.push_str(&run.text);
                        p.runs.push(run);
                    }
                }
                self.target = Target::None;
            }
            "w:rPr" => {
                self.target = match self.target {
                    Target::Mark => Target::Paragraph,
                    _ => Target::None,
                };
            }
            "w:pPr" => self.target = Target::None,
            "w:sectPr" => {
                if let Some(section) = self.section.take() {
                    self.sections.push(section);
                }
                self.target = if self.paragraph.is_some() {
                    Target::Paragraph
                } else {
                    Target::None
                };
            }
            "w:p" => {
                if let Some(mut p) = self.paragraph.take() {
                    finish_numbering(&mut p.props);
                    match self.container.as_mut() {
                        Some((_, inner)) => inner.push(p),
                        None => self.blocks.push(Block::Paragraph(p)),
                    }
                }
                self.target = Target::None;
            }
            "w:tbl" => self.leave_container(),
            "w:sdt" if self.paragraph.is_none() => self.leave_container(),
            _ => {}
        }
    }

    fn enter_container(&mut self, kind: ContainerKind) {
        if self.container_depth == 0 {
            self.container = Some((kind, Vec::new()));
        }
        self.container_depth += 1;
    }

    fn leave_container(&mut self) {
        if self.container_depth == 0 {
            return;
        }
        self.container_depth -= 1;
        if self.container_depth == 0 {
            if let Some((kind, inner)) = self.container.take() {
                self.blocks.push(match kind {
                    ContainerKind::Table => Block::Table(inner),
                    ContainerKind::Sdt => Block::Sdt(inner),
                });
            }
        }
    }

    fn skip(&mut self, empty: bool) {
        if !empty {
            self.skip_depth = 1;
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn apply_property(&mut self, name: &str, e: &BytesStart) {
        match self.target {
            Target::None => {}
            Target::Paragraph => {
                if let Some(p) = self.paragraph.as_mut() {
                    apply_paragraph_property(name, &Attrs::of(e), &mut p.props);
                }
            }
            Target::Mark => {
                if let Some(p) = self.paragraph.as_mut() {
                    apply_run_property(name, &Attrs::of(e), &mut p.mark);
                }
            }
            Target::Run => {
                if let Some(run) = self.run.as_mut() {
                    apply_run_property(name, &Attrs::of(e), &mut run.props);
                }
            }
            Target::Section => {
                if let Some(section) = self.section.as_mut() {
                    apply_section_property(name, &Attrs::of(e), section);
                }
            }
        }
    }
}

// ============================================================================
// styles.xml
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleTarget {
    None,
    StyleRun,
    StyleParagraph,
    DefaultRun,
    DefaultParagraph,
}

/// Parse `word/styles.xml` into a style sheet and the document defaults
pub fn read_styles(xml: &str) -> Result<(StyleSheet, DocDefaults), DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut sheet = StyleSheet::new();
    let mut defaults = DocDefaults::default();
    let mut current: Option<Style> = None;
    let mut target = StyleTarget::None;
    let mut in_run_default = false;
    let mut in_paragraph_default = false;
    let mut skip_depth = 0usize;

    loop {
        let position = reader.buffer_position();
        let (e, empty) = match reader.read_event() {
            Ok(Event::Start(e)) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }
                (e, false)
            }
            Ok(Event::Empty(e)) => {
                if skip_depth > 0 {
                    continue;
                }
                (e, true)
            }
            Ok(Event::End(e)) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                match local_part(&String::from_utf8_lossy(e.name().as_ref())) {
                    "rPr" | "pPr" => target = StyleTarget::None,
                    "rPrDefault" => in_run_default = false,
                    "pPrDefault" => in_paragraph_default = false,
                    "style" => {
                        if let Some(mut style) = current.take() {
                            finish_numbering(&mut style.paragraph);
                            sheet.insert(style);
                        }
                    }
                    _ => {}
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(STYLES_PART, position, e)),
            _ => continue,
        };

        let qname = qualified_name(&e);
        let name = local_part(&qname);
        let attrs = Attrs::of(&e);

        match name {
            "rPrDefault" => in_run_default = !empty,
            "pPrDefault" => in_paragraph_default = !empty,
            "style" => {
                let style = Style {
                    id: attrs.get("styleId").unwrap_or_default().to_string(),
                    name: String::new(),
                    kind: StyleKind::from_ooxml(attrs.get("type").unwrap_or("paragraph")),
                    based_on: None,
                    is_default: matches!(attrs.get("default"), Some("1" | "true" | "on")),
                    run: RunProps::default(),
                    paragraph: Default::default(),
                };
                if empty {
                    sheet.insert(style);
                } else {
                    current = Some(style);
                }
            }
            "tblStylePr" | "tblPr" | "trPr" | "tcPr" => {
                if !empty {
                    skip_depth = 1;
                }
            }
            "name" if target == StyleTarget::None => {
                if let Some(style) = current.as_mut() {
                    style.name = attrs.get("val").unwrap_or_default().to_string();
                }
            }
            "basedOn" if target == StyleTarget::None => {
                if let Some(style) = current.as_mut() {
                    style.based_on = attrs.get("val").map(str::to_string);
                }
            }
            "rPr" if !empty => {
                target = if current.is_some() {
                    StyleTarget::StyleRun
                } else if in_run_default {
                    StyleTarget::DefaultRun
                } else {
                    StyleTarget::None
                };
            }
            "pPr" if !empty => {
                target = if current.is_some() {
                    StyleTarget::StyleParagraph
                } else if in_paragraph_default {
                    StyleTarget::DefaultParagraph
                } else {
                    StyleTarget::None
                };
            }
            _ => match target {
                StyleTarget::StyleRun => {
                    if let Some(style) = current.as_mut() {
                        apply_run_property(name, &attrs, &mut style.run);
                    }
                }
                StyleTarget::StyleParagraph => {
                    if let Some(style) = current.as_mut() {
                        apply_paragraph_property(name, &attrs, &mut style.paragraph);
                    }
                }
                StyleTarget::DefaultRun => apply_run_property(name, &attrs, &mut defaults.run),
                StyleTarget::DefaultParagraph => {
                    apply_paragraph_property(name, &attrs, &mut defaults.paragraph)
                }
                StyleTarget::None => {}
            },
        }
    }

    Ok((sheet, defaults))
}

// ============================================================================
// theme1.xml
// ============================================================================

/// Extract the major/minor latin typefaces from a theme part
pub fn read_theme(xml: &str) -> Result<ThemeFonts, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut fonts = ThemeFonts::default();
    let mut slot: Option<bool> = None; // Some(true) = major

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let qname = qualified_name(&e);
                match local_part(&qname) {
                    "majorFont" => slot = Some(true),
                    "minorFont" => slot = Some(false),
                    "latin" => {
                        let typeface = Attrs::of(&e).get("typeface").map(str::to_string);
                        match slot {
                            Some(true) if fonts.major.is_none() => fonts.major = typeface,
                            Some(false) if fonts.minor.is_none() => fonts.minor = typeface,
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if matches!(
                    local_part(&String::from_utf8_lossy(e.name().as_ref())),
                    "majorFont" | "minorFont"
                ) {
                    slot = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(THEME_PART, position, e)),
            _ => {}
        }
    }

    Ok(fonts)
}
