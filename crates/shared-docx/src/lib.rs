//! WordprocessingML (`.docx`) document access
//!
//! This crate provides the read-only document model the thesis checks run
//! against: paragraphs, runs, styles, document defaults, page setup and
//! block-level containers.

pub mod builder;
pub mod error;
pub mod model;
mod props;
pub mod reader;

pub use builder::{DocumentBuilder, ParagraphBuilder};
pub use error::DocxError;
pub use model::{
    is_blank_text, Alignment, BodyNode, DocDefaults, Document, FontRef, LineSpacing, Margins,
    NumberingRef, Orientation, PageSetup, Paragraph, ParagraphProps, Run, RunProps, Style,
    StyleKind, StyleSheet, ThemeFont, ThemeFonts,
};
pub use reader::{from_xml_parts, read_docx, read_docx_file};
