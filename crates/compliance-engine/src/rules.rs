//! Rule book: the ordered, sectioned list of rule descriptors (`rules.yaml`)

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared_docx::Alignment;

use crate::anchors::AnchorKey;
use crate::error::RuleConfigError;

pub const DEFAULT_SIZE_TOLERANCE: f32 = 0.1;
pub const DEFAULT_LINE_SPACING_TOLERANCE: f32 = 0.1;
pub const DEFAULT_SPACING_TOLERANCE: f32 = 1.0;
pub const DEFAULT_INDENT_TOLERANCE: f32 = 0.05;

/// Expected effective formatting; unset fields are not checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSpec {
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub alignment: Option<Alignment>,
    /// Multiple of single spacing
    pub line_spacing: Option<f32>,
    /// Exact / at-least spacing in points
    pub line_spacing_pt: Option<f32>,
    pub space_before: Option<f32>,
    pub space_after: Option<f32>,
    pub left_indent_cm: Option<f32>,
    /// Negative for a hanging indent
    pub first_line_indent_cm: Option<f32>,
    pub uppercase: Option<bool>,

    pub size_tolerance: Option<f32>,
    pub line_spacing_tolerance: Option<f32>,
    pub spacing_tolerance: Option<f32>,
    pub indent_tolerance: Option<f32>,
}

impl FormatSpec {
    pub fn size_tolerance(&self) -> f32 {
        self.size_tolerance.unwrap_or(DEFAULT_SIZE_TOLERANCE)
    }

    pub fn line_spacing_tolerance(&self) -> f32 {
        self.line_spacing_tolerance
            .unwrap_or(DEFAULT_LINE_SPACING_TOLERANCE)
    }

    pub fn spacing_tolerance(&self) -> f32 {
        self.spacing_tolerance.unwrap_or(DEFAULT_SPACING_TOLERANCE)
    }

    pub fn indent_tolerance(&self) -> f32 {
        self.indent_tolerance.unwrap_or(DEFAULT_INDENT_TOLERANCE)
    }

    /// Copy of this spec with the bold expectation removed
    pub fn without_bold(&self) -> Self {
        Self {
            bold: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Tr,
    En,
}

/// Expected page margins in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSpec {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Expected portrait paper size in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSpec {
    pub width_cm: f32,
    pub height_cm: f32,
}

impl Default for PaperSpec {
    fn default() -> Self {
        Self {
            width_cm: 21.0,
            height_cm: 29.7,
        }
    }
}

/// One rule descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Check-procedure tag
    pub check: String,
    pub title: String,

    #[serde(flatten)]
    pub format: FormatSpec,

    // Location
    pub markers: Vec<String>,
    pub exact_text: Option<String>,
    pub after: Option<AnchorKey>,
    pub before: Option<AnchorKey>,
    /// Anchor written by generic heading checks
    pub anchor: Option<AnchorKey>,
    pub must_exist: bool,

    // Blank-line runs
    pub min_blank: Option<usize>,
    pub max_blank: Option<usize>,
    pub blank_format: Option<FormatSpec>,

    // Content
    pub suffix: Option<String>,
    pub pattern: Option<String>,
    pub allowed_values: Vec<String>,
    pub required_keywords: Vec<String>,
    pub min_lines: Option<usize>,
    pub max_lines: Option<usize>,
    pub block_lines: Option<usize>,
    pub fonts: Vec<String>,
    pub exempt_fonts: Vec<String>,
    pub equation_fonts: Vec<String>,
    /// Sub-heading depth as the count of number parts: 2 for "1.1", 3 for "1.1.1"
    pub level: Option<u8>,
    pub stop_markers: Vec<String>,
    pub label_markers: Vec<String>,
    pub alt_markers: Vec<String>,
    pub language: Language,
    pub max_reports: Option<usize>,

    // Page geometry
    pub margins: Option<MarginSpec>,
    pub landscape_margins: Option<MarginSpec>,
    pub paper: Option<PaperSpec>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            check: String::new(),
            title: String::new(),
            format: FormatSpec::default(),
            markers: Vec::new(),
            exact_text: None,
            after: None,
            before: None,
            anchor: None,
            must_exist: true,
            min_blank: None,
            max_blank: None,
            blank_format: None,
            suffix: None,
            pattern: None,
            allowed_values: Vec::new(),
            required_keywords: Vec::new(),
            min_lines: None,
            max_lines: None,
            block_lines: None,
            fonts: Vec::new(),
            exempt_fonts: Vec::new(),
            equation_fonts: Vec::new(),
            level: None,
            stop_markers: Vec::new(),
            label_markers: Vec::new(),
            alt_markers: Vec::new(),
            language: Language::Tr,
            max_reports: None,
            margins: None,
            landscape_margins: None,
            paper: None,
        }
    }
}

impl Rule {
    pub fn new(check: &str, title: &str) -> Self {
        Self {
            check: check.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn has_blank_bounds(&self) -> bool {
        self.min_blank.is_some() || self.max_blank.is_some()
    }
}

/// A named group of rules, reported together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSection {
    pub key: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub sections: Vec<RuleSection>,
}

impl RuleBook {
    pub fn from_yaml_str(yaml: &str, path: &str) -> Result<Self, RuleConfigError> {
        let book: RuleBook =
            serde_yaml::from_str(yaml).map_err(|source| RuleConfigError::Yaml {
                path: path.to_string(),
                source,
            })?;
        book.validate()?;
        Ok(book)
    }

    pub fn from_path(path: &Path) -> Result<Self, RuleConfigError> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| RuleConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &display)
    }

    fn validate(&self) -> Result<(), RuleConfigError> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.key.as_str()) {
                return Err(RuleConfigError::DuplicateSection(section.key.clone()));
            }
        }
        Ok(())
    }

    pub fn section(&self, key: &str) -> Option<&RuleSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn rule_count(&self) -> usize {
        self.sections.iter().map(|s| s.rules.len()).sum()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.sections.iter().flat_map(|s| s.rules.iter())
    }
}
