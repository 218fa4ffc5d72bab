//! Effective-format resolution
//!
//! A run property resolves through: the run itself, its character style
//! chain, the paragraph style chain, then the document defaults. Paragraph
//! properties resolve through the paragraph, its style chain, then the
//! defaults. Resolution is a pure read of the [`Document`].

use shared_docx::{
    Alignment, Document, FontRef, LineSpacing, Paragraph, ParagraphProps, RunProps, Style,
};

use crate::normalize::is_upper;
use crate::rules::FormatSpec;

/// Word's rendering defaults when nothing in the chain says otherwise
pub const FALLBACK_FONT: &str = "Times New Roman";
pub const FALLBACK_SIZE: f32 = 10.0;

/// Attributes a check can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    FontName,
    FontSize,
    Bold,
    Italic,
    Caps,
    Alignment,
    LineSpacing,
    SpaceBefore,
    SpaceAfter,
    LeftIndent,
    FirstLineIndent,
}

/// A resolved attribute, or `Unset` when no level of the chain specifies it
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    Unset,
    Font(String),
    Points(f32),
    Flag(bool),
    Align(Alignment),
    Spacing(LineSpacing),
    Centimetres(f32),
}

pub fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

pub fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

fn normalize_spacing(spacing: LineSpacing) -> LineSpacing {
    match spacing {
        LineSpacing::Multiple(m) => LineSpacing::Multiple(round2(m)),
        LineSpacing::Exact(pt) => LineSpacing::Exact(round1(pt)),
        LineSpacing::AtLeast(pt) => LineSpacing::AtLeast(round1(pt)),
    }
}

pub fn describe_spacing(spacing: LineSpacing) -> String {
    match spacing {
        LineSpacing::Multiple(m) => format!("{:.2} satır", m),
        LineSpacing::Exact(pt) => format!("tam {:.1} pt", pt),
        LineSpacing::AtLeast(pt) => format!("en az {:.1} pt", pt),
    }
}

/// Resolved formatting of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunFormat {
    pub font: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub caps: bool,
}

/// Resolved formatting of a paragraph, with call-site defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveFormat {
    /// One entry per visible run; the paragraph mark when there are none
    pub runs: Vec<RunFormat>,
    pub alignment: Alignment,
    pub line_spacing: LineSpacing,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
    pub first_line_indent: f32,
}

impl EffectiveFormat {
    pub fn fonts(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for run in &self.runs {
            if !out.contains(&run.font.as_str()) {
                out.push(&run.font);
            }
        }
        out
    }

    pub fn sizes(&self) -> Vec<f32> {
        let mut out: Vec<f32> = Vec::new();
        for run in &self.runs {
            if !out.iter().any(|s| (s - run.size).abs() < f32::EPSILON) {
                out.push(run.size);
            }
        }
        out
    }

    pub fn all_bold(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| r.bold)
    }

    pub fn any_bold(&self) -> bool {
        self.runs.iter().any(|r| r.bold)
    }

    pub fn all_italic(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| r.italic)
    }

    pub fn any_italic(&self) -> bool {
        self.runs.iter().any(|r| r.italic)
    }

    pub fn all_caps(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| r.caps)
    }
}

/// Resolves effective formatting against one document's style sheet
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    doc: &'a Document,
}

impl<'a> Resolver<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    fn paragraph_chain(&self, p: &'a Paragraph) -> Vec<&'a Style> {
        let styles = &self.doc.styles;
        styles.chain(styles.paragraph_style(p.style_id()))
    }

    fn character_chain(&self, props: &'a RunProps) -> Vec<&'a Style> {
        let styles = &self.doc.styles;
        styles.chain(props.style_id.as_deref().and_then(|id| styles.get(id)))
    }

    /// Resolve one run-level property for `props` inside `p`
    pub fn run_value<T>(
        &self,
        p: &'a Paragraph,
        props: &'a RunProps,
        pick: impl Fn(&RunProps) -> Option<T>,
    ) -> Option<T> {
        pick(props)
            .or_else(|| {
                self.character_chain(props)
                    .into_iter()
                    .find_map(|s| pick(&s.run))
            })
            .or_else(|| {
                self.paragraph_chain(p)
                    .into_iter()
                    .find_map(|s| pick(&s.run))
            })
            .or_else(|| pick(&self.doc.defaults.run))
    }

    /// Resolve one paragraph-level property
    pub fn paragraph_value<T>(
        &self,
        p: &'a Paragraph,
        pick: impl Fn(&ParagraphProps) -> Option<T>,
    ) -> Option<T> {
        pick(&p.props)
            .or_else(|| {
                self.paragraph_chain(p)
                    .into_iter()
                    .find_map(|s| pick(&s.paragraph))
            })
            .or_else(|| pick(&self.doc.defaults.paragraph))
    }

    /// Font of a run, with theme fonts resolved to their typeface
    pub fn run_font(&self, p: &'a Paragraph, props: &'a RunProps) -> Option<String> {
        match self.run_value(p, props, |r| r.font.clone())? {
            FontRef::Named(name) => Some(name),
            FontRef::Theme(slot) => self.doc.theme.get(slot).map(str::to_string),
        }
    }

    /// Properties of the run that decides how the paragraph looks: the first
    /// visible run, else the paragraph mark
    fn leading_props(p: &'a Paragraph) -> &'a RunProps {
        p.text_runs().next().map(|r| &r.props).unwrap_or(&p.mark)
    }

    /// Resolve one attribute of a paragraph (its leading run for run attributes)
    pub fn resolve(&self, p: &'a Paragraph, attribute: Attribute) -> FormatValue {
        let props = Self::leading_props(p);
        let value = match attribute {
            Attribute::FontName => self.run_font(p, props).map(FormatValue::Font),
            Attribute::FontSize => self.run_value(p, props, |r| r.size).map(FormatValue::Points),
            Attribute::Bold => self.run_value(p, props, |r| r.bold).map(FormatValue::Flag),
            Attribute::Italic => self.run_value(p, props, |r| r.italic).map(FormatValue::Flag),
            Attribute::Caps => self.run_value(p, props, |r| r.caps).map(FormatValue::Flag),
            Attribute::Alignment => self
                .paragraph_value(p, |pp| pp.alignment)
                .map(FormatValue::Align),
            Attribute::LineSpacing => self
                .paragraph_value(p, |pp| pp.line_spacing)
                .map(FormatValue::Spacing),
            Attribute::SpaceBefore => self
                .paragraph_value(p, |pp| pp.space_before)
                .map(FormatValue::Points),
            Attribute::SpaceAfter => self
                .paragraph_value(p, |pp| pp.space_after)
                .map(FormatValue::Points),
            Attribute::LeftIndent => self
                .paragraph_value(p, |pp| pp.left_indent)
                .map(FormatValue::Centimetres),
            Attribute::FirstLineIndent => self
                .paragraph_value(p, |pp| pp.first_line_indent)
                .map(FormatValue::Centimetres),
        };
        value.unwrap_or(FormatValue::Unset)
    }

    fn run_format(&self, p: &'a Paragraph, props: &'a RunProps) -> RunFormat {
        RunFormat {
            font: self
                .run_font(p, props)
                .unwrap_or_else(|| FALLBACK_FONT.to_string()),
            size: round1(self.run_value(p, props, |r| r.size).unwrap_or(FALLBACK_SIZE)),
            bold: self.run_value(p, props, |r| r.bold).unwrap_or(false),
            italic: self.run_value(p, props, |r| r.italic).unwrap_or(false),
            caps: self.run_value(p, props, |r| r.caps).unwrap_or(false),
        }
    }

    /// Everything a format comparison needs, with unset values defaulted
    pub fn effective(&self, p: &'a Paragraph) -> EffectiveFormat {
        let mut runs: Vec<RunFormat> = p
            .text_runs()
            .map(|r| self.run_format(p, &r.props))
            .collect();
        if runs.is_empty() {
            runs.push(self.run_format(p, &p.mark));
        }

        EffectiveFormat {
            runs,
            alignment: self
                .paragraph_value(p, |pp| pp.alignment)
                .unwrap_or(Alignment::Left),
            line_spacing: normalize_spacing(
                self.paragraph_value(p, |pp| pp.line_spacing)
                    .unwrap_or(LineSpacing::Multiple(1.0)),
            ),
            space_before: round1(self.paragraph_value(p, |pp| pp.space_before).unwrap_or(0.0)),
            space_after: round1(self.paragraph_value(p, |pp| pp.space_after).unwrap_or(0.0)),
            left_indent: round2(self.paragraph_value(p, |pp| pp.left_indent).unwrap_or(0.0)),
            first_line_indent: round2(
                self.paragraph_value(p, |pp| pp.first_line_indent)
                    .unwrap_or(0.0),
            ),
        }
    }

    /// Compare a paragraph against `spec`; one fragment per violated attribute
    pub fn check(&self, p: &'a Paragraph, spec: &FormatSpec) -> Vec<String> {
        format_issues(&self.effective(p), spec, &p.text)
    }
}

/// All mismatches between an effective format and an expectation
pub fn format_issues(eff: &EffectiveFormat, spec: &FormatSpec, text: &str) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(expected) = &spec.font_name {
        let wrong: Vec<&str> = eff
            .fonts()
            .into_iter()
            .filter(|f| !f.trim().eq_ignore_ascii_case(expected.trim()))
            .collect();
        if !wrong.is_empty() {
            issues.push(format!(
                "Yazı tipi {} (beklenen: {})",
                wrong.join(", "),
                expected
            ));
        }
    }

    if let Some(expected) = spec.font_size {
        let tol = spec.size_tolerance();
        let wrong: Vec<String> = eff
            .sizes()
            .into_iter()
            .filter(|s| (s - expected).abs() > tol + f32::EPSILON)
            .map(|s| format!("{:.1}", s))
            .collect();
        if !wrong.is_empty() {
            issues.push(format!(
                "Yazı boyutu {} pt (beklenen: {:.1} pt)",
                wrong.join("/"),
                expected
            ));
        }
    }

    match spec.bold {
        Some(true) if !eff.all_bold() => {
            if eff.any_bold() {
                issues.push("Metnin tamamı kalın değil".to_string());
            } else {
                issues.push("Kalın değil (kalın olmalı)".to_string());
            }
        }
        Some(false) if eff.any_bold() => issues.push("Kalın olmamalı".to_string()),
        _ => {}
    }

    match spec.italic {
        Some(true) if !eff.all_italic() => issues.push("İtalik değil (italik olmalı)".to_string()),
        Some(false) if eff.any_italic() => issues.push("İtalik olmamalı".to_string()),
        _ => {}
    }

    if let Some(expected) = spec.alignment {
        if eff.alignment != expected {
            issues.push(format!(
                "Hizalama {} (beklenen: {})",
                eff.alignment.label(),
                expected.label()
            ));
        }
    }

    if let Some(expected) = spec.line_spacing {
        let ok = matches!(eff.line_spacing, LineSpacing::Multiple(m)
            if (m - expected).abs() <= spec.line_spacing_tolerance() + f32::EPSILON);
        if !ok {
            issues.push(format!(
                "Satır aralığı {} (beklenen: {:.2} satır)",
                describe_spacing(eff.line_spacing),
                expected
            ));
        }
    }

    if let Some(expected) = spec.line_spacing_pt {
        let tol = spec.line_spacing_tolerance().max(0.2);
        let ok = match eff.line_spacing {
            LineSpacing::Exact(pt) | LineSpacing::AtLeast(pt) => (pt - expected).abs() <= tol,
            LineSpacing::Multiple(_) => false,
        };
        if !ok {
            issues.push(format!(
                "Satır aralığı {} (beklenen: {:.1} pt)",
                describe_spacing(eff.line_spacing),
                expected
            ));
        }
    }

    let spacing_tol = spec.spacing_tolerance();
    if let Some(expected) = spec.space_before {
        if (eff.space_before - expected).abs() > spacing_tol {
            issues.push(format!(
                "Paragraf öncesi boşluk {:.1} pt (beklenen: {:.1} pt)",
                eff.space_before, expected
            ));
        }
    }
    if let Some(expected) = spec.space_after {
        if (eff.space_after - expected).abs() > spacing_tol {
            issues.push(format!(
                "Paragraf sonrası boşluk {:.1} pt (beklenen: {:.1} pt)",
                eff.space_after, expected
            ));
        }
    }

    let indent_tol = spec.indent_tolerance();
    if let Some(expected) = spec.left_indent_cm {
        if (eff.left_indent - expected).abs() > indent_tol + f32::EPSILON {
            issues.push(format!(
                "Sol girinti {:.2} cm (beklenen: {:.2} cm)",
                eff.left_indent, expected
            ));
        }
    }
    if let Some(expected) = spec.first_line_indent_cm {
        if (eff.first_line_indent - expected).abs() > indent_tol + f32::EPSILON {
            issues.push(format!(
                "İlk satır girintisi {:.2} cm (beklenen: {:.2} cm)",
                eff.first_line_indent, expected
            ));
        }
    }

    if spec.uppercase == Some(true) && !eff.all_caps() && !is_upper(text) {
        issues.push("Tamamı büyük harfle yazılmamış".to_string());
    }

    issues
}
