//! Shared appliers for `w:rPr` / `w:pPr` / `w:sectPr` children
//!
//! The same property elements appear in `document.xml` (direct formatting)
//! and in `styles.xml` (style and default formatting), so both readers route
//! their child elements through these functions.

use quick_xml::events::BytesStart;

use crate::model::{
    Alignment, FontRef, LineSpacing, NumberingRef, Orientation, PageSetup, ParagraphProps,
    RunProps, ThemeFont,
};

const TWIPS_PER_CM: f32 = 1440.0 / 2.54;

pub(crate) fn twips_to_cm(twips: f32) -> f32 {
    twips / TWIPS_PER_CM
}

/// Attributes of one element keyed by local name (`w:val` → `val`)
pub(crate) struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub(crate) fn of(e: &BytesStart) -> Self {
        Attrs(
            e.attributes()
                .flatten()
                .map(|a| {
                    (
                        String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned(),
                        String::from_utf8_lossy(&a.value).into_owned(),
                    )
                })
                .collect(),
        )
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn number(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(|v| v.trim().parse::<f32>().ok())
    }

    /// OOXML on/off toggle: absent `w:val` means on
    pub(crate) fn on_off(&self) -> bool {
        !matches!(self.get("val"), Some("0" | "false" | "off" | "none"))
    }
}

pub(crate) fn apply_run_property(name: &str, attrs: &Attrs, props: &mut RunProps) {
    match name {
        "rStyle" => props.style_id = attrs.get("val").map(str::to_string),
        "rFonts" => {
            // theme attributes take precedence over explicit names in Word
            if let Some(theme) = attrs.get("asciiTheme").or_else(|| attrs.get("hAnsiTheme")) {
                let slot = if theme.starts_with("major") {
                    ThemeFont::Major
                } else {
                    ThemeFont::Minor
                };
                props.font = Some(FontRef::Theme(slot));
            } else if let Some(name) = attrs.get("ascii").or_else(|| attrs.get("hAnsi")) {
                props.font = Some(FontRef::Named(name.to_string()));
            }
        }
        "sz" => {
            if let Some(half_points) = attrs.number("val") {
                props.size = Some(half_points / 2.0);
            }
        }
        "b" => props.bold = Some(attrs.on_off()),
        "i" => props.italic = Some(attrs.on_off()),
        "caps" => props.caps = Some(attrs.on_off()),
        _ => {}
    }
}

pub(crate) fn apply_paragraph_property(name: &str, attrs: &Attrs, props: &mut ParagraphProps) {
    match name {
        "pStyle" => props.style_id = attrs.get("val").map(str::to_string),
        "jc" => {
            if let Some(alignment) = attrs.get("val").and_then(Alignment::from_ooxml) {
                props.alignment = Some(alignment);
            }
        }
        "spacing" => {
            if let Some(before) = attrs.number("before") {
                props.space_before = Some(before / 20.0);
            }
            if let Some(after) = attrs.number("after") {
                props.space_after = Some(after / 20.0);
            }
            if let Some(line) = attrs.number("line") {
                props.line_spacing = Some(match attrs.get("lineRule") {
                    Some("exact") => LineSpacing::Exact(line / 20.0),
                    Some("atLeast") => LineSpacing::AtLeast(line / 20.0),
                    _ => LineSpacing::Multiple(line / 240.0),
                });
            }
        }
        "ind" => {
            if let Some(left) = attrs.number("left").or_else(|| attrs.number("start")) {
                props.left_indent = Some(twips_to_cm(left));
            }
            if let Some(hanging) = attrs.number("hanging") {
                props.first_line_indent = Some(-twips_to_cm(hanging));
            } else if let Some(first) = attrs.number("firstLine") {
                props.first_line_indent = Some(twips_to_cm(first));
            }
        }
        "ilvl" => {
            let level = attrs.number("val").map(|v| v as u8).unwrap_or(0);
            props
                .numbering
                .get_or_insert_with(|| NumberingRef {
                    num_id: String::new(),
                    level: 0,
                })
                .level = level;
        }
        "numId" => {
            let id = attrs.get("val").unwrap_or("0").to_string();
            props
                .numbering
                .get_or_insert_with(|| NumberingRef {
                    num_id: String::new(),
                    level: 0,
                })
                .num_id = id;
        }
        _ => {}
    }
}

/// Drop numbering references that are empty or explicitly disabled (`numId="0"`)
pub(crate) fn finish_numbering(props: &mut ParagraphProps) {
    if props
        .numbering
        .as_ref()
        .is_some_and(|n| n.num_id.is_empty() || n.num_id == "0")
    {
        props.numbering = None;
    }
}

pub(crate) fn apply_section_property(name: &str, attrs: &Attrs, setup: &mut PageSetup) {
    match name {
        "pgSz" => {
            if let Some(w) = attrs.number("w") {
                setup.width_cm = twips_to_cm(w);
            }
            if let Some(h) = attrs.number("h") {
                setup.height_cm = twips_to_cm(h);
            }
            setup.orientation = match attrs.get("orient") {
                Some("landscape") => Orientation::Landscape,
                Some(_) => Orientation::Portrait,
                None if setup.width_cm > setup.height_cm => Orientation::Landscape,
                None => Orientation::Portrait,
            };
        }
        "pgMar" => {
            if let Some(v) = attrs.number("top") {
                setup.margins.top = twips_to_cm(v.abs());
            }
            if let Some(v) = attrs.number("bottom") {
                setup.margins.bottom = twips_to_cm(v.abs());
            }
            if let Some(v) = attrs.number("left").or_else(|| attrs.number("start")) {
                setup.margins.left = twips_to_cm(v);
            }
            if let Some(v) = attrs.number("right").or_else(|| attrs.number("end")) {
                setup.margins.right = twips_to_cm(v);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips_conversion() {
        assert!((twips_to_cm(1440.0) - 2.54).abs() < 1e-4);
        assert!((twips_to_cm(567.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_numbering_disabled_by_zero_id() {
        let mut props = ParagraphProps {
            numbering: Some(NumberingRef {
                num_id: "0".into(),
                level: 0,
            }),
            ..Default::default()
        };
        finish_numbering(&mut props);
        assert!(props.numbering.is_none());
    }
}
