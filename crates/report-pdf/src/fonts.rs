//! Helvetica metrics and WinAnsi text encoding
//!
//! The report uses the standard Type1 Helvetica faces, so nothing is embedded.
//! Widths come from the Adobe AFM files in 1/1000 em.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name used in page content streams
    pub fn resource(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }

    pub fn base_font(self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
        }
    }
}

/// Widths of bytes 32..=126
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn byte_width(byte: u8, font: Font) -> u16 {
    if (32..=126).contains(&byte) {
        let table = match font {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        return table[(byte - 32) as usize];
    }
    match (byte, font) {
        // Ç Ö Ü Â Î Û and friends share their base letter's width
        (0xC7, _) => 722,
        (0xD6, _) => 778,
        (0xDC | 0xDB, _) => 722,
        (0xC2, Font::Regular) => 667,
        (0xC2, Font::Bold) => 722,
        (0xCE | 0xEE, _) => 278,
        (0xE7, Font::Regular) => 500,
        (0xE7, Font::Bold) => 556,
        (0xF6 | 0xFC | 0xFB, Font::Regular) => 556,
        (0xF6 | 0xFC | 0xFB, Font::Bold) => 611,
        (0xE2, _) => 556,
        (0x96, _) => 556,
        (0x97, _) => 1000,
        (0x85, _) => 1000,
        (0x95, _) => 350,
        (0x91 | 0x92, Font::Regular) => 222,
        (0x91 | 0x92, Font::Bold) => 278,
        (0x93 | 0x94, Font::Regular) => 333,
        (0x93 | 0x94, Font::Bold) => 500,
        _ => 556,
    }
}

/// Encode text as WinAnsi bytes. Turkish letters outside the code page are
/// written as their unaccented forms.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            'ğ' => b'g',
            'Ğ' => b'G',
            'ş' => b's',
            'Ş' => b'S',
            'ı' => b'i',
            'İ' => b'I',
            '\t' | '\n' | '\r' => b' ',
            '–' => 0x96,
            '—' => 0x97,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '…' => 0x85,
            c if (' '..='~').contains(&c) => c as u8,
            c if ('\u{A0}'..='\u{FF}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Advance width of `text` in points
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = encode(text)
        .into_iter()
        .map(|b| u32::from(byte_width(b, font)))
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap into lines no wider than `max_width`. Words wider than a
/// line are split between characters.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(&candidate, font, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(word, font, size) <= max_width {
                line = word.to_string();
                continue;
            }
            for c in word.chars() {
                line.push(c);
                if text_width(&line, font, size) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_turkish_letters_are_encoded() {
        assert_eq!(encode("Öğrenci"), b"\xD6grenci".to_vec());
        assert_eq!(encode("İŞLEM ışık"), b"ISLEM isik".to_vec());
        assert_eq!(encode("Çü"), vec![0xC7, 0xFC]);
        assert_eq!(encode("→"), b"?".to_vec());
    }

    #[test]
    fn test_widths() {
        assert!((text_width("a", Font::Regular, 10.0) - 5.56).abs() < 1e-4);
        assert!((text_width("a", Font::Bold, 10.0) - 5.56).abs() < 1e-4);
        assert!(text_width("b", Font::Bold, 10.0) > text_width("b", Font::Regular, 10.0));
        assert_eq!(text_width("", Font::Regular, 12.0), 0.0);
    }

    #[test]
    fn test_wrap() {
        let lines = wrap("Tez başlığı büyük harflerle yazılmalıdır", Font::Regular, 10.0, 80.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "Tez başlığı büyük harflerle yazılmalıdır");
        assert_eq!(wrap("", Font::Regular, 10.0, 80.0), vec![String::new()]);
    }

    #[test]
    fn test_long_word_is_split() {
        let word = "a".repeat(50);
        let lines = wrap(&word, Font::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    proptest! {
        #[test]
        fn prop_wrapped_lines_fit(words in proptest::collection::vec("[a-zçğıöşü]{1,8}", 1..30)) {
            let text = words.join(" ");
            let lines = wrap(&text, Font::Regular, 9.0, 120.0);
            for line in &lines {
                prop_assert!(text_width(line, Font::Regular, 9.0) <= 120.0);
            }
            prop_assert_eq!(lines.join(" "), text);
        }
    }
}
