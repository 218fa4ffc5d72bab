//! Turkish-aware text folding shared by the checker and the report
//!
//! The folding table:
//!
//! | input            | folded |
//! |------------------|--------|
//! | `I` `İ` `ı` `î`  | `i`    |
//! | `Ç` `ç`          | `c`    |
//! | `Ğ` `ğ`          | `g`    |
//! | `Ö` `ö`          | `o`    |
//! | `Ş` `ş`          | `s`    |
//! | `Ü` `ü` `û`      | `u`    |
//! | `Â` `â`          | `a`    |
//!
//! Everything else is lowercased with the Unicode default mapping. Runs of
//! whitespace (including NBSP and tabs) collapse to one space and zero-width
//! characters are dropped.

fn fold_char(c: char, out: &mut String) {
    match c {
        'I' | 'İ' | 'ı' | 'î' | 'Î' => out.push('i'),
        'Ç' | 'ç' => out.push('c'),
        'Ğ' | 'ğ' => out.push('g'),
        'Ö' | 'ö' => out.push('o'),
        'Ş' | 'ş' => out.push('s'),
        'Ü' | 'ü' | 'û' | 'Û' => out.push('u'),
        'Â' | 'â' => out.push('a'),
        // combining dot above left behind by decomposed İ
        '\u{0307}' => {}
        _ => out.extend(c.to_lowercase()),
    }
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{00ad}')
}

/// Collapse whitespace runs to single spaces, drop zero-width characters, trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace())
        .map(|w| w.chars().filter(|c| !is_invisible(*c)).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case- and diacritic-fold text for tolerant comparison
pub fn fold(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let mut out = String::with_capacity(collapsed.len());
    for c in collapsed.chars() {
        fold_char(c, &mut out);
    }
    out
}

/// Fold the literal characters of a regex pattern, leaving escapes intact
/// so that `\S`, `\D` or `\W` keep their meaning.
pub fn fold_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            fold_char(c, &mut out);
        }
    }
    out
}
