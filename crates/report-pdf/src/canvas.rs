//! Page-by-page drawing surface producing lopdf content operations

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::fonts::{encode, Font};

/// A4 in points
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 42.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GRAY: Rgb = Rgb(0.35, 0.35, 0.35);
    pub const LIGHT_GRAY: Rgb = Rgb(0.88, 0.88, 0.88);
    pub const HEADER: Rgb = Rgb(0.90, 0.92, 0.96);
    pub const GREEN: Rgb = Rgb(0.13, 0.59, 0.24);
    pub const ORANGE: Rgb = Rgb(0.93, 0.55, 0.10);
    pub const RED: Rgb = Rgb(0.80, 0.13, 0.13);

    fn operands(self) -> Vec<Object> {
        vec![Object::Real(self.0), Object::Real(self.1), Object::Real(self.2)]
    }
}

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

/// Collects drawing operations per page and tracks the vertical cursor.
/// Coordinates follow PDF user space: origin bottom-left.
pub struct Canvas {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    /// Top of the free area on the current page
    pub y: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn content_width() -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    pub fn new_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(ops);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Whether `height` points still fit above the bottom margin
    pub fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN
    }

    pub fn text(&mut self, x: f32, baseline: f32, font: Font, size: f32, color: Rgb, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource().to_vec()), Object::Real(size)],
        ));
        self.ops.push(Operation::new("rg", color.operands()));
        self.ops.push(Operation::new("Td", reals(&[x, baseline])));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode(text), StringFormat::Literal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops.push(Operation::new("rg", color.operands()));
        self.ops.push(Operation::new("re", reals(&[x, y, width, height])));
        self.ops.push(Operation::new("f", vec![]));
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Rgb) {
        self.ops.push(Operation::new("w", reals(&[line_width])));
        self.ops.push(Operation::new("RG", color.operands()));
        self.ops.push(Operation::new("re", reals(&[x, y, width, height])));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Open polyline through `points`
    pub fn polyline(&mut self, points: &[(f32, f32)], line_width: f32, color: Rgb) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.ops.push(Operation::new("w", reals(&[line_width])));
        self.ops.push(Operation::new("J", vec![Object::Integer(1)]));
        self.ops.push(Operation::new("j", vec![Object::Integer(1)]));
        self.ops.push(Operation::new("RG", color.operands()));
        self.ops.push(Operation::new("m", reals(&[x0, y0])));
        for &(x, y) in rest {
            self.ops.push(Operation::new("l", reals(&[x, y])));
        }
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Check mark inside the `size` square whose bottom-left corner is (x, y)
    pub fn check_mark(&mut self, x: f32, y: f32, size: f32) {
        self.polyline(
            &[
                (x + size * 0.10, y + size * 0.50),
                (x + size * 0.40, y + size * 0.15),
                (x + size * 0.90, y + size * 0.90),
            ],
            1.6,
            Rgb::GREEN,
        );
    }

    /// Cross inside the `size` square whose bottom-left corner is (x, y)
    pub fn cross_mark(&mut self, x: f32, y: f32, size: f32) {
        let (lo, hi) = (size * 0.15, size * 0.85);
        self.polyline(&[(x + lo, y + lo), (x + hi, y + hi)], 1.6, Rgb::RED);
        self.polyline(&[(x + lo, y + hi), (x + hi, y + lo)], 1.6, Rgb::RED);
    }

    /// Close the current page and return every page's operations
    pub fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_always_yields_a_page() {
        assert_eq!(Canvas::new().finish().len(), 1);
    }

    #[test]
    fn test_page_break_resets_cursor() {
        let mut canvas = Canvas::new();
        canvas.text(MARGIN, canvas.y, Font::Regular, 10.0, Rgb::BLACK, "bir");
        canvas.y = MARGIN + 5.0;
        assert!(!canvas.fits(10.0));
        canvas.new_page();
        assert!(canvas.fits(10.0));
        assert_eq!(canvas.page_count(), 2);
        canvas.text(MARGIN, canvas.y, Font::Bold, 10.0, Rgb::BLACK, "iki");
        let pages = canvas.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|ops| ops.iter().any(|op| op.operator == "Tj")));
    }

    #[test]
    fn test_marks_are_strokes() {
        let mut canvas = Canvas::new();
        canvas.check_mark(0.0, 0.0, 10.0);
        canvas.cross_mark(20.0, 0.0, 10.0);
        let pages = canvas.finish();
        let strokes = pages[0].iter().filter(|op| op.operator == "S").count();
        assert_eq!(strokes, 3);
        assert!(!pages[0].iter().any(|op| op.operator == "Tj"));
    }
}
