//! Result table layout: column geometry, header and rule rows

use shared_types::{CheckResult, ReportConfig, NO_COLUMNS, YES_COLUMNS};

use crate::canvas::{Canvas, Rgb, MARGIN};
use crate::fonts::{text_width, wrap, Font};

const HEADER_HEIGHT: f32 = 18.0;
const CELL_PAD: f32 = 4.0;
const ROW_FONT: f32 = 9.0;
const ROW_LEADING: f32 = 11.0;
const NOTE_FONT: f32 = 8.0;
const NOTE_LEADING: f32 = 10.0;
const NOTE_INDENT: f32 = 24.0;
const MARK_SIZE: f32 = 9.0;
const NUMBER_WIDTH: f32 = 30.0;
const MARK_WIDTH: f32 = 44.0;

/// Column geometry of the result table
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    pub names: Vec<String>,
    pub widths: Vec<f32>,
    pub number: Option<usize>,
    pub title: usize,
    pub yes: usize,
    pub no: usize,
}

impl Columns {
    /// Lay out the configured columns. Configurations with fewer than four
    /// columns fall back to the default header.
    pub fn from_config(config: &ReportConfig) -> Self {
        let fallback;
        let config = if config.table_columns.len() >= 4 {
            config
        } else {
            fallback = ReportConfig::default();
            &fallback
        };
        let names = config.table_columns.clone();
        let n = names.len();

        let yes = config.find_column(YES_COLUMNS).unwrap_or(n - 2);
        let no = config
            .find_column(NO_COLUMNS)
            .filter(|&i| i != yes)
            .unwrap_or(if yes == n - 1 { n - 2 } else { n - 1 });
        let number = (yes != 0 && no != 0).then_some(0);
        let flexible: Vec<usize> = (0..n)
            .filter(|&i| Some(i) != number && i != yes && i != no)
            .collect();
        let title = flexible.first().copied().unwrap_or(0);

        let fixed = number.map_or(0.0, |_| NUMBER_WIDTH) + 2.0 * MARK_WIDTH;
        let share = (Canvas::content_width() - fixed) / flexible.len().max(1) as f32;
        let widths = (0..n)
            .map(|i| {
                if Some(i) == number {
                    NUMBER_WIDTH
                } else if i == yes || i == no {
                    MARK_WIDTH
                } else {
                    share
                }
            })
            .collect();

        Self {
            names,
            widths,
            number,
            title,
            yes,
            no,
        }
    }

    fn left_of(&self, column: usize) -> f32 {
        MARGIN + self.widths[..column].iter().sum::<f32>()
    }

    fn title_lines(&self, title: &str) -> Vec<String> {
        wrap(title, Font::Regular, ROW_FONT, self.widths[self.title] - 2.0 * CELL_PAD)
    }
}

fn note_lines(explanation: &str) -> Vec<String> {
    wrap(
        explanation,
        Font::Regular,
        NOTE_FONT,
        Canvas::content_width() - NOTE_INDENT - 2.0 * CELL_PAD,
    )
}

fn row_height(lines: usize) -> f32 {
    (lines as f32 * ROW_LEADING + 2.0 * CELL_PAD).max(HEADER_HEIGHT)
}

fn note_height(lines: usize) -> f32 {
    lines as f32 * NOTE_LEADING + 2.0 * CELL_PAD
}

pub fn draw_header(canvas: &mut Canvas, columns: &Columns) {
    let top = canvas.y;
    let bottom = top - HEADER_HEIGHT;
    for (i, name) in columns.names.iter().enumerate() {
        let x = columns.left_of(i);
        let width = columns.widths[i];
        canvas.fill_rect(x, bottom, width, HEADER_HEIGHT, Rgb::HEADER);
        canvas.stroke_rect(x, bottom, width, HEADER_HEIGHT, 0.5, Rgb::GRAY);
        let text_x = if i == columns.title {
            x + CELL_PAD
        } else {
            x + (width - text_width(name, Font::Bold, ROW_FONT)) / 2.0
        };
        canvas.text(text_x, bottom + 6.0, Font::Bold, ROW_FONT, Rgb::BLACK, name);
    }
    canvas.y = bottom;
}

/// Height a rule needs, including its explanation row when it failed
pub fn rule_height(columns: &Columns, result: &CheckResult) -> f32 {
    let mut height = row_height(columns.title_lines(&result.title).len());
    if !result.passed && !result.explanation.trim().is_empty() {
        height += note_height(note_lines(result.explanation.trim()).len());
    }
    height
}

/// Draw one rule row, breaking the page and repeating the header first when
/// it does not fit
pub fn draw_rule(canvas: &mut Canvas, columns: &Columns, no: usize, result: &CheckResult) {
    if !canvas.fits(rule_height(columns, result)) {
        canvas.new_page();
        draw_header(canvas, columns);
    }

    let lines = columns.title_lines(&result.title);
    let height = row_height(lines.len());
    let top = canvas.y;
    let bottom = top - height;

    for (i, width) in columns.widths.iter().enumerate() {
        let x = columns.left_of(i);
        canvas.stroke_rect(x, bottom, *width, height, 0.5, Rgb::GRAY);
    }

    if let Some(number) = columns.number {
        let label = no.to_string();
        let x = columns.left_of(number) + (NUMBER_WIDTH - text_width(&label, Font::Regular, ROW_FONT)) / 2.0;
        canvas.text(x, top - CELL_PAD - ROW_FONT, Font::Regular, ROW_FONT, Rgb::BLACK, &label);
    }

    let title_x = columns.left_of(columns.title) + CELL_PAD;
    for (k, line) in lines.iter().enumerate() {
        let baseline = top - CELL_PAD - ROW_FONT - k as f32 * ROW_LEADING;
        canvas.text(title_x, baseline, Font::Regular, ROW_FONT, Rgb::BLACK, line);
    }

    let mark_y = bottom + (height - MARK_SIZE) / 2.0;
    if result.passed {
        let x = columns.left_of(columns.yes) + (columns.widths[columns.yes] - MARK_SIZE) / 2.0;
        canvas.check_mark(x, mark_y, MARK_SIZE);
    } else {
        let x = columns.left_of(columns.no) + (columns.widths[columns.no] - MARK_SIZE) / 2.0;
        canvas.cross_mark(x, mark_y, MARK_SIZE);
    }
    canvas.y = bottom;

    let explanation = result.explanation.trim();
    if result.passed || explanation.is_empty() {
        return;
    }
    let notes = note_lines(explanation);
    let height = note_height(notes.len());
    let bottom = canvas.y - height;
    canvas.stroke_rect(MARGIN, bottom, Canvas::content_width(), height, 0.5, Rgb::GRAY);
    for (k, line) in notes.iter().enumerate() {
        let baseline = canvas.y - CELL_PAD - NOTE_FONT - k as f32 * NOTE_LEADING;
        canvas.text(MARGIN + NOTE_INDENT, baseline, Font::Regular, NOTE_FONT, Rgb::RED, line);
    }
    canvas.y = bottom;
}

/// Space a section needs before its first row so the heading is not left
/// alone at the bottom of a page
pub fn section_lead(columns: &Columns, first: Option<&CheckResult>) -> f32 {
    HEADER_HEIGHT + first.map_or(0.0, |r| rule_height(columns, r))
}
