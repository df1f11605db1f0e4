//! Plain-text tables for terminal output.
//!
//! Column widths are measured in display columns, so CJK text stays aligned.

use std::io::{self, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells wider than this are cut and end in "...".
const MAX_COLUMN_WIDTH: usize = 60;
const COLUMN_GAP: &str = "  ";

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Missing cells render empty; extra cells are dropped.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.width())
                    .chain([header.width()])
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let widths = self.widths();

        write_line(out, &widths, |column| self.headers[column].as_str())?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_line(out, &widths, |column| rule[column].as_str())?;
        for row in &self.rows {
            write_line(out, &widths, |column| {
                row.get(column).map(String::as_str).unwrap_or("")
            })?;
        }

        Ok(())
    }
}

fn write_line<'a>(
    out: &mut dyn Write,
    widths: &[usize],
    cell: impl Fn(usize) -> &'a str,
) -> io::Result<()> {
    let line = widths
        .iter()
        .enumerate()
        .map(|(column, width)| pad_or_truncate(cell(column), *width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    writeln!(out, "{}", line.trim_end())
}

/// Truncates a string to fit within the specified display width.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width {
            break;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

/// Pads or truncates a string to exactly the specified display width.
///
/// Line breaks are flattened to spaces first so a cell never spans rows.
pub fn pad_or_truncate(s: &str, width: usize) -> String {
    let s = s.replace(['\r', '\n'], " ");
    let display_width = s.width();

    if display_width <= width {
        format!("{}{}", s, " ".repeat(width - display_width))
    } else if width < 3 {
        truncate_to_width(&s, width)
    } else {
        let truncated = truncate_to_width(&s, width - 3);
        // CJK characters can leave the truncated text one column short
        let padding = width.saturating_sub(truncated.width()).saturating_sub(3);
        format!("{}...{}", truncated, " ".repeat(padding))
    }
}
