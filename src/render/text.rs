//! Plain-text backend
//!
//! Fixed pitch of 12 characters and 6 lines per inch. Pages are separated by
//! a form feed. Emphasis is dropped.

use super::{span_tokens, wrap_tokens, RenderBackend, RenderError};
use crate::document::{Align, Block, Document, Table, TextStyle};
use crate::page::{PageGeometry, MM_PER_INCH};

const CHARS_PER_INCH: f32 = 12.0;
const LINES_PER_INCH: f32 = 6.0;
const PAGE_BREAK: char = '\u{c}';
// Absorbs f32 noise so 6.5in yields 78 columns, not 77.
const ROUNDING_SLACK: f32 = 1e-3;

pub struct TextRenderer;

impl RenderBackend for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn media_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &Document, geometry: &PageGeometry) -> Result<Vec<u8>, RenderError> {
        let columns = (geometry.content_width_mm() / MM_PER_INCH * CHARS_PER_INCH + ROUNDING_SLACK).floor();
        let page_height_mm = geometry.size.dimensions_mm().1 - 2.0 * geometry.margin_mm();
        let lines_per_page = (page_height_mm / MM_PER_INCH * LINES_PER_INCH + ROUNDING_SLACK).floor();
        if columns < 1.0 || lines_per_page < 1.0 {
            return Err(RenderError::NoPrintableArea);
        }

        let lines: Vec<String> = document
            .blocks
            .iter()
            .flat_map(|block| block_lines(block, columns as usize))
            .collect();

        let pages: Vec<String> = lines
            .chunks(lines_per_page as usize)
            .map(|page| page.join("\n"))
            .collect();

        let separator = format!("\n{PAGE_BREAK}");
        let mut out = pages.join(separator.as_str());
        out.push('\n');
        Ok(out.into_bytes())
    }
}

fn block_lines(block: &Block, columns: usize) -> Vec<String> {
    match block {
        Block::Text { style, spans } => {
            let tokens = span_tokens(spans);
            let lines = wrap_tokens(&tokens, columns as f32, |w| w.chars().count() as f32);
            lines
                .into_iter()
                .map(|line| {
                    let text = line.iter().map(|(w, _)| *w).collect::<Vec<_>>().join(" ");
                    match style {
                        TextStyle::Title => align(&text.to_uppercase(), columns, Align::Center),
                        TextStyle::Centered => align(&text, columns, Align::Center),
                        TextStyle::Heading | TextStyle::Body => text,
                    }
                })
                .collect()
        }
        Block::Table(table) => table_lines(table, columns),
        Block::Spacer { inches } => {
            vec![String::new(); (inches * LINES_PER_INCH).round() as usize]
        }
    }
}

fn table_lines(table: &Table, columns: usize) -> Vec<String> {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|c| ((c.width_inches * CHARS_PER_INCH).round() as usize).max(3))
        .collect();
    let total = widths.iter().sum::<usize>() + widths.len() + 1;
    let indent = match table.placement {
        Align::Left => 0,
        Align::Center => columns.saturating_sub(total) / 2,
        Align::Right => columns.saturating_sub(total),
    };
    let pad = " ".repeat(indent);

    let rule = format!(
        "{pad}+{}+",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("+")
    );
    let render_row = |cells: &[String]| {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or_default();
                align(&clip(cell, w), w, table.columns[i].align)
            })
            .collect::<Vec<_>>();
        format!("{pad}|{}|", cells.join("|"))
    };

    let mut lines = vec![rule.clone()];
    if let Some(header) = &table.header {
        lines.push(render_row(header.as_slice()));
        lines.push(rule.clone());
    }
    for row in &table.rows {
        lines.push(render_row(row.as_slice()));
    }
    lines.push(rule);
    lines
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width).collect()
    }
}

fn align(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Center => format!("{text:^width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}
