//! PDF backend (printpdf, builtin Helvetica)
//!
//! Single-column flow from the top margin down; a block that does not fit
//! starts a new page. Table rows never split across pages.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use std::io::BufWriter;

use super::{estimate_width_mm, span_tokens, wrap_tokens, RenderBackend, RenderError};
use crate::document::{Align, Block, Document, Span, Table, TextStyle};
use crate::page::{PageGeometry, MM_PER_INCH};

const LAYER_NAME: &str = "Layer 1";
const LINE_SPACING: f32 = 1.2;
const MM_PER_PT: f32 = 0.352_778;
const CELL_PADDING_MM: f32 = 1.5;
const ROW_HEIGHT_MM: f32 = 7.0;
const HEADER_ROW_HEIGHT_MM: f32 = 9.0;
const TABLE_FONT_PT: f32 = 10.0;

pub struct PdfRenderer;

impl RenderBackend for PdfRenderer {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn media_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &Document, geometry: &PageGeometry) -> Result<Vec<u8>, RenderError> {
        if geometry.content_width_mm() <= 0.0 {
            return Err(RenderError::NoPrintableArea);
        }

        let (width, height) = geometry.size.dimensions_mm();
        let (doc, page, layer) = PdfDocument::new(&document.title, Mm(width), Mm(height), LAYER_NAME);

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        {
            let mut cursor = Cursor {
                doc: &doc,
                layer: doc.get_page(page).get_layer(layer),
                y: height - geometry.margin_mm(),
                geometry,
                regular,
                bold,
            };
            for block in &document.blocks {
                cursor.block(block);
            }
        }

        let mut writer = BufWriter::new(Vec::<u8>::new());
        doc.save(&mut writer)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| RenderError::Backend(e.to_string()))
    }
}

struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    /// Distance of the next line top from the page bottom.
    y: f32,
    geometry: &'a PageGeometry,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Cursor<'_> {
    fn left(&self) -> f32 {
        self.geometry.margin_mm()
    }

    fn content_width(&self) -> f32 {
        self.geometry.content_width_mm()
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y - height >= self.geometry.margin_mm() {
            return;
        }
        let (width, page_height) = self.geometry.size.dimensions_mm();
        let (page, layer) = self.doc.add_page(Mm(width), Mm(page_height), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = page_height - self.geometry.margin_mm();
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Text { style, spans } => self.text(*style, spans),
            Block::Table(table) => self.table(table),
            Block::Spacer { inches } => {
                // Spacers never force a page break; they collapse at the bottom.
                self.y = (self.y - inches * MM_PER_INCH).max(self.geometry.margin_mm());
            }
        }
    }

    fn text(&mut self, style: TextStyle, spans: &[Span]) {
        let (size, align, force_bold) = match style {
            TextStyle::Title => (24.0, Align::Center, true),
            TextStyle::Centered => (10.0, Align::Center, false),
            TextStyle::Heading => (12.0, Align::Left, false),
            TextStyle::Body => (10.0, Align::Left, false),
        };
        let leading = size * MM_PER_PT * LINE_SPACING;
        let tokens = span_tokens(spans);
        let lines = wrap_tokens(&tokens, self.content_width(), |w| estimate_width_mm(w, size));
        let space = estimate_width_mm(" ", size);

        for line in lines {
            self.reserve(leading);
            let line_width: f32 = line.iter().map(|(w, _)| estimate_width_mm(w, size)).sum::<f32>()
                + space * line.len().saturating_sub(1) as f32;
            let mut x = match align {
                Align::Left => self.left(),
                Align::Center => self.left() + (self.content_width() - line_width).max(0.0) / 2.0,
                Align::Right => self.left() + (self.content_width() - line_width).max(0.0),
            };
            let baseline = self.y - size * MM_PER_PT;
            for (word, bold) in line {
                let font = self.font(bold || force_bold).clone();
                self.layer.use_text(word, size, Mm(x), Mm(baseline), &font);
                x += estimate_width_mm(word, size) + space;
            }
            self.y -= leading;
        }
    }

    fn table(&mut self, table: &Table) {
        let widths: Vec<f32> = table
            .columns
            .iter()
            .map(|c| c.width_inches * MM_PER_INCH)
            .collect();
        let total = table.width_inches() * MM_PER_INCH;
        let x0 = match table.placement {
            Align::Left => self.left(),
            Align::Center => self.left() + (self.content_width() - total).max(0.0) / 2.0,
            Align::Right => self.left() + (self.content_width() - total).max(0.0),
        };

        if let Some(header) = &table.header {
            self.row(table, &widths, x0, header, true, HEADER_ROW_HEIGHT_MM);
        }
        for row in &table.rows {
            self.row(table, &widths, x0, row, table.bold_body, ROW_HEIGHT_MM);
        }
    }

    fn row(&mut self, table: &Table, widths: &[f32], x0: f32, cells: &[String], bold: bool, height: f32) {
        self.reserve(height);
        let top = self.y;
        let bottom = top - height;
        let baseline = bottom + (height - TABLE_FONT_PT * MM_PER_PT) / 2.0;
        let font = self.font(bold).clone();

        let mut x = x0;
        for (index, width) in widths.iter().enumerate() {
            let cell = cells.get(index).map(String::as_str).unwrap_or_default();
            let text = fit(cell, width - 2.0 * CELL_PADDING_MM);
            let text_width = estimate_width_mm(&text, TABLE_FONT_PT);
            let align = table.columns[index].align;
            let tx = match align {
                Align::Left => x + CELL_PADDING_MM,
                Align::Center => x + (width - text_width) / 2.0,
                Align::Right => x + width - CELL_PADDING_MM - text_width,
            };
            self.layer.use_text(text, TABLE_FONT_PT, Mm(tx), Mm(baseline), &font);
            x += width;
        }

        if table.grid {
            let right = x0 + widths.iter().sum::<f32>();
            self.line((x0, top), (right, top));
            self.line((x0, bottom), (right, bottom));
            let mut edge = x0;
            self.line((edge, top), (edge, bottom));
            for width in widths {
                edge += width;
                self.line((edge, top), (edge, bottom));
            }
        }
        self.y = bottom;
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }
}

/// Truncates `text` with an ellipsis so it fits `max_width` millimetres.
fn fit(text: &str, max_width: f32) -> String {
    if estimate_width_mm(text, TABLE_FONT_PT) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_width_mm(&out, TABLE_FONT_PT) + estimate_width_mm("...", TABLE_FONT_PT) > max_width {
            out.pop();
            break;
        }
    }
    out.push_str("...");
    out
}
