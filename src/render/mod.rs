//! Rendering backends
//!
//! A backend paginates a `Document` for a given page geometry. Assembly never
//! depends on which backend is used.

mod pdf;
mod text;

use thiserror::Error;

use crate::document::{Document, Span};
use crate::page::PageGeometry;

pub use pdf::PdfRenderer;
pub use text::TextRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Rendering backend failed: {0}")]
    Backend(String),

    #[error("Page geometry leaves no room for content")]
    NoPrintableArea,
}

pub trait RenderBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn media_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn render(&self, document: &Document, geometry: &PageGeometry) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Text,
}

impl OutputFormat {
    pub fn backend(self) -> Box<dyn RenderBackend> {
        match self {
            OutputFormat::Pdf => Box::new(PdfRenderer),
            OutputFormat::Text => Box::new(TextRenderer),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format '{other}', expected pdf or text")),
        }
    }
}

/// Rough Helvetica advance: half an em per character.
pub(crate) fn estimate_width_mm(text: &str, font_size_pt: f32) -> f32 {
    const MM_PER_PT: f32 = 0.352_778;
    text.chars().count() as f32 * font_size_pt * 0.5 * MM_PER_PT
}

pub(crate) fn span_tokens(spans: &[Span]) -> Vec<(&str, bool)> {
    spans
        .iter()
        .flat_map(|span| span.text.split_whitespace().map(move |word| (word, span.bold)))
        .collect()
}

/// Greedy word wrap over (word, bold) tokens. `measure` gives a token's width.
pub(crate) fn wrap_tokens<'a>(
    tokens: &[(&'a str, bool)],
    max_width: f32,
    measure: impl Fn(&str) -> f32,
) -> Vec<Vec<(&'a str, bool)>> {
    let space = measure(" ");
    let mut lines = vec![];
    let mut line: Vec<(&'a str, bool)> = vec![];
    let mut width = 0.0;

    for &(word, bold) in tokens {
        let word_width = measure(word);
        let needed = if line.is_empty() { word_width } else { width + space + word_width };
        if needed > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            width = word_width;
        } else {
            width = needed;
        }
        line.push((word, bold));
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}
