//! Document IR - renderer-neutral layout blocks
//!
//! The assembler emits these; a `RenderBackend` turns them into pages.
//! Sizes are in inches so geometry stays with the backend.

use serde::{Deserialize, Serialize};

use crate::classifier::Mode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub mode: Mode,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: impl Into<String>, mode: Mode) -> Self {
        Self {
            title: title.into(),
            mode,
            blocks: vec![],
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Every text block flattened to plain strings, in order.
    pub fn text_lines(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { spans, .. } => Some(Span::plain_text(spans)),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text { style: TextStyle, spans: Vec<Span> },
    Table(Table),
    Spacer { inches: f32 },
}

impl Block {
    pub fn text(style: TextStyle, spans: Vec<Span>) -> Self {
        Block::Text { style, spans }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Block::Text {
            style: TextStyle::Body,
            spans: vec![Span::plain(text)],
        }
    }

    /// Bold label followed by a plain value, e.g. "**To:** Acme".
    pub fn labelled(style: TextStyle, label: &str, value: &str) -> Self {
        Block::Text {
            style,
            spans: vec![Span::bold(label), Span::plain(format!(" {value}"))],
        }
    }

    pub fn spacer(inches: f32) -> Self {
        Block::Spacer { inches }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    /// Large, bold, centred.
    Title,
    Centered,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }

    pub fn plain_text(spans: &[Span]) -> String {
        spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub width_inches: f32,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    /// Horizontal placement of the whole table on the page.
    pub placement: Align,
    #[serde(default)]
    pub bold_body: bool,
    #[serde(default)]
    pub grid: bool,
}

impl Table {
    pub fn width_inches(&self) -> f32 {
        self.columns.iter().map(|c| c.width_inches).sum()
    }

    /// Row by first-cell label, e.g. "Total".
    pub fn row(&self, label: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(label))
            .map(Vec::as_slice)
    }
}
