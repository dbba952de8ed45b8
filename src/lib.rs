//! Document Forge Core - form editing and invoice/quotation assembly
//!
//! # Ground Rules
//! 1. The caller owns the record; nothing is kept between calls
//! 2. One command, one rule: first match wins
//! 3. A command applies completely or not at all
//! 4. One classifier decides invoice vs. quotation
//! 5. Assembly emits neutral blocks; backends paginate

pub mod record;
pub mod classifier;
pub mod interpreter;
pub mod document;
pub mod assembler;
pub mod profile;
pub mod page;
pub mod render;
pub mod hashing;
pub mod pipeline;

pub use record::{FormRecord, LineItem, TextField, AmountField};
pub use classifier::{classify, document_mode, Mode};
pub use interpreter::{
    interpret, CommandError, CommandRule, FallbackResponder, Interpretation, Interpreter, Outcome,
};
pub use document::{Block, Document, Span, Table};
pub use assembler::{assemble, assemble_with_profile, InvoiceTotals};
pub use profile::{BusinessProfile, ProfileError};
pub use page::{PageGeometry, PageSize};
pub use render::{OutputFormat, PdfRenderer, RenderBackend, RenderError, TextRenderer};
pub use pipeline::{DocumentPipeline, GeneratedDocument, PipelineError, RenderedDocument};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
