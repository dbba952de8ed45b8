//! Classifier - Invoice vs. Quotation routing policy
//!
//! One predicate decides the mode. The assembler and the pipeline route
//! through here; nothing else inspects `invoice_number` for routing.

use serde::{Deserialize, Serialize};

use crate::record::{FormRecord, TextField};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static CLASSIFY_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_classify_call_count() -> u32 {
    CLASSIFY_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_classify_call_count() {
    CLASSIFY_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Invoice,
    Quotation,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Invoice => "invoice",
            Mode::Quotation => "quotation",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice iff `invoice_number` is present and non-empty.
pub fn classify(form: &FormRecord) -> Mode {
    #[cfg(feature = "test-hooks")]
    CLASSIFY_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    if form.present(TextField::InvoiceNumber).is_some() {
        Mode::Invoice
    } else {
        Mode::Quotation
    }
}

/// Mode used for document layout: a full invoice additionally needs a date.
pub fn document_mode(form: &FormRecord) -> Mode {
    match classify(form) {
        Mode::Invoice if form.present(TextField::InvoiceDate).is_some() => Mode::Invoice,
        _ => Mode::Quotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(number: Option<&str>, date: Option<&str>) -> FormRecord {
        FormRecord {
            invoice_number: number.map(str::to_string),
            invoice_date: date.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_invoice_number_selects_invoice() {
        assert_eq!(classify(&form(Some("INV-2024-001"), None)), Mode::Invoice);
        assert_eq!(classify(&form(None, Some("2024-07-26"))), Mode::Quotation);
        assert_eq!(classify(&form(Some(""), None)), Mode::Quotation);
        assert_eq!(classify(&form(Some("   "), None)), Mode::Invoice);
    }

    #[test]
    fn test_document_mode_needs_both_fields() {
        assert_eq!(document_mode(&form(Some("INV-1"), Some("2024-07-26"))), Mode::Invoice);
        assert_eq!(document_mode(&form(Some("INV-1"), None)), Mode::Quotation);
        assert_eq!(document_mode(&form(Some("INV-1"), Some(""))), Mode::Quotation);
        assert_eq!(document_mode(&form(Some("INV-1"), Some("  "))), Mode::Invoice);
        assert_eq!(document_mode(&form(None, Some("2024-07-26"))), Mode::Quotation);
    }

    #[test]
    fn test_classify_is_pure() {
        let record = form(Some("INV-9"), Some("2024-01-01"));
        assert_eq!(classify(&record), classify(&record));
        assert_eq!(record, form(Some("INV-9"), Some("2024-01-01")));
    }
}
