//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use docforge_core::{
    document::Document,
    hashing::{canonical_json, compute_form_hash},
    interpret, BusinessProfile, DocumentPipeline, FormRecord, LineItem, Mode, OutputFormat,
    PageGeometry, PdfRenderer, PipelineError, RenderBackend, RenderError,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashSet;

fn create_test_form() -> FormRecord {
    serde_json::from_value(json!({
        "client_name": "Test Client Inc.",
        "client_address": "123 Test Street",
        "client_gstin": "GSTIN123TEST",
        "invoice_number": "INV-2024-001",
        "invoice_date": "2024-07-26",
        "items": [
            {"description": "Product A", "hsn_code": "1234", "quantity": "2", "rate": "100"},
            {"description": "Service B", "quantity": 1, "rate": 250}
        ],
        "gst_percentage": "18",
        "transport_charge": 50,
        "advance_payment": ""
    }))
    .unwrap()
}

struct FailingBackend;

impl RenderBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn media_type(&self) -> &'static str {
        "application/octet-stream"
    }
    fn extension(&self) -> &'static str {
        "bin"
    }
    fn render(&self, _: &Document, _: &PageGeometry) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::NoPrintableArea)
    }
}

#[test]
fn invariant_lenient_numbers_deserialize() {
    let form = create_test_form();
    assert_eq!(form.items[0].quantity, Some(2));
    assert_eq!(form.items[0].rate, Some(Decimal::from(100)));
    assert_eq!(form.gst_percentage, Some(Decimal::from(18)));
    assert_eq!(form.advance_payment, None);
}

#[test]
fn invariant_negative_numbers_rejected() {
    let result: Result<FormRecord, _> =
        serde_json::from_value(json!({"items": [], "transport_charge": -5}));
    assert!(result.is_err());
}

#[test]
fn invariant_interpret_never_mutates_on_failure() {
    let form = create_test_form();
    let commands = [
        "gibberish",
        "add item: Widget",
        "add item: Widget, rate: abc",
        "add item: Widget, rate: 5, colour: red",
        "remove item number 0",
        "remove item number 3",
        "apply discount 150%",
    ];
    for command in commands {
        let (updated, message) = interpret(command, form.clone());
        assert_eq!(updated, form, "command {command:?} changed the record");
        assert!(!message.is_empty());
    }
}

#[test]
fn invariant_generated_filenames_unique() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = DocumentPipeline::new(BusinessProfile::default(), OutputFormat::Text.backend());
    let form = create_test_form();

    let mut paths = HashSet::new();
    for _ in 0..5 {
        let manifest = pipeline.generate_to_dir(&form, dir.path()).unwrap();
        let path = manifest.path.clone().unwrap();
        assert!(path.exists());
        assert!(manifest.filename.ends_with(".txt"));
        assert!(paths.insert(path));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 5);
}

#[test]
fn invariant_form_hash_stable() {
    let form = create_test_form();
    let pipeline = DocumentPipeline::new(BusinessProfile::default(), OutputFormat::Text.backend());

    let first = pipeline.generate(&form).unwrap();
    let second = pipeline.generate(&form).unwrap();

    assert_eq!(first.manifest.form_hash, second.manifest.form_hash);
    assert_eq!(first.manifest.form_hash, compute_form_hash(&form).unwrap());
    assert_eq!(first.manifest.document_hash, second.manifest.document_hash);
    assert_ne!(first.manifest.id, second.manifest.id);
}

#[test]
fn invariant_canonical_json_deterministic() {
    let obj1 = json!({"z": 1, "a": 2, "m": {"b": 1, "a": 2}});
    let obj2 = json!({"a": 2, "m": {"a": 2, "b": 1}, "z": 1});

    assert_eq!(canonical_json(&obj1).unwrap(), canonical_json(&obj2).unwrap());
}

#[test]
fn invariant_mode_needs_number_and_date() {
    let pipeline = DocumentPipeline::default();
    let mut form = create_test_form();
    assert_eq!(pipeline.mode(&form), Mode::Invoice);

    form.invoice_date = Some("   ".to_string());
    assert_eq!(pipeline.mode(&form), Mode::Invoice);

    form.invoice_date = Some(String::new());
    assert_eq!(pipeline.mode(&form), Mode::Quotation);

    let (form, _) = interpret("change invoice date to 2024-08-01", form);
    assert_eq!(pipeline.mode(&form), Mode::Invoice);
}

#[test]
fn invariant_pdf_output() {
    let pipeline = DocumentPipeline::new(BusinessProfile::default(), Box::new(PdfRenderer));
    let rendered = pipeline.generate(&create_test_form()).unwrap();

    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(rendered.manifest.media_type, "application/pdf");
    assert_eq!(rendered.manifest.mode, Mode::Invoice);
    assert_eq!(rendered.manifest.size_bytes, rendered.bytes.len());
}

#[test]
fn invariant_render_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let pipeline = DocumentPipeline::new(BusinessProfile::default(), Box::new(FailingBackend));

    let result = pipeline.generate_to_dir(&create_test_form(), &out);
    assert!(matches!(
        result,
        Err(PipelineError::Render(RenderError::NoPrintableArea))
    ));
    assert!(!out.exists());
}

#[test]
fn invariant_many_items_paginate() {
    let mut form = create_test_form();
    form.items = (1..=80)
        .map(|n| LineItem::new(format!("Item {n}"), Decimal::from(n)))
        .collect();

    let pipeline = DocumentPipeline::new(BusinessProfile::default(), OutputFormat::Text.backend());
    let rendered = pipeline.generate(&form).unwrap();
    let text = String::from_utf8(rendered.bytes).unwrap();

    assert!(text.contains('\u{c}'));
    assert!(text.contains("Item 80"));
    assert!(text.contains("Balance"));
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_assembly_routes_through_classifier() {
    use docforge_core::classifier::get_classify_call_count;

    let before = get_classify_call_count();
    docforge_core::assemble(&create_test_form());
    assert!(get_classify_call_count() > before);
}
