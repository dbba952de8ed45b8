//! Block emission and totals.

use docforge_core::{
    assemble, assemble_with_profile, document::TextStyle, Block, BusinessProfile, FormRecord,
    InvoiceTotals, LineItem, Mode,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

fn dec(literal: &str) -> Decimal {
    Decimal::from_str(literal).unwrap()
}

fn invoice() -> FormRecord {
    serde_json::from_value(json!({
        "client_name": "Test Client Inc.",
        "client_address": "123 Test Street, Test City",
        "client_gstin": "GSTIN123TEST",
        "invoice_number": "INV-2024-001",
        "invoice_date": "2024-07-26",
        "items": [
            {"description": "Product A", "hsn_code": "1234", "quantity": 2, "rate": 100.0},
            {"description": "Service B", "hsn_code": "5678", "quantity": 1, "rate": 250.0}
        ],
        "gst_percentage": 18.0,
        "transport_charge": 50.0,
        "advance_payment": 100.0
    }))
    .unwrap()
}

fn quotation() -> FormRecord {
    serde_json::from_value(json!({
        "client_name": "Test Client Corp.",
        "client_address": "456 Test Avenue, Test Town",
        "client_gstin": "GSTIN456QUOT",
        "items": [
            {"description": "Consulting Services", "quantity": 1, "rate": 500.0},
            {"description": "Software License", "quantity": 4, "rate": 1000.0}
        ],
        "minimum_quantity": "10 units",
        "delivery_time": "7 working days",
        "payment_terms": "50% upfront, 50% on delivery"
    }))
    .unwrap()
}

#[test]
fn test_invoice_totals_match_worked_example() {
    let totals = InvoiceTotals::compute(&invoice());
    assert_eq!(totals.total_amount, dec("450"));
    assert_eq!(totals.gst_amount, dec("81"));
    assert_eq!(totals.grand_total, dec("581"));
    assert_eq!(totals.balance, dec("481"));
}

#[test]
fn test_invoice_branch_emits_item_and_totals_tables() {
    let doc = assemble(&invoice());
    assert_eq!(doc.mode, Mode::Invoice);

    let tables = doc.tables();
    assert_eq!(tables.len(), 2);

    let items = tables[0];
    assert_eq!(
        items.header.as_deref(),
        Some(&["SNo", "Description", "HSN CODE", "QTY", "Rate", "Amount"].map(String::from)[..])
    );
    assert_eq!(items.rows[0], ["1", "Product A", "1234", "2", "100.00", "200.00"].map(String::from));
    assert_eq!(items.rows[1], ["2", "Service B", "5678", "1", "250.00", "250.00"].map(String::from));

    let totals = tables[1];
    assert_eq!(totals.row("Total").unwrap()[1], "450.00");
    // 18.0 in the record prints as entered.
    assert_eq!(totals.row("GST (18.0%)").unwrap()[1], "81.00");
    assert_eq!(totals.row("Transport Charge").unwrap()[1], "50.00");
    assert_eq!(totals.row("Advance").unwrap()[1], "100.00");
    assert_eq!(totals.row("Balance").unwrap()[1], "481.00");
    assert!(totals.bold_body);

    let lines = doc.text_lines();
    assert!(lines.contains(&"PERFORMA INVOICE NO: INV-2024-001".to_string()));
    assert!(lines.contains(&"Date: 2024-07-26".to_string()));
    assert!(!lines.iter().any(|l| l.contains("QUOTATION")));
}

#[test]
fn test_missing_date_falls_back_to_quotation() {
    let mut form = invoice();
    form.invoice_date = None;
    let doc = assemble(&form);
    assert_eq!(doc.mode, Mode::Quotation);
    assert!(doc.tables().is_empty());

    let mut form = invoice();
    form.invoice_number = Some(String::new());
    assert_eq!(assemble(&form).mode, Mode::Quotation);
}

#[test]
fn test_quotation_branch_lists_prices_and_terms() {
    let doc = assemble(&quotation());
    assert_eq!(doc.mode, Mode::Quotation);
    assert!(doc.tables().is_empty());

    let lines = doc.text_lines();
    let expected = [
        "QUOTATION",
        "The prices for the items are as follows:",
        "- Consulting Services at Rs 500.00 per piece",
        "- Software License at Rs 1000.00 per piece",
        "Minimum Quantity: 10 units",
        "Delivery time: 7 working days",
        "Payment: 50% upfront, 50% on delivery",
        "Transportation Charges extra",
        "If Sample is required from our end, that will be charged extra",
        "Packing Charges Extra",
    ];
    let start = lines.iter().position(|l| l == "QUOTATION").unwrap();
    assert_eq!(&lines[start..start + expected.len()], &expected.map(String::from)[..]);
}

#[test]
fn test_quotation_skips_empty_terms() {
    let mut form = quotation();
    form.minimum_quantity = None;
    form.delivery_time = Some(String::new());
    let lines = assemble(&form).text_lines();
    assert!(!lines.iter().any(|l| l.starts_with("Minimum Quantity:")));
    assert!(!lines.iter().any(|l| l.starts_with("Delivery time:")));
    assert!(lines.iter().any(|l| l.starts_with("Payment:")));
}

#[test]
fn test_whitespace_terms_still_print() {
    let mut form = quotation();
    form.delivery_time = Some("  ".to_string());
    let lines = assemble(&form).text_lines();
    assert!(lines.iter().any(|l| l.starts_with("Delivery time:")));

    let mut form = invoice();
    form.invoice_number = Some(" ".to_string());
    assert_eq!(assemble(&form).mode, Mode::Invoice);
}

#[test]
fn test_letterhead_and_closing_frame_the_document() {
    let doc = assemble(&quotation());
    match &doc.blocks[0] {
        Block::Text { style, spans } => {
            assert_eq!(*style, TextStyle::Title);
            assert_eq!(spans[0].text, "M.S. ENTERPRISES");
            assert!(spans[0].bold);
        }
        other => panic!("expected letterhead title, got {other:?}"),
    }

    let lines = doc.text_lines();
    assert!(lines.contains(&"To: Test Client Corp.".to_string()));
    assert!(lines.contains(&"GSTIN: GSTIN456QUOT".to_string()));
    assert!(lines.contains(&"Thanks and Regards".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("IFSC- PUNB0048320"));
}

#[test]
fn test_custom_profile_changes_static_blocks_only() {
    let profile = BusinessProfile {
        company_name: "ACME FABRICATION".to_string(),
        currency_label: "INR".to_string(),
        bank_details: vec![],
        ..Default::default()
    };
    let lines = assemble_with_profile(&quotation(), &profile).text_lines();
    assert_eq!(lines[0], "ACME FABRICATION");
    assert!(lines.contains(&"- Consulting Services at INR 500.00 per piece".to_string()));
    assert!(!lines.iter().any(|l| l == "Our Bank Details:"));
}

#[test]
fn test_missing_quantity_and_rate_count_as_zero() {
    let form = FormRecord {
        invoice_number: Some("INV-1".to_string()),
        invoice_date: Some("2024-01-01".to_string()),
        items: vec![
            LineItem {
                description: "No numbers".to_string(),
                ..Default::default()
            },
            LineItem {
                description: "Rate only".to_string(),
                rate: Some(dec("5")),
                quantity: None,
                hsn_code: None,
            },
        ],
        ..Default::default()
    };
    let doc = assemble(&form);
    let items = doc.tables()[0];
    assert_eq!(items.rows[0][3..], ["0", "0.00", "0.00"].map(String::from));
    assert_eq!(items.rows[1][3..], ["0", "5.00", "0.00"].map(String::from));
    assert_eq!(doc.tables()[1].row("Balance").unwrap()[1], "0.00");
    // The record itself is not touched.
    assert_eq!(form.items[0].quantity, None);
}

#[test]
fn test_gst_label_keeps_literal_percentage() {
    let mut form = invoice();
    form.gst_percentage = Some(dec("12.5"));
    let doc = assemble(&form);
    assert!(doc.tables()[1].row("GST (12.5%)").is_some());

    form.gst_percentage = Some(dec("18"));
    let doc = assemble(&form);
    assert!(doc.tables()[1].row("GST (18%)").is_some());

    form.gst_percentage = None;
    let doc = assemble(&form);
    assert_eq!(doc.tables()[1].row("GST (0%)").unwrap()[1], "0.00");
}
