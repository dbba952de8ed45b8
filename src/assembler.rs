//! Document Assembler
//!
//! Turns a form record into layout blocks: letterhead, client block, the
//! invoice table with totals or the quotation price list, then the closing
//! and bank details. Pure: no rendering, no I/O.
//!
//! Missing numbers count as zero for every calculation and display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use crate::classifier::{document_mode, Mode};
use crate::document::{Align, Block, Column, Document, Span, Table, TextStyle};
use crate::profile::BusinessProfile;
use crate::record::{AmountField, FormRecord, TextField};

pub const INVOICE_HEADER: [&str; 6] = ["SNo", "Description", "HSN CODE", "QTY", "Rate", "Amount"];
const INVOICE_COLUMN_WIDTHS: [f32; 6] = [0.5, 3.0, 1.0, 0.75, 1.0, 1.25];
const TOTALS_COLUMN_WIDTHS: [f32; 2] = [2.0, 1.5];

/// Two decimal places, half away from zero.
pub fn format_money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// The literal value as entered, without forced decimals: 18, 18.0, 12.5.
pub fn format_percent(value: Decimal) -> String {
    value.to_string()
}

/// Derived invoice figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub total_amount: Decimal,
    pub gst_percentage: Decimal,
    pub gst_amount: Decimal,
    pub transport_charge: Decimal,
    pub grand_total: Decimal,
    pub advance_payment: Decimal,
    pub balance: Decimal,
}

impl InvoiceTotals {
    pub fn compute(form: &FormRecord) -> Self {
        let total_amount = form
            .items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.amount()));
        let gst_percentage = form.amount(AmountField::GstPercentage);
        let gst_amount = total_amount.saturating_mul(gst_percentage) / Decimal::ONE_HUNDRED;
        let transport_charge = form.amount(AmountField::TransportCharge);
        let grand_total = total_amount
            .saturating_add(gst_amount)
            .saturating_add(transport_charge);
        let advance_payment = form.amount(AmountField::AdvancePayment);
        let balance = grand_total.saturating_sub(advance_payment);

        Self {
            total_amount,
            gst_percentage,
            gst_amount,
            transport_charge,
            grand_total,
            advance_payment,
            balance,
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![
            vec!["Total".to_string(), format_money(self.total_amount)],
            vec![
                format!("GST ({}%)", format_percent(self.gst_percentage)),
                format_money(self.gst_amount),
            ],
            vec!["Transport Charge".to_string(), format_money(self.transport_charge)],
            vec!["Advance".to_string(), format_money(self.advance_payment)],
            vec!["Balance".to_string(), format_money(self.balance)],
        ]
    }
}

/// Assembles with the default business profile.
pub fn assemble(form: &FormRecord) -> Document {
    assemble_with_profile(form, &BusinessProfile::default())
}

#[tracing::instrument(skip_all, fields(items = form.items.len()))]
pub fn assemble_with_profile(form: &FormRecord, profile: &BusinessProfile) -> Document {
    let mode = document_mode(form);
    debug!(%mode, "assembling document");

    let title = match mode {
        Mode::Invoice => format!("Invoice {}", form.text(TextField::InvoiceNumber).unwrap_or_default()),
        Mode::Quotation => "Quotation".to_string(),
    };
    let mut doc = Document::new(title, mode);

    push_letterhead(&mut doc, profile);
    push_client(&mut doc, form);
    match mode {
        Mode::Invoice => push_invoice(&mut doc, form),
        Mode::Quotation => push_quotation(&mut doc, form, profile),
    }
    push_closing(&mut doc, profile);

    doc
}

fn push_letterhead(doc: &mut Document, profile: &BusinessProfile) {
    doc.push(Block::text(TextStyle::Title, vec![Span::bold(&profile.company_name)]));
    doc.push(Block::text(TextStyle::Centered, vec![Span::plain(&profile.company_address)]));
    doc.push(Block::text(TextStyle::Centered, vec![Span::plain(&profile.contact_line)]));
    doc.push(Block::spacer(0.25));
}

fn push_client(doc: &mut Document, form: &FormRecord) {
    let field = |f: TextField| form.text(f).unwrap_or_default();

    doc.push(Block::labelled(TextStyle::Body, "To:", field(TextField::ClientName)));
    if let Some(address) = form.text(TextField::ClientAddress) {
        doc.push(Block::body(address));
    }
    doc.push(Block::labelled(TextStyle::Body, "GSTIN:", field(TextField::ClientGstin)));
    doc.push(Block::spacer(0.25));
}

fn push_invoice(doc: &mut Document, form: &FormRecord) {
    let field = |f: TextField| form.text(f).unwrap_or_default();

    doc.push(Block::labelled(
        TextStyle::Heading,
        "PERFORMA INVOICE NO:",
        field(TextField::InvoiceNumber),
    ));
    doc.push(Block::labelled(TextStyle::Heading, "Date:", field(TextField::InvoiceDate)));
    doc.push(Block::spacer(0.25));

    let rows = form
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            vec![
                (index + 1).to_string(),
                item.description.clone(),
                item.hsn_code.clone().unwrap_or_default(),
                item.quantity_or_zero().to_string(),
                format_money(item.rate_or_zero()),
                format_money(item.amount()),
            ]
        })
        .collect();

    doc.push(Block::Table(Table {
        columns: INVOICE_COLUMN_WIDTHS
            .iter()
            .map(|&width_inches| Column { width_inches, align: Align::Center })
            .collect(),
        header: Some(INVOICE_HEADER.iter().map(|h| h.to_string()).collect()),
        rows,
        placement: Align::Center,
        bold_body: false,
        grid: true,
    }));
    doc.push(Block::spacer(0.25));

    let totals = InvoiceTotals::compute(form);
    debug!(total = %totals.total_amount, balance = %totals.balance, "invoice totals");

    doc.push(Block::Table(Table {
        columns: TOTALS_COLUMN_WIDTHS
            .iter()
            .map(|&width_inches| Column { width_inches, align: Align::Right })
            .collect(),
        header: None,
        rows: totals.rows(),
        placement: Align::Right,
        bold_body: true,
        grid: true,
    }));
}

fn push_quotation(doc: &mut Document, form: &FormRecord, profile: &BusinessProfile) {
    doc.push(Block::text(TextStyle::Heading, vec![Span::bold("QUOTATION")]));
    doc.push(Block::spacer(0.25));
    doc.push(Block::body("The prices for the items are as follows:"));
    doc.push(Block::spacer(0.1));

    for item in &form.items {
        doc.push(Block::body(format!(
            "- {} at {} {} per piece",
            item.description,
            profile.currency_label,
            format_money(item.rate_or_zero()),
        )));
        doc.push(Block::spacer(0.1));
    }

    let terms = [
        (TextField::MinimumQuantity, "Minimum Quantity:"),
        (TextField::DeliveryTime, "Delivery time:"),
        (TextField::PaymentTerms, "Payment:"),
    ];
    for (field, label) in terms {
        if let Some(value) = form.present(field) {
            doc.push(Block::labelled(TextStyle::Body, label, value));
        }
    }
    for line in &profile.quotation_terms {
        doc.push(Block::body(line));
    }
    doc.push(Block::spacer(0.5));
}

fn push_closing(doc: &mut Document, profile: &BusinessProfile) {
    doc.push(Block::text(TextStyle::Body, vec![Span::bold(&profile.closing)]));
    doc.push(Block::body(&profile.signatory_name));
    if !profile.signatory_phone.is_empty() {
        doc.push(Block::body(&profile.signatory_phone));
    }
    doc.push(Block::spacer(0.25));

    if !profile.bank_details.is_empty() {
        doc.push(Block::text(TextStyle::Body, vec![Span::bold("Our Bank Details:")]));
        for line in &profile.bank_details {
            doc.push(Block::body(line));
        }
    }
}
