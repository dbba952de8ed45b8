//! Form Record Model
//!
//! The semi-structured invoice/quotation draft. Callers own it; every
//! operation takes it by value or by reference and hands back a new value.
//! Field names on the wire are exactly the struct field names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_gstin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(default, with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub gst_percentage: Option<Decimal>,
    #[serde(default, with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub transport_charge: Option<Decimal>,
    #[serde(default, with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub advance_payment: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

impl FormRecord {
    /// Value of a text field, or `None` when it is absent or blank.
    pub fn text(&self, field: TextField) -> Option<&str> {
        field
            .get(self)
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Raw value of a text field when it is non-empty. Whitespace counts as
    /// content, so this is the presence test used for routing.
    pub fn present(&self, field: TextField) -> Option<&str> {
        field.get(self).as_deref().filter(|value| !value.is_empty())
    }

    /// Value of an amount field; absent amounts count as zero.
    pub fn amount(&self, field: AmountField) -> Decimal {
        field.get(self).unwrap_or(Decimal::ZERO)
    }
}

/// One billable row. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,
    #[serde(default, with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(default, with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, rate: Decimal) -> Self {
        Self {
            description: description.into(),
            hsn_code: None,
            rate: Some(rate),
            quantity: Some(1),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_hsn_code(mut self, hsn_code: impl Into<String>) -> Self {
        self.hsn_code = Some(hsn_code.into());
        self
    }

    pub fn rate_or_zero(&self) -> Decimal {
        self.rate.unwrap_or(Decimal::ZERO)
    }

    pub fn quantity_or_zero(&self) -> u32 {
        self.quantity.unwrap_or(0)
    }

    /// `quantity * rate`, missing parts counted as zero. Saturates instead of
    /// overflowing.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity_or_zero()).saturating_mul(self.rate_or_zero())
    }
}

/// Free-text fields addressable by "change <phrase> to X" commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    ClientName,
    ClientAddress,
    ClientGstin,
    InvoiceNumber,
    InvoiceDate,
    MinimumQuantity,
    DeliveryTime,
    PaymentTerms,
}

impl TextField {
    pub const ALL: [TextField; 8] = [
        TextField::ClientName,
        TextField::ClientAddress,
        TextField::ClientGstin,
        TextField::InvoiceNumber,
        TextField::InvoiceDate,
        TextField::MinimumQuantity,
        TextField::DeliveryTime,
        TextField::PaymentTerms,
    ];

    /// Words used for this field in commands.
    pub fn phrase(self) -> &'static str {
        match self {
            TextField::ClientName => "client name",
            TextField::ClientAddress => "client address",
            TextField::ClientGstin => "client gstin",
            TextField::InvoiceNumber => "invoice number",
            TextField::InvoiceDate => "invoice date",
            TextField::MinimumQuantity => "minimum quantity",
            TextField::DeliveryTime => "delivery time",
            TextField::PaymentTerms => "payment terms",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextField::ClientName => "Client name",
            TextField::ClientAddress => "Client address",
            TextField::ClientGstin => "Client GSTIN",
            TextField::InvoiceNumber => "Invoice number",
            TextField::InvoiceDate => "Invoice date",
            TextField::MinimumQuantity => "Minimum quantity",
            TextField::DeliveryTime => "Delivery time",
            TextField::PaymentTerms => "Payment terms",
        }
    }

    pub fn get(self, form: &FormRecord) -> &Option<String> {
        match self {
            TextField::ClientName => &form.client_name,
            TextField::ClientAddress => &form.client_address,
            TextField::ClientGstin => &form.client_gstin,
            TextField::InvoiceNumber => &form.invoice_number,
            TextField::InvoiceDate => &form.invoice_date,
            TextField::MinimumQuantity => &form.minimum_quantity,
            TextField::DeliveryTime => &form.delivery_time,
            TextField::PaymentTerms => &form.payment_terms,
        }
    }

    pub fn slot(self, form: &mut FormRecord) -> &mut Option<String> {
        match self {
            TextField::ClientName => &mut form.client_name,
            TextField::ClientAddress => &mut form.client_address,
            TextField::ClientGstin => &mut form.client_gstin,
            TextField::InvoiceNumber => &mut form.invoice_number,
            TextField::InvoiceDate => &mut form.invoice_date,
            TextField::MinimumQuantity => &mut form.minimum_quantity,
            TextField::DeliveryTime => &mut form.delivery_time,
            TextField::PaymentTerms => &mut form.payment_terms,
        }
    }
}

/// Non-negative decimal fields of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    GstPercentage,
    TransportCharge,
    AdvancePayment,
}

impl AmountField {
    pub const ALL: [AmountField; 3] = [
        AmountField::GstPercentage,
        AmountField::TransportCharge,
        AmountField::AdvancePayment,
    ];

    pub fn phrase(self) -> &'static str {
        match self {
            AmountField::GstPercentage => "gst percentage",
            AmountField::TransportCharge => "transport charge",
            AmountField::AdvancePayment => "advance payment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AmountField::GstPercentage => "GST percentage",
            AmountField::TransportCharge => "Transport charge",
            AmountField::AdvancePayment => "Advance payment",
        }
    }

    pub fn get(self, form: &FormRecord) -> Option<Decimal> {
        match self {
            AmountField::GstPercentage => form.gst_percentage,
            AmountField::TransportCharge => form.transport_charge,
            AmountField::AdvancePayment => form.advance_payment,
        }
    }

    pub fn slot(self, form: &mut FormRecord) -> &mut Option<Decimal> {
        match self {
            AmountField::GstPercentage => &mut form.gst_percentage,
            AmountField::TransportCharge => &mut form.transport_charge,
            AmountField::AdvancePayment => &mut form.advance_payment,
        }
    }
}

/// Parses an unsigned integer-or-decimal literal such as `12` or `9.99`.
///
/// Signs, exponents and stray characters are rejected.
pub fn parse_amount(literal: &str) -> Option<Decimal> {
    let literal = literal.trim();
    let (whole, fraction) = match literal.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (literal, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !fraction.map_or(true, digits) {
        return None;
    }
    Decimal::from_str(literal).ok()
}

/// Serde adapters accepting the loose shapes browsers send: numbers,
/// numeric strings, empty strings and nulls.
mod lenient {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    fn non_negative(value: Decimal) -> Result<Decimal, String> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(format!("expected a non-negative number, found {value}"))
        } else {
            Ok(value)
        }
    }

    fn parse_decimal(raw: &str) -> Result<Decimal, String> {
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| format!("'{raw}' is not a number"))
            .and_then(non_negative)
    }

    pub mod decimal {
        use super::*;

        /// Exact decimal text as a JSON number; never goes through f64.
        pub fn serialize<S: Serializer>(value: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
            rust_decimal::serde::arbitrary_precision_option::serialize(value, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
            match Option::<Value>::deserialize(d)? {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(n)) => parse_decimal(&n.to_string()).map(Some).map_err(D::Error::custom),
                Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
                Some(Value::String(s)) => parse_decimal(s.trim()).map(Some).map_err(D::Error::custom),
                Some(other) => Err(D::Error::custom(format!("expected a number, found {other}"))),
            }
        }
    }

    pub mod count {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(count) => s.serialize_u32(*count),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
            let raw = match Option::<Value>::deserialize(d)? {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
                Some(Value::String(s)) => s.trim().to_string(),
                Some(other) => {
                    return Err(D::Error::custom(format!("expected a quantity, found {other}")))
                }
            };
            // Whole-valued decimals such as 2.0 are accepted.
            let value = parse_decimal(&raw).map_err(D::Error::custom)?;
            if !value.fract().is_zero() {
                return Err(D::Error::custom(format!("quantity {raw} is not a whole number")));
            }
            value
                .to_u32()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("quantity {raw} is too large")))
        }
    }
}
