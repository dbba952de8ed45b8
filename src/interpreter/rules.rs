//! Rule catalogue
//!
//! Each rule recognises its trigger and turns the command into a `Mutation`.
//! Mutations check their preconditions before touching the record.

use regex::Regex;
use rust_decimal::Decimal;

use super::item_parser::parse_item;
use super::CommandError;
use crate::assembler::{format_money, format_percent};
use crate::record::{parse_amount, AmountField, FormRecord, LineItem, TextField};

/// A single trigger -> mutation mapping.
pub trait CommandRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the trigger is absent. Otherwise the rule owns the command
    /// and returns either the mutation or why it could not be read.
    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetText { field: TextField, value: String },
    SetAmount { field: AmountField, value: Decimal },
    AddItem(LineItem),
    /// 1-based position.
    RemoveItem { position: usize },
    ApplyDiscount { percent: Decimal },
}

impl Mutation {
    /// Applies the change and returns the confirmation. On error the record
    /// is untouched.
    pub fn apply(self, form: &mut FormRecord) -> Result<String, CommandError> {
        match self {
            Mutation::SetText { field, value } => {
                let message = if value.is_empty() {
                    format!("{} cleared.", field.label())
                } else {
                    format!("{} changed to {}.", field.label(), value)
                };
                *field.slot(form) = Some(value);
                Ok(message)
            }
            Mutation::SetAmount { field, value } => {
                let shown = match field {
                    AmountField::GstPercentage => format!("{}%", format_percent(value)),
                    _ => format_money(value),
                };
                *field.slot(form) = Some(value);
                Ok(format!("{} changed to {}.", field.label(), shown))
            }
            Mutation::AddItem(item) => {
                let message = format!(
                    "Added item '{}' (qty {}, rate {}).",
                    item.description,
                    item.quantity_or_zero(),
                    format_money(item.rate_or_zero()),
                );
                form.items.push(item);
                Ok(message)
            }
            Mutation::RemoveItem { position } => {
                let len = form.items.len();
                if position == 0 || position > len {
                    return Err(CommandError::ItemOutOfRange { position, len });
                }
                let removed = form.items.remove(position - 1);
                Ok(format!("Removed item {} ('{}').", position, removed.description))
            }
            Mutation::ApplyDiscount { percent } => {
                let factor = (Decimal::ONE_HUNDRED - percent)
                    .checked_div(Decimal::ONE_HUNDRED)
                    .ok_or(CommandError::Overflow)?;
                // Compute every new rate first so a failure leaves all rates as they were.
                let discounted = form
                    .items
                    .iter()
                    .map(|item| {
                        item.rate
                            .map(|rate| rate.checked_mul(factor).ok_or(CommandError::Overflow))
                            .transpose()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                for (item, rate) in form.items.iter_mut().zip(discounted) {
                    item.rate = rate;
                }
                Ok(format!(
                    "Applied a {}% discount to {} item(s).",
                    format_percent(percent),
                    form.items.len()
                ))
            }
        }
    }
}

/// Builds a case-insensitive pattern from a space separated phrase.
fn phrase_pattern(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn compile(pattern: &str) -> Regex {
    // Patterns are assembled from fixed phrases and escaped text.
    Regex::new(pattern).expect("rule pattern is a valid regex")
}

/// "change <field> to X" for free-text fields.
pub struct SetTextRule {
    field: TextField,
    pattern: Regex,
}

impl SetTextRule {
    pub fn new(field: TextField) -> Self {
        let pattern = format!(r"(?is)\bchange\s+{}\s+to\b(.*)$", phrase_pattern(field.phrase()));
        Self { field, pattern: compile(&pattern) }
    }
}

impl CommandRule for SetTextRule {
    fn name(&self) -> &'static str {
        match self.field {
            TextField::ClientName => "change_client_name",
            TextField::ClientAddress => "change_client_address",
            TextField::ClientGstin => "change_client_gstin",
            TextField::InvoiceNumber => "change_invoice_number",
            TextField::InvoiceDate => "change_invoice_date",
            TextField::MinimumQuantity => "change_minimum_quantity",
            TextField::DeliveryTime => "change_delivery_time",
            TextField::PaymentTerms => "change_payment_terms",
        }
    }

    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>> {
        let captures = self.pattern.captures(command)?;
        let value = captures.get(1).map_or("", |m| m.as_str().trim());
        Some(Ok(Mutation::SetText {
            field: self.field,
            value: value.to_string(),
        }))
    }
}

/// "change <field> to N" for numeric fields. A non-numeric N is not a match.
pub struct SetAmountRule {
    field: AmountField,
    pattern: Regex,
}

impl SetAmountRule {
    pub fn new(field: AmountField) -> Self {
        let pattern = format!(
            r"(?i)\bchange\s+{}\s+to\s*(\d+(?:\.\d+)?)\b",
            phrase_pattern(field.phrase())
        );
        Self { field, pattern: compile(&pattern) }
    }
}

impl CommandRule for SetAmountRule {
    fn name(&self) -> &'static str {
        match self.field {
            AmountField::GstPercentage => "change_gst_percentage",
            AmountField::TransportCharge => "change_transport_charge",
            AmountField::AdvancePayment => "change_advance_payment",
        }
    }

    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>> {
        let literal = self.pattern.captures(command)?.get(1)?.as_str();
        Some(
            parse_amount(literal)
                .map(|value| Mutation::SetAmount { field: self.field, value })
                .ok_or_else(|| CommandError::InvalidNumber {
                    field: self.field.phrase(),
                    value: literal.to_string(),
                }),
        )
    }
}

/// Any command mentioning both "add" and "item".
pub struct AddItemRule;

impl CommandRule for AddItemRule {
    fn name(&self) -> &'static str {
        "add_item"
    }

    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>> {
        let lower = command.to_lowercase();
        if !(lower.contains("add") && lower.contains("item")) {
            return None;
        }
        Some(parse_item(command).map(Mutation::AddItem))
    }
}

/// "remove item number N", 1-based.
pub struct RemoveItemRule {
    pattern: Regex,
}

impl RemoveItemRule {
    pub fn new() -> Self {
        Self {
            pattern: compile(r"(?i)\bremove\s+item\s+number\b\s*(\S*)"),
        }
    }
}

impl Default for RemoveItemRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRule for RemoveItemRule {
    fn name(&self) -> &'static str {
        "remove_item"
    }

    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>> {
        let raw = self.pattern.captures(command)?.get(1).map_or("", |m| m.as_str());
        Some(
            raw.parse::<usize>()
                .map(|position| Mutation::RemoveItem { position })
                .map_err(|_| CommandError::InvalidPosition { value: raw.to_string() }),
        )
    }
}

/// "apply discount P%" scales every rate by (1 - P/100). Words after the
/// percentage are ignored.
pub struct ApplyDiscountRule {
    trigger: Regex,
    percent: Regex,
}

impl ApplyDiscountRule {
    pub fn new() -> Self {
        Self {
            trigger: compile(r"(?i)\bapply\s+discount\b(?:\s+of\b)?(.*)$"),
            percent: compile(r"(?i)\bapply\s+discount\b(?:\s+of\b)?\s*(\d+(?:\.\d+)?)(?:\s*%|[^\w.]|\.?$)"),
        }
    }
}

impl Default for ApplyDiscountRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRule for ApplyDiscountRule {
    fn name(&self) -> &'static str {
        "apply_discount"
    }

    fn parse(&self, command: &str) -> Option<Result<Mutation, CommandError>> {
        let rest = self.trigger.captures(command)?.get(1).map_or("", |m| m.as_str().trim());
        let literal = self
            .percent
            .captures(command)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str());
        let parsed = match literal.and_then(parse_amount) {
            None => Err(CommandError::InvalidDiscount { value: rest.to_string() }),
            Some(percent) if percent > Decimal::ONE_HUNDRED => {
                Err(CommandError::DiscountOutOfRange { percent })
            }
            Some(percent) => Ok(Mutation::ApplyDiscount { percent }),
        };
        Some(parsed)
    }
}

/// The catalogue in evaluation order. First match wins.
pub fn default_rules() -> Vec<Box<dyn CommandRule>> {
    let mut rules: Vec<Box<dyn CommandRule>> = Vec::new();
    for field in [
        TextField::ClientName,
        TextField::ClientAddress,
        TextField::ClientGstin,
        TextField::InvoiceNumber,
        TextField::InvoiceDate,
    ] {
        rules.push(Box::new(SetTextRule::new(field)));
    }
    for field in AmountField::ALL {
        rules.push(Box::new(SetAmountRule::new(field)));
    }
    for field in [
        TextField::MinimumQuantity,
        TextField::DeliveryTime,
        TextField::PaymentTerms,
    ] {
        rules.push(Box::new(SetTextRule::new(field)));
    }
    rules.push(Box::new(AddItemRule));
    rules.push(Box::new(RemoveItemRule::new()));
    rules.push(Box::new(ApplyDiscountRule::new()));
    rules
}
