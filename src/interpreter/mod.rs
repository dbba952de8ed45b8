//! Command Interpreter - Ordered Rule Catalogue
//!
//! Rules are evaluated in order and the first rule whose trigger appears in
//! the command owns it; no further rules are tried. A command either applies
//! completely or leaves the record exactly as it was.
//!
//! Failures are never raised to the caller: every outcome, good or bad,
//! comes back as a human-readable message next to the record.

mod item_parser;
mod rules;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::FormRecord;

pub use item_parser::parse_item;
pub use rules::{
    default_rules, AddItemRule, ApplyDiscountRule, CommandRule, Mutation, RemoveItemRule,
    SetAmountRule, SetTextRule,
};

/// Why a command could not be applied. The display text is the message shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Sorry, I couldn't understand that command. Try something like 'change client name to Acme Corp' or 'add item: Widget, rate: 9.99, qty: 3'.")]
    NotUnderstood,

    #[error("Invalid {field} '{value}': expected a number like 12 or 9.99.")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid quantity '{value}': expected a whole number like 3.")]
    InvalidQuantity { value: String },

    #[error("Missing rate. Use the format 'add item: <description>, rate: <amount>, qty: <count>, hsn: <code>' (qty and hsn are optional).")]
    MissingRate,

    #[error("Missing item description. Use the format 'add item: <description>, rate: <amount>'.")]
    MissingDescription,

    #[error("Could not read '{fragment}': item details must look like 'key: value'.")]
    MalformedFragment { fragment: String },

    #[error("Unknown item detail '{key}': expected hsn, rate, price or qty.")]
    UnknownItemField { key: String },

    #[error("Item number {position} is out of range: the form has {len} item(s).")]
    ItemOutOfRange { position: usize, len: usize },

    #[error("Invalid item number '{value}': expected a whole number like 2.")]
    InvalidPosition { value: String },

    #[error("Invalid discount '{value}': expected a percentage like 10%.")]
    InvalidDiscount { value: String },

    #[error("Discount of {percent}% is out of range: it must be between 0% and 100%.")]
    DiscountOutOfRange { percent: Decimal },

    #[error("The result is too large to store.")]
    Overflow,
}

/// Optional responder consulted only when no rule matches. It can answer,
/// but never mutate the record.
pub trait FallbackResponder: Send + Sync {
    fn respond(&self, command: &str, form: &FormRecord) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied { rule: &'static str },
    Rejected { rule: &'static str },
    NotUnderstood,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub form: FormRecord,
    pub message: String,
    pub outcome: Outcome,
}

impl Interpretation {
    pub fn applied(&self) -> bool {
        matches!(self.outcome, Outcome::Applied { .. })
    }

    pub fn into_parts(self) -> (FormRecord, String) {
        (self.form, self.message)
    }
}

pub struct Interpreter {
    rules: Vec<Box<dyn CommandRule>>,
    fallback: Option<Box<dyn FallbackResponder>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn CommandRule>>) -> Self {
        Self { rules, fallback: None }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn FallbackResponder>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    #[tracing::instrument(skip(self, form), fields(items = form.items.len()))]
    pub fn interpret(&self, command: &str, form: FormRecord) -> Interpretation {
        let command = command.trim();

        for rule in &self.rules {
            let Some(parsed) = rule.parse(command) else {
                continue;
            };
            let name = rule.name();
            debug!(rule = name, "rule matched");

            let result = parsed.and_then(|mutation| {
                let mut draft = form.clone();
                mutation.apply(&mut draft).map(|message| (draft, message))
            });

            return match result {
                Ok((updated, message)) => {
                    info!(rule = name, "command applied");
                    Interpretation {
                        form: updated,
                        message,
                        outcome: Outcome::Applied { rule: name },
                    }
                }
                Err(error) => {
                    warn!(rule = name, %error, "command rejected");
                    Interpretation {
                        form,
                        message: error.to_string(),
                        outcome: Outcome::Rejected { rule: name },
                    }
                }
            };
        }

        debug!("no rule matched");
        let message = self
            .fallback
            .as_ref()
            .and_then(|fallback| fallback.respond(command, &form))
            .unwrap_or_else(|| CommandError::NotUnderstood.to_string());

        Interpretation {
            form,
            message,
            outcome: Outcome::NotUnderstood,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_INTERPRETER: Lazy<Interpreter> = Lazy::new(Interpreter::new);

/// Applies one command with the default catalogue.
pub fn interpret(command: &str, form: FormRecord) -> (FormRecord, String) {
    DEFAULT_INTERPRETER.interpret(command, form).into_parts()
}
