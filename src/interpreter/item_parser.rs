//! "add item" fragment grammar
//!
//! `add item[:] <description>, key: value, key: value ...`
//! Keys: `hsn`, `rate`, `price` (alias of `rate`), `qty`. A rate is mandatory.

use super::CommandError;
use crate::record::{parse_amount, LineItem};

const ITEM_KEYWORD: &str = "item";

/// Builds a line item from an "add item" command. Quantity defaults to 1.
pub fn parse_item(command: &str) -> Result<LineItem, CommandError> {
    // ASCII lowercasing keeps byte offsets aligned with `command`.
    let start = command
        .to_ascii_lowercase()
        .find(ITEM_KEYWORD)
        .ok_or(CommandError::MissingDescription)?
        + ITEM_KEYWORD.len();

    let details = command[start..].trim_start();
    let details = details.strip_prefix(':').unwrap_or(details);

    let mut fragments = details.split(',').map(str::trim);
    let description = fragments.next().unwrap_or_default();
    if description.is_empty() {
        return Err(CommandError::MissingDescription);
    }

    let mut item = LineItem {
        description: description.to_string(),
        hsn_code: None,
        rate: None,
        quantity: Some(1),
    };

    for fragment in fragments.filter(|f| !f.is_empty()) {
        let (key, value) = fragment
            .split_once(':')
            .ok_or_else(|| CommandError::MalformedFragment {
                fragment: fragment.to_string(),
            })?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "hsn" => {
                item.hsn_code = Some(value.to_string()).filter(|code| !code.is_empty());
            }
            "rate" | "price" => {
                let rate = parse_amount(value).ok_or_else(|| CommandError::InvalidNumber {
                    field: "rate",
                    value: value.to_string(),
                })?;
                item.rate = Some(rate);
            }
            "qty" => {
                let quantity = value.parse::<u32>().map_err(|_| CommandError::InvalidQuantity {
                    value: value.to_string(),
                })?;
                item.quantity = Some(quantity);
            }
            _ => return Err(CommandError::UnknownItemField { key }),
        }
    }

    if item.rate.is_none() {
        return Err(CommandError::MissingRate);
    }

    Ok(item)
}
