//! Input checks shared by checkout and inventory management.
//!
//! Every check runs before any data is touched and fails with a
//! [`ServiceError::ValidationError`] carrying the operator message.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::*;
use std::str::FromStr;

use crate::errors::ServiceError;
use crate::messages;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_NOTES_LENGTH: usize = 500;
pub const MIN_CUSTOMER_NAME_LENGTH: usize = 2;
pub const MAX_QUANTITY_KG: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
pub const MAX_PRICE_PER_KG: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

/// Coffee and coffee type names.
static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{0600}-\x{06FF}a-zA-Z0-9\s\-']+$").expect("valid name regex"));

static SEARCH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{0600}-\x{06FF}a-zA-Z0-9\s\-]+$").expect("valid search regex"));

static CUSTOMER_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[[\p{L}&&[\p{Arabic}\p{Latin}]]\s]+$").expect("valid customer name regex")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,15}$").expect("valid phone regex"));

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::ValidationError(message.into())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Returns the trimmed name.
pub fn validate_coffee_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid(messages::COFFEE_NAME_REQUIRED));
    }
    if char_len(trimmed) > MAX_NAME_LENGTH {
        return Err(invalid(messages::coffee_name_too_long(MAX_NAME_LENGTH)));
    }
    if !NAME_REGEX.is_match(trimmed) {
        return Err(invalid(messages::COFFEE_NAME_CHARSET));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed name.
pub fn validate_type_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid(messages::TYPE_NAME_REQUIRED));
    }
    if char_len(trimmed) > MAX_NAME_LENGTH {
        return Err(invalid(messages::type_name_too_long(MAX_NAME_LENGTH)));
    }
    if !NAME_REGEX.is_match(trimmed) {
        return Err(invalid(messages::TYPE_NAME_CHARSET));
    }
    Ok(trimmed.to_string())
}

/// Blank descriptions are stored as `None`.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, ServiceError> {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) if char_len(d) > MAX_DESCRIPTION_LENGTH => {
            Err(invalid(messages::description_too_long(MAX_DESCRIPTION_LENGTH)))
        }
        Some(d) => Ok(Some(d.to_string())),
    }
}

/// Converts operator quantity text to kilograms.
///
/// Text with exactly two digits after the point is read as `kg.grams`
/// ("3.75" is 3 kg and 75 g, i.e. 3.075). Anything else is taken literally.
/// Unparseable text yields zero. The result has three decimals.
pub fn convert_quantity_input(input: &str) -> Decimal {
    let text = input.trim();
    let Ok(parsed) = Decimal::from_str(text) else {
        return Decimal::ZERO;
    };

    let parts: Vec<&str> = text.split('.').collect();
    let value = match parts.as_slice() {
        [whole, fraction] if fraction.len() == 2 => {
            let kilograms = if whole.is_empty() || *whole == "-" || *whole == "+" {
                Decimal::ZERO
            } else {
                match Decimal::from_str(whole) {
                    Ok(kg) => kg.trunc(),
                    Err(_) => return Decimal::ZERO,
                }
            };
            let Ok(grams) = fraction.parse::<u32>() else {
                return Decimal::ZERO;
            };
            kilograms + Decimal::from(grams) / Decimal::ONE_THOUSAND
        }
        _ => parsed,
    };

    normalize_kilograms(value)
}

/// Stock quantity for create/update: `0 < q <= 1000` after conversion.
pub fn validate_stock_quantity(input: &str) -> Result<Decimal, ServiceError> {
    if Decimal::from_str(input.trim()).is_err() {
        return Err(invalid(messages::QUANTITY_INVALID));
    }
    let quantity = convert_quantity_input(input);
    if quantity <= Decimal::ZERO {
        return Err(invalid(messages::QUANTITY_INVALID));
    }
    if quantity > MAX_QUANTITY_KG {
        return Err(invalid(messages::quantity_above_max(MAX_QUANTITY_KG)));
    }
    Ok(quantity)
}

/// Price per kilogram: `0 < p <= 10000`, two decimals.
pub fn validate_price(input: &str) -> Result<Decimal, ServiceError> {
    let price = Decimal::from_str(input.trim()).map_err(|_| invalid(messages::PRICE_INVALID))?;
    if price <= Decimal::ZERO {
        return Err(invalid(messages::PRICE_INVALID));
    }
    if price > MAX_PRICE_PER_KG {
        return Err(invalid(messages::price_above_max(MAX_PRICE_PER_KG)));
    }
    Ok(price.round_dp(2))
}

pub fn validate_search_text(query: &str) -> Result<String, ServiceError> {
    if query.is_empty() {
        return Err(invalid(messages::SEARCH_REQUIRED));
    }
    if char_len(query) > MAX_SEARCH_LENGTH || !SEARCH_REGEX.is_match(query) {
        return Err(invalid(messages::SEARCH_INVALID));
    }
    Ok(query.trim().to_string())
}

/// Customer name is checked as typed; only an all-whitespace name counts as missing.
pub fn validate_customer_name(name: &str) -> Result<String, ServiceError> {
    if name.trim().is_empty() {
        return Err(invalid(messages::CUSTOMER_NAME_REQUIRED));
    }
    if !CUSTOMER_NAME_REGEX.is_match(name) {
        return Err(invalid(messages::CUSTOMER_NAME_CHARSET));
    }
    let length = char_len(name);
    if !(MIN_CUSTOMER_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(invalid(messages::CUSTOMER_NAME_LENGTH));
    }
    Ok(name.to_string())
}

/// Blank phone numbers are stored as `None`.
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, ServiceError> {
    match phone.filter(|p| !p.trim().is_empty()) {
        None => Ok(None),
        Some(p) if PHONE_REGEX.is_match(p) => Ok(Some(p.to_string())),
        Some(_) => Err(invalid(messages::PHONE_FORMAT)),
    }
}

/// Blank notes are stored as `None`.
pub fn validate_notes(notes: Option<&str>) -> Result<Option<String>, ServiceError> {
    match notes.filter(|n| !n.trim().is_empty()) {
        None => Ok(None),
        Some(n) if char_len(n) > MAX_NOTES_LENGTH => Err(invalid(messages::NOTES_TOO_LONG)),
        Some(n) => Ok(Some(n.to_string())),
    }
}

/// Tendered amount as typed at the till.
pub fn parse_amount_paid(input: &str) -> Result<Decimal, ServiceError> {
    let amount =
        Decimal::from_str(input.trim()).map_err(|_| invalid(messages::AMOUNT_PAID_INVALID))?;
    if amount.is_sign_negative() {
        return Err(invalid(messages::AMOUNT_PAID_INVALID));
    }
    Ok(amount)
}

/// Stored kilograms with exactly three decimals.
pub fn normalize_kilograms(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(3);
    rounded.rescale(3);
    rounded
}

/// Stored money with exactly two decimals.
pub fn normalize_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// Accepts a JSON string or number for fields the till sends as typed text.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match <TextOrNumber as serde::Deserialize>::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}
