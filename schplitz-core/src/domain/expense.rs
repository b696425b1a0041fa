//! Expense domain model and structural validation of untrusted records

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::currency::Currency;
use super::result::{Error, Result};

/// One shared cost event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    pub paid_by: String,
    pub date: NaiveDate,
}

/// Wire shape of an expense inside encrypted payloads (v2 and later)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactExpense {
    pub i: String,
    pub d: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub a: Decimal,
    pub c: Currency,
    pub p: String,
    pub t: NaiveDate,
}

impl Expense {
    /// Create a new expense as entered locally.
    ///
    /// Assigns a fresh id and enforces the producer-side rules: a date in
    /// the future is rejected here and never re-checked on import.
    pub fn new(
        description: &str,
        amount: Decimal,
        currency: Currency,
        paid_by: &str,
        date: NaiveDate,
    ) -> Result<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::validation("Description is required"));
        }
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        if amount > MAX_AMOUNT {
            return Err(Error::validation("Amount is too large"));
        }
        let paid_by = paid_by.trim();
        if paid_by.is_empty() {
            return Err(Error::validation("Payer is required"));
        }
        if date > Local::now().date_naive() {
            return Err(Error::validation("Date cannot be in the future"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            amount,
            currency,
            paid_by: paid_by.to_string(),
            date,
        })
    }

    pub fn to_compact(&self) -> CompactExpense {
        CompactExpense {
            i: self.id.clone(),
            d: self.description.clone(),
            a: self.amount,
            c: self.currency,
            p: self.paid_by.clone(),
            t: self.date,
        }
    }
}

impl CompactExpense {
    /// Expand a raw compact record into the full field names so it can go
    /// through the same validator as legacy records.
    pub fn expand_value(raw: &JsonValue) -> JsonValue {
        let Some(obj) = raw.as_object() else {
            return raw.clone();
        };
        let field = |k: &str| obj.get(k).cloned().unwrap_or(JsonValue::Null);
        serde_json::json!({
            "id": field("i"),
            "description": field("d"),
            "amount": field("a"),
            "currency": field("c"),
            "paidBy": field("p"),
            "date": field("t"),
        })
    }
}

/// Largest amount a single expense may carry, in its own currency (10^15)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

fn date_pattern() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

fn non_blank_str<'a>(record: &'a serde_json::Map<String, JsonValue>, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_amount(value: Option<&JsonValue>) -> std::result::Result<Decimal, String> {
    let invalid = || "Invalid expense amount".to_string();
    let out_of_range = || "Expense amount out of range".to_string();

    let Some(JsonValue::Number(number)) = value else {
        return Err(invalid());
    };
    let amount = if let Some(i) = number.as_i64() {
        Decimal::from(i)
    } else if let Some(u) = number.as_u64() {
        Decimal::from(u)
    } else {
        let f = number.as_f64().filter(|f| !f.is_nan()).ok_or_else(invalid)?;
        if f < 0.0 {
            return Err(invalid());
        }
        Decimal::from_f64(f).ok_or_else(out_of_range)?
    };
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid());
    }
    if amount > MAX_AMOUNT {
        return Err(out_of_range());
    }
    Ok(amount)
}

/// Structurally validate an untrusted expense record.
///
/// Does not look at duplicate ids, date ordering or participant names.
pub fn validate(record: &JsonValue) -> std::result::Result<(), String> {
    parse_record(record).map(|_| ())
}

/// Validate an untrusted record and convert it into an [`Expense`]
pub fn parse_record(record: &JsonValue) -> std::result::Result<Expense, String> {
    let obj = record
        .as_object()
        .ok_or_else(|| "Expense must be an object".to_string())?;

    let id = obj
        .get("id")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Invalid or missing expense ID".to_string())?;

    let description = non_blank_str(obj, "description")
        .ok_or_else(|| "Invalid or missing expense description".to_string())?;

    let amount = parse_amount(obj.get("amount"))?;

    let currency = match obj.get("currency") {
        Some(JsonValue::String(code)) => {
            Currency::from_code(code).ok_or_else(|| format!("Unknown currency: {}", code))?
        }
        Some(other) => return Err(format!("Unknown currency: {}", other)),
        None => return Err("Unknown currency: undefined".to_string()),
    };

    let paid_by = non_blank_str(obj, "paidBy")
        .ok_or_else(|| "Invalid or missing paidBy field".to_string())?;

    let date_str = obj
        .get("date")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Invalid or missing date".to_string())?;
    if !date_pattern().is_match(date_str) {
        return Err("Invalid date format (expected YYYY-MM-DD)".to_string());
    }
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| format!("Invalid calendar date: {}", date_str))?;

    Ok(Expense {
        id: id.to_string(),
        description: description.to_string(),
        amount,
        currency,
        paid_by: paid_by.to_string(),
        date,
    })
}
