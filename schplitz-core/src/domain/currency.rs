//! Currency domain model and base-currency normalization

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Supported currencies. EUR is the base every rate is quoted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    All,
    Aed,
    Nok,
    Sek,
    Thb,
}

/// The currency all rates are relative to
pub const BASE_CURRENCY: Currency = Currency::Eur;

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Eur,
        Currency::Usd,
        Currency::All,
        Currency::Aed,
        Currency::Nok,
        Currency::Sek,
        Currency::Thb,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::All => "ALL",
            Currency::Aed => "AED",
            Currency::Nok => "NOK",
            Currency::Sek => "SEK",
            Currency::Thb => "THB",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::All => "L",
            Currency::Aed => "د.إ",
            Currency::Nok => "kr",
            Currency::Sek => "kr",
            Currency::Thb => "฿",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Eur => "Euro",
            Currency::Usd => "US Dollar",
            Currency::All => "Albanian Lek",
            Currency::Aed => "UAE Dirham",
            Currency::Nok => "Norwegian Krone",
            Currency::Sek => "Swedish Krona",
            Currency::Thb => "Thai Baht",
        }
    }

    /// Look up a currency by its exact three-letter code
    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Static approximate rate against EUR, used when live rates are missing
    pub fn fallback_rate(&self) -> Decimal {
        match self {
            Currency::Eur => Decimal::ONE,
            Currency::Usd => Decimal::new(104, 2),
            Currency::All => Decimal::new(1135, 1),
            Currency::Aed => Decimal::new(382, 2),
            Currency::Nok => Decimal::new(1180, 2),
            Currency::Sek => Decimal::new(1145, 2),
            Currency::Thb => Decimal::new(380, 1),
        }
    }

    /// Format an amount with the currency symbol, two decimals and
    /// thousands separators, e.g. `€1,234.50`
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((&text, "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!(
            "{}{}{}.{}",
            if negative { "-" } else { "" },
            self.symbol(),
            grouped,
            frac_part
        )
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(&s.trim().to_uppercase()).ok_or_else(|| format!("Unknown currency: {}", s))
    }
}

/// Where a rate table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Live => f.write_str("live"),
            RateSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// Exchange rates relative to EUR, with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: HashMap<Currency, Decimal>,
    pub source: RateSource,
}

impl RateTable {
    /// The static fallback table
    pub fn fallback() -> Self {
        let rates = Currency::ALL
            .iter()
            .map(|c| (*c, c.fallback_rate()))
            .collect();
        Self {
            rates,
            source: RateSource::Fallback,
        }
    }

    /// Build a live table from raw feed values keyed by currency code.
    ///
    /// Unsupported codes and non-finite or non-positive values are dropped.
    /// EUR is always pinned to 1.
    pub fn from_live(raw: &HashMap<String, f64>) -> Self {
        let mut rates: HashMap<Currency, Decimal> = raw
            .iter()
            .filter_map(|(code, value)| {
                let currency = Currency::from_code(code)?;
                if !value.is_finite() || *value <= 0.0 {
                    return None;
                }
                Some((currency, Decimal::from_f64(*value)?))
            })
            .collect();
        rates.insert(BASE_CURRENCY, Decimal::ONE);
        Self {
            rates,
            source: RateSource::Live,
        }
    }

    pub fn get(&self, currency: Currency) -> Option<Decimal> {
        self.rates.get(&currency).copied()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Convert an amount to EUR.
///
/// Never fails: a rate missing from the table falls back to the static rate,
/// and a zero rate is treated as 1.
pub fn to_base(amount: Decimal, currency: Currency, rates: &RateTable) -> Decimal {
    if currency == BASE_CURRENCY {
        return amount;
    }
    let rate = rates
        .get(currency)
        .unwrap_or_else(|| currency.fallback_rate());
    if rate.is_zero() {
        return amount;
    }
    amount.checked_div(rate).unwrap_or(amount)
}
