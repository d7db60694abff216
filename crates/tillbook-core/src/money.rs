//! Money coercion, rounding and display formatting
//!
//! Every amount entering the books passes through [`parse_money_or_zero`] or
//! the [`lenient`] serde hook, so malformed input becomes zero in exactly one
//! place. Amounts are kept exact; rounding to two places happens only on
//! display and for outstanding amounts.
//!
//! Amounts are capped at [`MAX_AMOUNT`] in magnitude. Anything larger reads
//! as zero, which keeps every sum the core computes far inside `Decimal`'s
//! range.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use tillbook_config::{CurrencyConfig, SymbolPosition};
use tillbook_utils::group_thousands;

/// Largest accepted magnitude: one quadrillion
// 1_000_000_000_000_000 (0x0DE0_B6B3_A764_0000) built via the const constructor
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// Coerce free-form input to an amount. Empty, malformed or out-of-range
/// input is zero.
///
/// Accepts plain decimals (`"12.50"`, `" -3 "`, `"+4"`) and scientific
/// notation (`"1e3"`).
pub fn parse_money_or_zero(input: &str) -> Decimal {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let Ok(amount) = Decimal::from_str(unsigned).or_else(|_| Decimal::from_scientific(unsigned))
    else {
        return Decimal::ZERO;
    };
    if amount.abs() > MAX_AMOUNT {
        log::warn!("Amount {} is out of range, reading it as zero", trimmed);
        return Decimal::ZERO;
    }
    amount
}

/// Coerce a JSON value to an amount
pub fn money_from_json(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => parse_money_or_zero(&n.to_string()),
        serde_json::Value::String(s) => parse_money_or_zero(s),
        serde_json::Value::Bool(true) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

/// Serde hook for amount fields that may be numbers, strings, null or garbage
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(money_from_json).unwrap_or_default())
}

/// Serde hook for an optional amount; a present value is coerced like [`lenient`]
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(money_from_json))
}

/// Round half away from zero to two places
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Display formatter for amounts
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyFormat {
    pub decimal_places: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub symbol: String,
    pub symbol_position: SymbolPosition,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::from(&CurrencyConfig::default())
    }
}

impl From<&CurrencyConfig> for MoneyFormat {
    fn from(config: &CurrencyConfig) -> Self {
        Self {
            decimal_places: config.decimal_places,
            thousands_separator: config.thousands_separator.clone(),
            decimal_separator: config.decimal_separator.clone(),
            symbol: config.symbol.clone(),
            symbol_position: config.symbol_position,
        }
    }
}

impl MoneyFormat {
    /// Format an amount, e.g. `-1,234.50`
    pub fn format(&self, value: Decimal) -> String {
        let rounded =
            value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let fixed = format!("{:.*}", self.decimal_places as usize, rounded.abs());

        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut number = group_thousands(int_part, &self.thousands_separator);
        if let Some(frac) = frac_part {
            number.push_str(&self.decimal_separator);
            number.push_str(frac);
        }

        let number = if self.symbol.is_empty() {
            number
        } else {
            match self.symbol_position {
                SymbolPosition::Before => format!("{}{}", self.symbol, number),
                SymbolPosition::After => format!("{} {}", number, self.symbol),
            }
        };

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}", number)
        } else {
            number
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_money_or_zero() {
        assert_eq!(parse_money_or_zero("12.50"), dec!(12.50));
        assert_eq!(parse_money_or_zero("  -3 "), dec!(-3));
        assert_eq!(parse_money_or_zero("+4"), dec!(4));
        assert_eq!(parse_money_or_zero("1e3"), dec!(1000));
        assert_eq!(parse_money_or_zero(""), Decimal::ZERO);
        assert_eq!(parse_money_or_zero("abc"), Decimal::ZERO);
        assert_eq!(parse_money_or_zero("12,5"), Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_amounts_read_as_zero() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
        assert_eq!(parse_money_or_zero("1000000000000000"), MAX_AMOUNT);
        assert_eq!(parse_money_or_zero("-1000000000000000"), -MAX_AMOUNT);
        assert_eq!(parse_money_or_zero("1000000000000000.01"), Decimal::ZERO);
        assert_eq!(parse_money_or_zero("79228162514264337593543950335"), Decimal::ZERO);
        assert_eq!(parse_money_or_zero("-79228162514264337593543950335"), Decimal::ZERO);
        assert_eq!(parse_money_or_zero("1e20"), Decimal::ZERO);
        assert_eq!(
            money_from_json(&serde_json::json!("79228162514264337593543950335")),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_lenient_deserialize() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient")]
            amount: Decimal,
        }

        let cases = [
            (r#"{"amount": 12.5}"#, dec!(12.5)),
            (r#"{"amount": "7"}"#, dec!(7)),
            (r#"{"amount": null}"#, Decimal::ZERO),
            (r#"{"amount": "n/a"}"#, Decimal::ZERO),
            (r#"{"amount": [1]}"#, Decimal::ZERO),
            (r#"{}"#, Decimal::ZERO),
        ];
        for (json, expected) in cases {
            let row: Row = serde_json::from_str(json).unwrap();
            assert_eq!(row.amount, expected, "input {}", json);
        }
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_format_defaults() {
        let fmt = MoneyFormat::default();
        assert_eq!(fmt.format(dec!(1234.5)), "1,234.50");
        assert_eq!(fmt.format(dec!(-1234567.891)), "-1,234,567.89");
        assert_eq!(fmt.format(dec!(0)), "0.00");
        assert_eq!(fmt.format(dec!(-0.001)), "0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        let config = CurrencyConfig {
            decimal_places: 2,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            symbol: "€".to_string(),
            symbol_position: SymbolPosition::After,
        };
        let fmt = MoneyFormat::from(&config);
        assert_eq!(fmt.format(dec!(1234.5)), "1.234,50 €");
        assert_eq!(fmt.format(dec!(-5)), "-5,00 €");

        let before = MoneyFormat {
            symbol: "$".to_string(),
            ..MoneyFormat::default()
        };
        assert_eq!(before.format(dec!(-12)), "-$12.00");
    }
}
