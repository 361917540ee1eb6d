//! Token Amounts
//!
//! The canister counts everything in minor units: bitcoin in satoshis
//! (8 decimals), agent rune tokens with 3 decimals. User input is parsed with
//! `rust_decimal` so no amount ever passes through a float.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunicError};

/// Asset denomination with a fixed number of decimals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Denomination {
    /// Base asset, 8 decimals
    Bitcoin,
    /// Agent token, 3 decimals
    Rune,
}

impl Denomination {
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Bitcoin => 8,
            Self::Rune => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::Rune => "RUNE",
        }
    }

    /// Pick the denomination for a balance row by token name.
    pub fn for_token_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("bitcoin") {
            Self::Bitcoin
        } else {
            Self::Rune
        }
    }

    /// Convert a human-entered decimal amount into minor units.
    ///
    /// Rejects empty input, negatives, more fractional digits than the
    /// denomination carries, and values that overflow.
    pub fn parse_minor(self, input: &str) -> Result<u128> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RunicError::Validation("Enter an amount".into()));
        }

        let value = Decimal::from_str_exact(trimmed)
            .map_err(|_| RunicError::Validation(format!("'{trimmed}' is not a valid amount")))?
            .normalize();

        if value.is_sign_negative() && !value.is_zero() {
            return Err(RunicError::Validation("Amount must not be negative".into()));
        }
        if value.scale() > self.decimals() {
            return Err(RunicError::Validation(format!(
                "{} amounts support at most {} decimals",
                self.label(),
                self.decimals()
            )));
        }

        value
            .checked_mul(Decimal::from(10_u64.pow(self.decimals())))
            .and_then(|minor| minor.to_u128())
            .ok_or_else(|| RunicError::Validation(format!("'{trimmed}' is too large")))
    }

    /// Render minor units with exactly `decimals()` fractional digits.
    pub fn format_minor(self, minor: u128) -> String {
        format_digits(&minor.to_string(), self.decimals())
    }
}

/// Place a decimal point `decimals` digits from the right of a digit string.
pub(crate) fn format_digits(digits: &str, decimals: u32) -> String {
    let decimals = decimals as usize;
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_smallest_bitcoin_unit() {
        assert_eq!(Denomination::Bitcoin.parse_minor("0.00000001").unwrap(), 1);
        assert_eq!(Denomination::Bitcoin.format_minor(1_000), "0.00001000");
        assert_eq!(Denomination::Bitcoin.format_minor(0), "0.00000000");
        assert_eq!(Denomination::Bitcoin.format_minor(250_000_000), "2.50000000");
    }

    #[test]
    fn test_fraction_beyond_decimal_precision_is_rejected() {
        let tiny = "0.00000000000000000000000000000001";
        assert!(Denomination::Bitcoin.parse_minor(tiny).is_err());
        assert!(Denomination::Rune.parse_minor("1.0000000000000000000000000000001").is_err());
        assert_eq!(Denomination::Rune.parse_minor("1.000000").unwrap(), 1_000);
    }

    #[test]
    fn test_rune_precision() {
        assert_eq!(Denomination::Rune.parse_minor(" 1.5 ").unwrap(), 1_500);
        assert_eq!(Denomination::Rune.parse_minor("12").unwrap(), 12_000);
        assert_eq!(Denomination::Rune.format_minor(5_000), "5.000");
        assert_eq!(Denomination::Rune.format_minor(7), "0.007");

        let minor = Denomination::Rune.parse_minor("0.125").unwrap();
        assert_eq!(Denomination::Rune.format_minor(minor), "0.125");
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        assert_eq!(Denomination::Rune.parse_minor("2.500000").unwrap(), 2_500);
    }

    #[test]
    fn test_rejects_bad_input() {
        for input in ["", "   ", "abc", "-1", "1.2345", "1e3"] {
            let err = Denomination::Rune.parse_minor(input).unwrap_err();
            assert!(matches!(err, RunicError::Validation(_)), "{input} should be rejected");
        }
        assert!(Denomination::Bitcoin.parse_minor("0.000000001").is_err());
        assert!(Denomination::Bitcoin.parse_minor("79228162514264337593543950335").is_err());
    }

    #[test]
    fn test_minor_units_match_decimal_scaling() {
        for (amount, minor) in [(dec!(1.25), 1_250), (dec!(0.001), 1), (dec!(42), 42_000)] {
            assert_eq!(Denomination::Rune.parse_minor(&amount.to_string()).unwrap(), minor);
        }
    }

    #[test]
    fn test_denomination_by_token_name() {
        assert_eq!(Denomination::for_token_name("Bitcoin"), Denomination::Bitcoin);
        assert_eq!(Denomination::for_token_name("BITCOIN"), Denomination::Bitcoin);
        assert_eq!(Denomination::for_token_name("RUNE•AGENT"), Denomination::Rune);
    }
}
