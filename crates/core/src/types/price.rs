//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are in the currency's standard unit (pesos, not centavos).
/// `Display` renders the shopper-facing form: `₱1,450` for whole amounts,
/// `₱99.50` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Whole-unit convenience constructor, e.g. `Price::whole(250, CurrencyCode::PHP)`.
    #[must_use]
    pub fn whole(amount: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::from(amount), currency_code)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add two prices of the same currency.
    ///
    /// Returns `None` when the currencies differ.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency_code == other.currency_code)
            .then(|| Self::new(self.amount + other.amount, self.currency_code))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let fixed = format!("{:.2}", rounded.abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        write!(
            f,
            "{sign}{}{}",
            self.currency_code.symbol(),
            group_thousands(whole)
        )?;
        if cents != "00" {
            write!(f, ".{cents}")?;
        }
        Ok(())
    }
}

/// Insert `,` separators every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Philippine peso.
    #[default]
    PHP,
    /// US dollar.
    USD,
    /// Euro.
    EUR,
    /// Pound sterling.
    GBP,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::PHP => "₱",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PHP => "PHP",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PHP" => Ok(Self::PHP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn php(amount: &str) -> Price {
        Price::new(amount.parse().unwrap(), CurrencyCode::PHP)
    }

    #[test]
    fn test_display_whole_amounts() {
        assert_eq!(php("250").to_string(), "₱250");
        assert_eq!(php("1450").to_string(), "₱1,450");
        assert_eq!(php("1234567").to_string(), "₱1,234,567");
        assert_eq!(php("0").to_string(), "₱0");
    }

    #[test]
    fn test_display_fractional_amounts() {
        assert_eq!(php("99.5").to_string(), "₱99.50");
        assert_eq!(php("1000.005").to_string(), "₱1,000");
        assert_eq!(php("-12.25").to_string(), "-₱12.25");
    }

    #[test]
    fn test_times_and_add() {
        let total = php("250")
            .checked_add(php("600").times(2))
            .unwrap();
        assert_eq!(total, php("1450"));
    }

    #[test]
    fn test_checked_add_rejects_mixed_currency() {
        let usd = Price::whole(5, CurrencyCode::USD);
        assert!(php("5").checked_add(usd).is_none());
    }

    #[test]
    fn test_is_negative() {
        assert!(php("-1").is_negative());
        assert!(!php("0").is_negative());
        assert!(!php("1").is_negative());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("php".parse::<CurrencyCode>().unwrap(), CurrencyCode::PHP);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
