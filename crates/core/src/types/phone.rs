//! Philippine mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input contains no digits.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, spaces, dashes,
    /// parentheses or a leading `+`.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The subscriber number is not exactly ten digits.
    #[error("phone number must be {expected} digits (excluding +63), got {actual}")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of digits found after stripping the country code.
        actual: usize,
    },
}

/// A Philippine mobile number stored as its ten subscriber digits.
///
/// Accepts the forms shoppers type: `9171234567`, `+63 917 123 4567`,
/// `0917-123-4567`. The `+63` country code and trunk `0` are stripped.
///
/// ```
/// use mystery_sack_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+63 917 123 4567").unwrap();
/// assert_eq!(phone.as_str(), "9171234567");
/// assert_eq!(phone.international(), "+639171234567");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of subscriber digits in a PH mobile number.
    pub const DIGITS: usize = 10;

    /// Country calling code, without the `+`.
    pub const COUNTRY_CODE: &'static str = "63";

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneNumberError::Empty`] when no digits are present,
    /// [`PhoneNumberError::InvalidCharacter`] for letters or symbols, and
    /// [`PhoneNumberError::WrongLength`] when the subscriber number is not
    /// ten digits long.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = s.trim();
        let mut digits = String::with_capacity(trimmed.len());
        for (idx, c) in trimmed.char_indices() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                '+' if idx == 0 => {}
                other => return Err(PhoneNumberError::InvalidCharacter(other)),
            }
        }

        if digits.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let subscriber = if trimmed.starts_with('+') {
            digits.strip_prefix(Self::COUNTRY_CODE).unwrap_or(&digits)
        } else if digits.len() == Self::DIGITS + Self::COUNTRY_CODE.len() {
            digits.strip_prefix(Self::COUNTRY_CODE).unwrap_or(&digits)
        } else if digits.len() == Self::DIGITS + 1 {
            digits.strip_prefix('0').unwrap_or(&digits)
        } else {
            &digits
        };

        if subscriber.len() != Self::DIGITS {
            return Err(PhoneNumberError::WrongLength {
                expected: Self::DIGITS,
                actual: subscriber.len(),
            });
        }

        Ok(Self(subscriber.to_owned()))
    }

    /// The ten subscriber digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number in E.164 form (`+63` prefix).
    #[must_use]
    pub fn international(&self) -> String {
        format!("+{}{}", Self::COUNTRY_CODE, self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
