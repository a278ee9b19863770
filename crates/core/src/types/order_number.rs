//! Order number type.
//!
//! Order numbers are 8-character uppercase alphanumeric codes, unique per
//! order and shown to customers ("your order number is 7K2M9QXZ").

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The input is not exactly [`OrderNumber::LENGTH`] characters.
    #[error("order number must be exactly 8 characters")]
    WrongLength,
    /// The input contains a character outside `A-Z0-9`.
    #[error("order number may only contain uppercase letters and digits")]
    InvalidCharacter,
}

/// A customer-facing order number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Length of every order number.
    pub const LENGTH: usize = 8;

    /// Parse an `OrderNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 8 uppercase
    /// alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        if s.len() != Self::LENGTH {
            return Err(OrderNumberError::WrongLength);
        }
        if !s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(OrderNumberError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
