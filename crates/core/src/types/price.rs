//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored in `NUMERIC(10, 2)` columns, so a [`Price`] is only
//! constructed from amounts that fit: non-negative, at most two decimal
//! places and at most eight digits before the decimal point.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Input is not a decimal number.
    #[error("A valid number is required.")]
    Invalid,
    /// Amount is below zero.
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    /// Amount has more decimal places than the column stores.
    #[error("Ensure that there are no more than {max} decimal places.")]
    TooManyDecimalPlaces {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// Amount has more whole digits than the column stores.
    #[error("Ensure that there are no more than {max} digits before the decimal point.")]
    TooManyWholeDigits {
        /// Maximum allowed whole digits.
        max: u32,
    },
}

/// A non-negative monetary amount with two decimal places.
///
/// Serializes as a string (`"19.99"`) to avoid float rounding in clients.
///
/// ```
/// use catalog_core::{Price, PriceError};
///
/// let price = Price::parse("19.9").unwrap();
/// assert_eq!(price.to_string(), "19.90");
///
/// assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
/// assert!(Price::parse("1.999").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Total digits a stored price may have.
    pub const MAX_DIGITS: u32 = 10;
    /// Decimal places a stored price keeps.
    pub const DECIMAL_PLACES: u32 = 2;
    /// Zero, the price of a product without variants.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount is negative or does not fit
    /// `NUMERIC(10, 2)`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let normalized = amount.normalize();
        if normalized.is_sign_negative() && !normalized.is_zero() {
            return Err(PriceError::Negative);
        }
        // Scale as written, so "1.500" counts three places.
        if amount.scale() > Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }

        let max_whole = Self::MAX_DIGITS - Self::DECIMAL_PLACES;
        let limit = Decimal::from(10_i64.pow(max_whole));
        if normalized.trunc().abs() >= limit {
            return Err(PriceError::TooManyWholeDigits { max: max_whole });
        }

        let mut amount = normalized.abs();
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Parse a price from its textual form (`"19.99"`, `"20"`, `"1e2"`).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the text is not a number, otherwise
    /// the errors of [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        let amount = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pads_to_two_places() {
        assert_eq!(Price::parse("20").unwrap().to_string(), "20.00");
        assert_eq!(Price::parse("19.5").unwrap().to_string(), "19.50");
        assert_eq!(Price::parse(" 0.01 ").unwrap().to_string(), "0.01");
    }

    #[test]
    fn test_parse_rejects_trailing_zeros_beyond_scale() {
        assert_eq!(
            Price::parse("1.500"),
            Err(PriceError::TooManyDecimalPlaces { max: 2 })
        );
        assert_eq!(Price::parse("1.50").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(Price::parse("1e2").unwrap().to_string(), "100.00");
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(Price::parse("-0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Price::parse("abc"), Err(PriceError::Invalid));
        assert_eq!(Price::parse(""), Err(PriceError::Invalid));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert_eq!(
            Price::parse("1.001"),
            Err(PriceError::TooManyDecimalPlaces { max: 2 })
        );
        assert_eq!(
            Price::parse("100000000"),
            Err(PriceError::TooManyWholeDigits { max: 8 })
        );
        assert!(Price::parse("99999999.99").is_ok());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("9.9").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"9.90\"");
    }

    #[test]
    fn test_ordering() {
        let low = Price::parse("5").unwrap();
        let high = Price::parse("10.25").unwrap();
        assert!(low < high);
        assert_eq!([high, low].into_iter().min(), Some(low));
    }
}
