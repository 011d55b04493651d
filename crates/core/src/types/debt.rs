//! Debt balance type using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Debt`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum DebtError {
    /// The amount is below zero.
    #[error("debt cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("debt must have at most {max_places} decimal places")]
    TooPrecise {
        /// Maximum allowed decimal places.
        max_places: u32,
    },
    /// The amount does not fit in twelve significant digits.
    #[error("debt must have at most {max_digits} digits")]
    TooLarge {
        /// Maximum allowed total digits.
        max_digits: u32,
    },
    /// The input string is not a decimal number.
    #[error("invalid debt amount: {0}")]
    InvalidNumber(String),
}

/// A non-negative debt balance owed to a supplier.
///
/// Stored with exactly two decimal places, like the currency amounts it
/// represents. Construction rejects negative values, values more precise
/// than a cent, and values wider than twelve digits, so a `Debt` held
/// anywhere in the system is always a valid balance.
///
/// ## Examples
///
/// ```
/// use electronet_core::Debt;
/// use rust_decimal::Decimal;
///
/// let debt = Debt::parse("120000.00").unwrap();
/// assert!(debt.is_outstanding());
/// assert_eq!(debt.to_string(), "120000.00");
///
/// assert_eq!(Debt::ZERO.to_string(), "0.00");
/// assert!(Debt::new(Decimal::new(-1, 2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Debt(Decimal);

impl Default for Debt {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Debt {
    /// Maximum decimal places.
    pub const MAX_PLACES: u32 = 2;

    /// Maximum total digits (ten integer digits plus two decimal places).
    pub const MAX_DIGITS: u32 = 12;

    /// A zero balance.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    /// Create a `Debt` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, carries more than two
    /// decimal places, or exceeds twelve digits.
    pub fn new(amount: Decimal) -> Result<Self, DebtError> {
        if amount < Decimal::ZERO {
            return Err(DebtError::Negative);
        }

        if amount.scale() > Self::MAX_PLACES {
            return Err(DebtError::TooPrecise {
                max_places: Self::MAX_PLACES,
            });
        }

        if amount >= Decimal::new(10_000_000_000, 0) {
            return Err(DebtError::TooLarge {
                max_digits: Self::MAX_DIGITS,
            });
        }

        let mut canonical = amount;
        canonical.rescale(Self::MAX_PLACES);
        Ok(Self(canonical))
    }

    /// Parse a `Debt` from its decimal string form (e.g. a stored value).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal number or the amount
    /// violates the constraints of [`Debt::new`].
    pub fn parse(s: &str) -> Result<Self, DebtError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| DebtError::InvalidNumber(s.to_owned()))?;
        Self::new(amount)
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if any debt is owed (amount strictly greater than zero).
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Debt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Debt {
    type Error = DebtError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Debt> for Decimal {
    fn from(debt: Debt) -> Self {
        debt.0
    }
}

impl std::str::FromStr for Debt {
    type Err = DebtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
