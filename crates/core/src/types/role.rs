//! Unit role enumeration.

use serde::{Deserialize, Serialize};

/// The structural role of a unit in the supply chain.
///
/// The role drives the hierarchy rules: a factory is always a root of its
/// supply tree and may never reference a supplier, while retail chains and
/// sole proprietors may sit at any depth below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitRole {
    /// Produces goods; always a root (no supplier allowed).
    Factory,
    /// Retail chain; buys from a factory or another intermediary.
    Retail,
    /// Individual entrepreneur; buys from any other unit.
    SoleProprietor,
}

impl UnitRole {
    /// The role's canonical storage string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Factory => "FACTORY",
            Self::Retail => "RETAIL",
            Self::SoleProprietor => "SOLE_PROPRIETOR",
        }
    }

    /// Returns true for the factory role.
    #[must_use]
    pub const fn is_factory(&self) -> bool {
        matches!(self, Self::Factory)
    }
}

impl std::fmt::Display for UnitRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FACTORY" => Ok(Self::Factory),
            "RETAIL" => Ok(Self::Retail),
            "SOLE_PROPRIETOR" => Ok(Self::SoleProprietor),
            _ => Err(format!("invalid unit role: {s}")),
        }
    }
}
