//! Unified error handling for the directory engine.
//!
//! Every public operation returns `Result<T, DirectoryError>`. Business-rule
//! rejections (structure, uniqueness, references) are distinct variants so
//! callers can tell which rule failed without string matching.

use thiserror::Error;

use electronet_core::{DebtError, EmailError, ProductId, UnitId};

use crate::services::notifications::NotifyError;

/// A structural rule enforced by the hierarchy validator.
///
/// Listed in evaluation order: the validator reports the first rule that
/// rejects a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralRule {
    /// A factory proposed a supplier reference.
    FactoryWithSupplier,
    /// A unit proposed itself as its own supplier.
    SelfReference,
    /// The proposed supplier link would close a cycle.
    SupplyCycle,
}

impl StructuralRule {
    /// Human-readable description of the violated rule.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::FactoryWithSupplier => "a factory cannot have a supplier",
            Self::SelfReference => "a unit cannot be its own supplier",
            Self::SupplyCycle => "the supplier link would create a cycle in the supply chain",
        }
    }
}

/// Engine-level error type for the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A hierarchy rule rejected the proposed unit state. Surfaced before any
    /// write; never auto-corrected.
    #[error("structural violation: {}", .0.message())]
    Structural(StructuralRule),

    /// A uniqueness constraint rejected the write (normalized email, or the
    /// product (name, model) pair).
    #[error("uniqueness violation: {field} already in use")]
    Uniqueness {
        /// The conflicting field or field pair.
        field: &'static str,
    },

    /// Deletion blocked: other units still reference this one as supplier.
    #[error("unit is referenced as supplier by {clients} client(s)")]
    Referential {
        /// Number of referencing units at the time of the check.
        clients: u64,
    },

    /// A supplier-chain walk ran past the total unit count. This means the
    /// no-cycle invariant was already broken out-of-band; it is corruption,
    /// not a normal validation rejection.
    #[error("supplier chain walk exceeded {bound} links; graph integrity is broken")]
    IntegrityBoundExceeded {
        /// The walk bound that was exceeded (total unit count).
        bound: u64,
    },

    /// Entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("unit" or "product").
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: i64,
    },

    /// Field-level input rejection from the core types.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Which field was rejected.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value failed conversion into its domain type.
    #[error("stored data is corrupt: {0}")]
    DataCorruption(String),

    /// The debt notification run failed after exhausting its retries.
    #[error("debt notification run failed after {attempts} attempt(s)")]
    JobFailure {
        /// How many attempts were made, the first run included.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: NotifyError,
    },
}

impl DirectoryError {
    pub(crate) const fn unit_not_found(id: UnitId) -> Self {
        Self::NotFound {
            entity: "unit",
            id: id.as_i64(),
        }
    }

    pub(crate) const fn product_not_found(id: ProductId) -> Self {
        Self::NotFound {
            entity: "product",
            id: id.as_i64(),
        }
    }
}

impl From<EmailError> for DirectoryError {
    fn from(err: EmailError) -> Self {
        Self::Validation {
            field: "email",
            message: err.to_string(),
        }
    }
}

impl From<DebtError> for DirectoryError {
    fn from(err: DebtError) -> Self {
        Self::Validation {
            field: "debt",
            message: err.to_string(),
        }
    }
}

/// Result type alias for `DirectoryError`.
pub type Result<T> = std::result::Result<T, DirectoryError>;
