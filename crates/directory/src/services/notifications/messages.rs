//! Notice composition for the debt notification run.
//!
//! Composition is pure: given a debtor row and the run date it produces the
//! full message, so tests can assert on content without any transport.

use chrono::NaiveDate;

use electronet_core::Email;

use crate::db::units::Debtor;

/// Text used when a debtor has no supplier link.
pub const NO_SUPPLIER_PLACEHOLDER: &str = "No supplier on record";

/// One composed notice, addressed and ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtNotice {
    /// Recipient address.
    pub to: Email,
    /// Subject line naming the debtor and its supplier.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Compose the notice for one debtor.
///
/// Every notice in a run carries the same `run_date`, taken once at the
/// start of the run.
#[must_use]
pub fn compose(debtor: &Debtor, run_date: NaiveDate) -> DebtNotice {
    let supplier = debtor
        .supplier_name
        .as_deref()
        .unwrap_or(NO_SUPPLIER_PLACEHOLDER);

    let subject = format!(
        "Outstanding debt of \"{}\" to \"{}\"",
        debtor.name, supplier
    );
    let body = format!(
        "Good day!\n\n\
         As of {run_date}, the outstanding amount is: {debt}.\n\
         Supplier: {supplier}.\n\n\
         If you have already made the payment, please disregard this message.",
        debt = debtor.debt,
    );

    DebtNotice {
        to: debtor.email.clone(),
        subject,
        body,
    }
}
