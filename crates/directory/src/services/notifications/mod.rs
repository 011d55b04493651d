//! Debt notification job: selection, composition, delivery, and retry.
//!
//! The run itself is a pure pipeline (select debtors, compose one notice per
//! debtor, hand each to the [`Mailer`]); scheduling is external, and the
//! transport is behind a trait so the pipeline tests without a relay.

pub mod mailer;
pub mod messages;
pub mod retry;

pub use mailer::{Mailer, SmtpMailer};
pub use messages::{DebtNotice, NO_SUPPLIER_PLACEHOLDER};
pub use retry::RetryPolicy;

use chrono::{NaiveDate, Utc};
use lettre::transport::smtp::Error as SmtpError;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db::units;
use crate::error::{DirectoryError, Result};

/// Errors from a single notification run attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build an email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// An address could not be parsed into a mailbox.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Loading the debtor set failed.
    #[error("failed to load debtors: {0}")]
    Storage(#[source] Box<DirectoryError>),

    /// The attempt ran past its wall-clock budget.
    #[error("run exceeded its {limit_secs}s wall-clock budget")]
    Timeout {
        /// The budget that was exceeded, in seconds.
        limit_secs: u64,
    },
}

/// Outcome of a completed notification run.
#[derive(Debug, Clone, Serialize)]
pub struct DebtScanReport {
    /// Correlation ID for the run, also carried in its log lines.
    pub run_id: Uuid,
    /// Date stamped into every notice of the successful attempt.
    pub run_date: NaiveDate,
    /// Debtors the scan selected.
    pub selected: u64,
    /// Notices delivered. A failed send aborts the attempt, so this equals
    /// `selected` whenever the run succeeds.
    pub sent: u64,
}

/// Debt notification job runner.
///
/// Generic over the transport so tests can swap in a recording mailer.
pub struct NotificationService<M: Mailer> {
    pool: SqlitePool,
    mailer: M,
    policy: RetryPolicy,
}

impl<M: Mailer> NotificationService<M> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(pool: SqlitePool, mailer: M, policy: RetryPolicy) -> Self {
        Self {
            pool,
            mailer,
            policy,
        }
    }

    /// Run the debt notification scan, retrying failed runs per the policy.
    ///
    /// Each attempt selects every unit with outstanding debt and a usable
    /// email, composes one notice per unit, and sends them in order. Any
    /// failure aborts the attempt as a whole; the next attempt re-sends from
    /// the start, so a unit is never skipped because an earlier one failed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::JobFailure`] once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn run_scan(&self) -> Result<DebtScanReport> {
        let run_id = Uuid::new_v4();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt_run(run_id).await {
                Ok(report) => {
                    info!(run = %run_id, sent = report.sent, attempt, "Debt notification run complete");
                    return Ok(report);
                }
                Err(e) if attempt <= self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(run = %run_id, error = %e, attempt, delay = ?delay, "Debt notification run failed; retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(run = %run_id, error = %e, attempts = attempt, "Debt notification run failed; retries exhausted");
                    return Err(DirectoryError::JobFailure {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// One attempt, bounded by the policy's wall-clock budget.
    async fn attempt_run(&self, run_id: Uuid) -> std::result::Result<DebtScanReport, NotifyError> {
        match tokio::time::timeout(self.policy.run_timeout, self.send_all(run_id)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout {
                limit_secs: self.policy.run_timeout.as_secs(),
            }),
        }
    }

    async fn send_all(&self, run_id: Uuid) -> std::result::Result<DebtScanReport, NotifyError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| NotifyError::Storage(Box::new(DirectoryError::Database(e))))?;
        let debtors = units::debtors(&mut conn)
            .await
            .map_err(|e| NotifyError::Storage(Box::new(e)))?;
        // Release the pooled connection before the slow transport work.
        drop(conn);

        let run_date = Utc::now().date_naive();
        let mut sent: u64 = 0;
        for debtor in &debtors {
            let notice = messages::compose(debtor, run_date);
            self.mailer.send(&notice).await?;
            sent += 1;
        }
        Ok(DebtScanReport {
            run_id,
            run_date,
            selected: debtors.len() as u64,
            sent,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use electronet_core::{Debt, Email, UnitRole};

    use crate::db;
    use crate::models::NewUnit;

    use super::*;

    /// Mailer that records notices and optionally fails the first N sends.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<DebtNotice>>,
        failures_left: AtomicU32,
    }

    impl RecordingMailer {
        fn failing(times: u32) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failures_left: AtomicU32::new(times),
            }
        }

        fn sent(&self) -> Vec<DebtNotice> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, notice: &DebtNotice) -> std::result::Result<(), NotifyError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(NotifyError::InvalidAddress("relay down".to_owned()));
            }
            self.sent.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            run_timeout: Duration::from_secs(5),
        }
    }

    fn unit(name: &str, email: &str, debt: &str) -> NewUnit {
        NewUnit {
            name: name.to_owned(),
            role: UnitRole::Retail,
            email: Email::parse(email).unwrap(),
            country: "Germany".to_owned(),
            city: "Berlin".to_owned(),
            street: "Hauptstr".to_owned(),
            house_number: "1".to_owned(),
            supplier_id: None,
            debt: Debt::parse(debt).unwrap(),
            product_ids: Vec::new(),
        }
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        db::units::insert(&mut conn, &unit("Retail X", "x@example.com", "120.50"))
            .await
            .unwrap();
        db::units::insert(&mut conn, &unit("Retail Y", "y@example.com", "0.00"))
            .await
            .unwrap();
        db::units::insert(&mut conn, &unit("Retail Z", "z@example.com", "3.00"))
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_run_scan_sends_one_notice_per_debtor() {
        let pool = seeded_pool().await;
        let service = NotificationService::new(pool, RecordingMailer::default(), fast_policy());

        let report = service.run_scan().await.unwrap();

        assert_eq!(report.selected, 2);
        assert_eq!(report.sent, 2);
        let notices = service.mailer.sent();
        assert_eq!(notices.len(), 2);
        // Zero-debt units are never selected
        assert!(notices.iter().all(|n| n.to.as_str() != "y@example.com"));
    }

    #[tokio::test]
    async fn test_run_scan_retries_and_recovers() {
        let pool = seeded_pool().await;
        let service = NotificationService::new(pool, RecordingMailer::failing(1), fast_policy());

        let report = service.run_scan().await.unwrap();

        // The failed attempt aborted; the retry re-sent the full set.
        assert_eq!(report.sent, 2);
        assert_eq!(service.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_run_scan_exhausts_retries() {
        let pool = seeded_pool().await;
        // More failures than attempts (1 first run + 2 retries)
        let service = NotificationService::new(pool, RecordingMailer::failing(10), fast_policy());

        let err = service.run_scan().await.unwrap_err();

        assert!(matches!(
            err,
            DirectoryError::JobFailure { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_run_scan_with_no_debtors_sends_nothing() {
        let pool = db::connect_in_memory().await.unwrap();
        let service = NotificationService::new(pool, RecordingMailer::default(), fast_policy());

        let report = service.run_scan().await.unwrap();

        assert_eq!(report.selected, 0);
        assert_eq!(report.sent, 0);
        assert!(service.mailer.sent().is_empty());
    }
}
