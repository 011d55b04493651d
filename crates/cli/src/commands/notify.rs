//! Debt notification command.
//!
//! Runs one pass of the debt notification scan: every unit with an
//! outstanding balance and a contact email gets an individual message over
//! SMTP. Scheduling (cron, systemd timers) is left to the operator; this
//! command is the trigger.
//!
//! # Usage
//!
//! ```bash
//! electronet notify-debtors
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `SQLite` connection string
//! - `SMTP_HOST` / `SMTP_PORT` - Relay to deliver through
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - Relay credentials
//! - `SMTP_FROM` - Sender address, defaults to `no-reply@example.com`
//! - `NOTIFY_MAX_RETRIES` / `NOTIFY_RUN_TIMEOUT_SECS` - Retry tuning

use tracing::info;

use electronet_directory::config::Config;
use electronet_directory::db;
use electronet_directory::services::{NotificationService, SmtpMailer};

/// Run the debt notification scan once.
///
/// # Errors
///
/// Returns an error if SMTP is not configured, the database is unreachable,
/// or the scan exhausts its retries.
pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(smtp) = config.smtp.as_ref() else {
        return Err(
            "SMTP is not configured; set SMTP_HOST, SMTP_USERNAME and SMTP_PASSWORD".into(),
        );
    };

    info!("Connecting to directory database...");
    let pool = db::create_pool(&config.database_url).await?;

    let mailer = SmtpMailer::new(smtp)?;
    let service = NotificationService::new(pool, mailer, config.retry);

    info!("Starting debt notification scan...");
    let report = service.run_scan().await?;

    info!(
        run = %report.run_id,
        selected = report.selected,
        sent = report.sent,
        "Debt notification scan complete"
    );
    Ok(())
}
