//! Business logic services for the directory.
//!
//! # Services
//!
//! - `directory` - Validated unit and product operations
//! - `notifications` - Debt notification job with retrying SMTP delivery

pub mod directory;
pub mod notifications;

pub use directory::DirectoryService;
pub use notifications::{
    DebtNotice, DebtScanReport, Mailer, NotificationService, NotifyError, RetryPolicy, SmtpMailer,
};
