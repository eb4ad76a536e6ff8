//! Operations that combine store access, domain rules and notifications

pub mod deletion;
pub mod loans;
pub mod notifications;
pub mod reminders;

pub use deletion::{delete_musicians, delete_scores, DeleteOutcome};
pub use loans::{create_loan, return_loan, NewLoan};
pub use notifications::{dispatch_notification, Caller, DispatchReport};
pub use reminders::{run_reminders, ReminderRunReport};
