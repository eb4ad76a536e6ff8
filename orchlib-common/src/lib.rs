//! # Orchlib Common Library
//!
//! Shared code for the orchestra sheet-music library:
//! - Documents and their SQLite store
//! - Loan lifecycle and the delete guard
//! - Search, sorting and loan listings
//! - Reminder selection and notification templates
//! - Configuration loading
//! - API token helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod instruments;
pub mod lifecycle;
pub mod listing;
pub mod notification;
pub mod reminders;
pub mod search;
pub mod time;
pub mod uuid_utils;

pub use error::{EntityKind, Error, Result};
