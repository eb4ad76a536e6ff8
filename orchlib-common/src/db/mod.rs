//! Database models and queries

pub mod init;
pub mod loans;
pub mod models;
pub mod musicians;
pub mod scores;
pub mod settings;

pub use init::*;
pub use models::*;
