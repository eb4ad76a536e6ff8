//! Document id utilities

use uuid::Uuid;

/// Generate a new document id (UUIDv4, hyphenated)
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether `s` parses as a UUID
pub fn is_valid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}
