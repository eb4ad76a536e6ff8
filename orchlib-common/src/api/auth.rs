//! API token management
//!
//! Protected endpoints require `Authorization: Bearer <token>`. The token
//! comes from the config file, or is generated once and kept in the
//! settings table under `api_token`.
//!
//! This module holds only the framework-independent parts; the HTTP
//! middleware lives in the server crate.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::settings::{get_setting, set_setting};
use crate::Result;

pub const API_TOKEN_KEY: &str = "api_token";

/// Load the stored API token, generating and storing one if absent
///
/// # Examples
///
/// ```ignore
/// let token = load_api_token(&db).await?;
/// assert_eq!(token.len(), 64);
/// ```
pub async fn load_api_token(db: &SqlitePool) -> Result<String> {
    match get_setting::<String>(db, API_TOKEN_KEY).await? {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => initialize_api_token(db).await,
    }
}

/// Generate a random 256-bit token, store it and return it hex-encoded
pub async fn initialize_api_token(db: &SqlitePool) -> Result<String> {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    set_setting(db, API_TOKEN_KEY, &token).await?;
    info!("Generated new API token (stored in settings table as '{}')", API_TOKEN_KEY);

    Ok(token)
}

/// Compare a presented token with the expected one.
///
/// Both sides are hashed first so the comparison time does not depend on
/// how many leading characters match.
pub fn token_matches(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Token from an `Authorization` header value, if it uses the Bearer scheme
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory_database;

    #[test]
    fn token_comparison() {
        assert!(token_matches("abc123", "abc123"));
        assert!(!token_matches("abc124", "abc123"));
        assert!(!token_matches("", "abc123"));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[tokio::test]
    async fn token_is_generated_once() {
        let db = init_in_memory_database().await.unwrap();

        let first = load_api_token(&db).await.unwrap();
        let second = load_api_token(&db).await.unwrap();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(first, second);
    }
}
