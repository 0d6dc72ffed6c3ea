//! API token authentication
//!
//! Identity itself is delegated to whatever sits in front of the service;
//! this module owns the gate. A bearer token is generated on first run and
//! logged once; only its SHA-256 digest is persisted, under the
//! `api_token_hash` settings key. Each request's presented token is hashed
//! and compared against the stored digest.
//!
//! Storing the literal value `0` disables auth checking entirely
//! (development/test convention).

use crate::{Error, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Settings key holding the SHA-256 digest of the API token
pub const TOKEN_HASH_KEY: &str = "api_token_hash";

/// Stored value that disables authentication
pub const AUTH_DISABLED: &str = "0";

/// SHA-256 digest of a token, as 64 lowercase hex characters
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Check a presented token against the stored digest
pub fn verify_token(presented: &str, stored_hash: &str) -> bool {
    hash_token(presented) == stored_hash
}

/// Load the stored token digest, generating a fresh token if none exists
///
/// Returns [`AUTH_DISABLED`] unchanged when auth is switched off.
pub async fn load_token_hash(db: &SqlitePool) -> Result<String> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(TOKEN_HASH_KEY)
            .fetch_optional(db)
            .await?;

    match result {
        Some((value,)) => {
            if value == AUTH_DISABLED {
                warn!("API authentication disabled ({} = 0)", TOKEN_HASH_KEY);
            }
            Ok(value)
        }
        None => initialize_token(db).await,
    }
}

/// Generate a random API token, persist its digest, and return the digest
///
/// The cleartext token is logged exactly once here; it is not recoverable
/// afterwards.
pub async fn initialize_token(db: &SqlitePool) -> Result<String> {
    let mut rng = rand::thread_rng();
    let token = format!("{:032x}", rng.gen::<u128>());
    let token_hash = hash_token(&token);

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(TOKEN_HASH_KEY)
        .bind(&token_hash)
        .execute(db)
        .await?;

    info!("Generated new API token: {}", token);
    info!("Record it now; only its hash is stored");

    Ok(token_hash)
}

/// Extract the bearer token from an Authorization header value
pub fn bearer_token(header_value: &str) -> Result<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Error::Unauthenticated)
}
