use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

use super::{Session, SessionToken};

/// Generate a cryptographically random session token.
pub fn generate_session_token() -> SessionToken {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionToken::new(token)
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Hex-encoded SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a password against a digest produced by [`hash_password`].
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(password_hash)
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts both a bare token and `Bearer <token>`. Returns `None` for an
/// empty value.
pub fn parse_token(header: &str) -> Option<SessionToken> {
    let value = header.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then(|| SessionToken::new(token.to_string()))
}
