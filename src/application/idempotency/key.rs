//! Idempotency key helpers.

use uuid::Uuid;

/// Generate a fresh key (UUID v4, hyphenated).
#[must_use]
pub fn generate_key() -> String {
    Uuid::new_v4().to_string()
}

/// True if `key` is a hyphenated UUID, any version, either case.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    key.len() == 36 && Uuid::try_parse(key).is_ok()
}
