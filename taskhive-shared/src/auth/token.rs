/// Bearer token utilities
///
/// This module provides utilities for generating and validating the opaque
/// bearer tokens issued at login. These work in conjunction with the
/// `models::api_token` module for database operations.
///
/// # Security
///
/// - **Format**: `hive_{40_chars}` (prefix + 40 random alphanumeric chars)
/// - **Storage**: Tokens are hashed with SHA-256 before storage; the
///   plaintext exists only in the issuance response
/// - **Revocation**: Deleting the stored row invalidates the token on the
///   next request
/// - **Abilities**: Per-token permission strings (e.g., "tasks:write")
///
/// # Token Format
///
/// Tokens follow the pattern: `hive_abcd1234efgh5678...` (45 chars total)
/// - Prefix: "hive_" (5 chars)
/// - Random part: 40 alphanumeric chars (base62: [A-Za-z0-9])
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// // Generate a new token
/// let (secret, hash) = generate_token();
/// assert!(secret.starts_with("hive_"));
/// assert_eq!(secret.len(), 45);
///
/// // Validate format
/// assert!(validate_token_format(&secret));
///
/// // Hash matches
/// let computed_hash = hash_token(&secret);
/// assert_eq!(hash, computed_hash);
/// ```
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Token prefix
const TOKEN_PREFIX: &str = "hive_";

/// Total length of a token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new bearer token
///
/// Creates a cryptographically random token with the format `hive_{40_chars}`.
/// Also returns the SHA-256 hash for database storage.
///
/// # Returns
///
/// Tuple of (plaintext_secret, sha256_hash)
///
/// # Security
///
/// - Uses `rand::thread_rng()` for cryptographic randomness
/// - Token space: 62^40 combinations
/// - Hash prevents plaintext storage
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::generate_token;
///
/// let (secret, hash) = generate_token();
/// assert!(secret.starts_with("hive_"));
/// assert_eq!(secret.len(), 45);
/// assert_eq!(hash.len(), 64); // SHA-256 hex is 64 chars
/// ```
pub fn generate_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let secret = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&secret);

    (secret, hash)
}

/// Generates a random alphanumeric string
///
/// Uses base62 encoding (A-Z, a-z, 0-9) for header-safe tokens.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a token using SHA-256
///
/// # Arguments
///
/// * `secret` - Plaintext token
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::hash_token;
///
/// let hash = hash_token("hive_test123");
/// assert_eq!(hash.len(), 64);
///
/// // Same input = same hash (deterministic)
/// let hash2 = hash_token("hive_test123");
/// assert_eq!(hash, hash2);
/// ```
pub fn hash_token(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates token format
///
/// Checks that the token:
/// - Starts with "hive_"
/// - Has correct length (45 chars)
/// - Contains only alphanumeric characters after the prefix
///
/// Used as a cheap pre-check before the database lookup; a token that fails
/// here can never match a stored hash.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::validate_token_format;
///
/// // Valid
/// assert!(validate_token_format("hive_abcdefghijklmnopqrstuvwxyz01234567890123"));
///
/// // Invalid - wrong prefix
/// assert!(!validate_token_format("auth_abcdefghijklmnopqrstuvwxyz01234567890123"));
///
/// // Invalid - too short
/// assert!(!validate_token_format("hive_short"));
/// ```
pub fn validate_token_format(secret: &str) -> bool {
    // Check length
    if secret.len() != TOKEN_LENGTH {
        return false;
    }

    // Check prefix
    if !secret.starts_with(TOKEN_PREFIX) {
        return false;
    }

    // Check random part is alphanumeric
    let random_part = &secret[TOKEN_PREFIX.len()..];
    random_part.chars().all(|c| c.is_ascii_alphanumeric())
}

/// The ability set granted to tokens issued at login and registration
///
/// Every session token currently carries the global wildcard. Issuing a
/// narrower token is a data change at the call site, not a schema change.
pub fn default_abilities() -> Vec<String> {
    vec!["*".to_string()]
}

/// Checks if an ability list contains a required ability
///
/// Supports wildcard matching with `*`:
/// - `tasks:*` matches `tasks:read`, `tasks:write`, etc.
/// - `*` matches everything
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::token::has_ability;
///
/// let abilities = vec!["tasks:read".to_string(), "tokens:*".to_string()];
///
/// // Exact match
/// assert!(has_ability(&abilities, "tasks:read"));
///
/// // Wildcard match
/// assert!(has_ability(&abilities, "tokens:revoke"));
///
/// // No match
/// assert!(!has_ability(&abilities, "tasks:write"));
///
/// // Global wildcard
/// let session_abilities = vec!["*".to_string()];
/// assert!(has_ability(&session_abilities, "anything"));
/// ```
pub fn has_ability(abilities: &[String], required: &str) -> bool {
    for ability in abilities {
        // Global wildcard
        if ability == "*" {
            return true;
        }

        // Exact match
        if ability == required {
            return true;
        }

        // Wildcard match (e.g., "tasks:*" matches "tasks:read")
        if ability.ends_with(":*") {
            let prefix = &ability[..ability.len() - 1]; // Remove "*", keep ":"
            if required.starts_with(prefix) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let (secret1, hash1) = generate_token();
        let (secret2, hash2) = generate_token();

        // Check format
        assert!(secret1.starts_with("hive_"));
        assert_eq!(secret1.len(), 45);

        // Check randomness
        assert_ne!(secret1, secret2);
        assert_ne!(hash1, hash2);

        // Check hash length
        assert_eq!(hash1.len(), 64); // SHA-256 hex
        assert_eq!(hash2.len(), 64);
    }

    #[test]
    fn test_hash_token() {
        let secret = "hive_test123";
        let hash = hash_token(secret);

        assert_eq!(hash.len(), 64);

        // Deterministic
        let hash2 = hash_token(secret);
        assert_eq!(hash, hash2);

        // Different secret = different hash
        let hash3 = hash_token("hive_different");
        assert_ne!(hash, hash3);
    }

    #[test]
    fn test_validate_token_format() {
        let (secret, _) = generate_token();
        assert!(validate_token_format(&secret));

        // Invalid - wrong prefix
        assert!(!validate_token_format(
            "auth_abcdefghijklmnopqrstuvwxyz01234567890123"
        ));

        // Invalid - too short
        assert!(!validate_token_format("hive_short"));

        // Invalid - too long
        assert!(!validate_token_format(
            "hive_abcdefghijklmnopqrstuvwxyz012345678901234567"
        ));

        // Invalid - special characters
        assert!(!validate_token_format(
            "hive_abc!@#$%^&*()_+={}[]|\\:;\"'<>,.?/0123456789"
        ));

        // Invalid - no prefix
        assert!(!validate_token_format(
            "abcdefghijklmnopqrstuvwxyz0123456789012345678"
        ));
    }

    #[test]
    fn test_default_abilities() {
        let abilities = default_abilities();
        assert_eq!(abilities, vec!["*".to_string()]);
        assert!(has_ability(&abilities, "tasks:write"));
    }

    #[test]
    fn test_has_ability() {
        let abilities = vec![
            "tasks:read".to_string(),
            "tasks:write".to_string(),
            "tokens:*".to_string(),
        ];

        // Exact matches
        assert!(has_ability(&abilities, "tasks:read"));
        assert!(has_ability(&abilities, "tasks:write"));

        // Wildcard matches
        assert!(has_ability(&abilities, "tokens:list"));
        assert!(has_ability(&abilities, "tokens:revoke"));

        // No match
        assert!(!has_ability(&abilities, "tasks:delete"));
        assert!(!has_ability(&abilities, "users:read"));
    }

    #[test]
    fn test_has_ability_global_wildcard() {
        let session_abilities = vec!["*".to_string()];

        assert!(has_ability(&session_abilities, "tasks:read"));
        assert!(has_ability(&session_abilities, "tasks:write"));
        assert!(has_ability(&session_abilities, "anything"));
    }

    #[test]
    fn test_has_ability_empty() {
        let empty: Vec<String> = vec![];

        assert!(!has_ability(&empty, "tasks:read"));
        assert!(!has_ability(&empty, "anything"));
    }

    #[test]
    fn test_generate_random_string() {
        let s1 = generate_random_string(40);
        let s2 = generate_random_string(40);

        assert_eq!(s1.len(), 40);
        assert_eq!(s2.len(), 40);
        assert_ne!(s1, s2); // Should be random

        // Should be alphanumeric
        assert!(s1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(s2.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_full_token_workflow() {
        // Generate token
        let (plaintext, hash) = generate_token();

        // Validate format
        assert!(validate_token_format(&plaintext));

        // Hash lookup key is stable
        assert_eq!(hash_token(&plaintext), hash);

        // A different token hashes elsewhere
        let (other, _) = generate_token();
        assert_ne!(hash_token(&other), hash);
    }
}
