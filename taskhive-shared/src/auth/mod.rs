/// Authentication and authorization utilities
///
/// This module provides the auth primitives for Taskhive:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`token`]: Opaque bearer-token generation and hashing
/// - [`guard`]: Ownership and ability checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Bearer Tokens**: Secure random generation with SHA-256 hashing;
///   validity is the existence of the stored row, so revocation is immediate
/// - **Ownership Checks**: Strict owner-id equality on every resource access
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::auth::password::{hash_password, verify_password};
/// use taskhive_shared::auth::token::generate_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Bearer token issuance
/// let (secret, stored_hash) = generate_token();
/// # Ok(())
/// # }
/// ```
pub mod guard;
pub mod password;
pub mod token;
