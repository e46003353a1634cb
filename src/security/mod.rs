//! Stateless security helpers: salted secret hashing and query input checks.
//!
//! Nothing here holds state; the registry applies the input helpers to every
//! query before it reaches an agent.

pub mod input;
pub mod secrets;

pub use input::{require_valid, sanitize_input, validate_input, ValidationError, FORBIDDEN_SEQUENCES};
pub use secrets::{hash_secret, verify_secret, SecretHasher, DEFAULT_ROUNDS, SALT_HEX_LEN};
