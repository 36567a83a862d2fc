//! One-time email-verification tokens.
//!
//! Tokens are opaque 256-bit random strings, hex-encoded. The entropy makes
//! collisions negligible, so uniqueness is not enforced in storage. Consuming
//! a token is a persistence concern (row-level compare-and-clear) and lives
//! with the identity repository.

use rand::rngs::OsRng;
use rand::RngCore;

/// Raw entropy per token: 256 bits.
const TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random verification token.
///
/// # Returns
/// 64-character lowercase hex string
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the verification link embedded in the verification email.
///
/// The verification endpoint parses the identity id and token back out of
/// the path, so the shape here and the route definition must agree.
///
/// # Arguments
/// * `base_url` - Public base URL of the service (trailing slash tolerated)
/// * `identity_id` - Id of the unverified identity
/// * `token` - Verification token stored on that identity
pub fn build_link(base_url: &str, identity_id: &str, token: &str) -> String {
    format!(
        "{}/api/users/verify-email/{}/{}",
        base_url.trim_end_matches('/'),
        identity_id,
        token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let token = generate_token();

        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_build_link() {
        let link = build_link("http://localhost:8080", "42", "deadbeef");
        assert_eq!(link, "http://localhost:8080/api/users/verify-email/42/deadbeef");
    }

    #[test]
    fn test_build_link_trims_trailing_slash() {
        let link = build_link("http://localhost:8080/", "42", "deadbeef");
        assert_eq!(link, "http://localhost:8080/api/users/verify-email/42/deadbeef");
    }
}
