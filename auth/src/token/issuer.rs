use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::SessionClaims;
use super::errors::TokenError;

/// Signs and validates bearer session tokens.
///
/// Uses HS256 (HMAC with SHA-256). The secret and token lifetime are
/// injected at construction; nothing here reads process-wide globals.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_hours: i64,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 256 bits for HS256;
    ///   store in environment variables or a vault, never in code)
    /// * `ttl_hours` - Fixed lifetime applied to every issued token
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl_hours,
        }
    }

    /// Issue a signed session token for an authenticated identity.
    ///
    /// # Arguments
    /// * `identity_id` - Subject of the token
    /// * `role` - Role claim carried by the token
    ///
    /// # Returns
    /// JWT string carrying `{sub, role, iat, exp}`
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, identity_id: &str, role: &str) -> Result<String, TokenError> {
        let claims = SessionClaims::new(identity_id, role, self.ttl_hours);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a session token and extract its claims.
    ///
    /// # Arguments
    /// * `token` - Bearer token string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Expired` - The `exp` claim has passed
    /// * `InvalidSignature` - Signature does not match the secret
    /// * `Malformed` - Token could not be parsed
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_validate() {
        let issuer = TokenIssuer::new(SECRET, 24);

        let token = issuer.issue("user123", "admin").expect("Failed to issue");
        assert!(!token.is_empty());

        let claims = issuer.validate(&token).expect("Failed to validate");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_validate_malformed_token() {
        let issuer = TokenIssuer::new(SECRET, 24);

        let result = issuer.validate("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuer1 = TokenIssuer::new(b"secret1_at_least_32_bytes_long_key!", 24);
        let issuer2 = TokenIssuer::new(b"secret2_at_least_32_bytes_long_key!", 24);

        let token = issuer1.issue("user123", "admin").expect("Failed to issue");

        let result = issuer2.validate(&token);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_validate_expired_token() {
        // Negative TTL puts exp in the past
        let issuer = TokenIssuer::new(SECRET, -1);

        let token = issuer.issue("user123", "admin").expect("Failed to issue");

        let result = issuer.validate(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_validate_tampered_token() {
        let issuer = TokenIssuer::new(SECRET, 24);

        let token = issuer.issue("user123", "normal_user").expect("Failed to issue");

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1] = parts[1].replace('a', "b");
        let tampered = parts.join(".");

        assert!(issuer.validate(&tampered).is_err());
    }
}
