use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims embedded in a session token.
///
/// The token is the full authentication state: there is no server-side
/// session store. A token is valid iff its signature verifies and `exp`
/// has not passed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the identity id of the authenticated user
    pub sub: String,

    /// Role granted at issue time
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for an authenticated identity with a fixed lifetime.
    ///
    /// # Arguments
    /// * `identity_id` - Unique identifier of the authenticated user
    /// * `role` - Role string carried into every authorization decision
    /// * `ttl_hours` - Hours until the token expires
    pub fn new(identity_id: impl ToString, role: impl ToString, ttl_hours: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(ttl_hours);

        Self {
            sub: identity_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = SessionClaims::new("user123", "admin", 24);

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }
}
