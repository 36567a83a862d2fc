//! Identity and access-control primitives
//!
//! Provides the security building blocks shared by the storefront service:
//! - Password hashing (Argon2id)
//! - Session token issuing and validation (JWT, HS256)
//! - One-time email-verification tokens
//!
//! The service defines its own domain ports and adapts these implementations,
//! which keeps this crate free of persistence and transport concerns.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("guess", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", 24);
//! let token = issuer.issue("user123", "admin").unwrap();
//! let claims = issuer.validate(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert_eq!(claims.role, "admin");
//! ```
//!
//! ## Verification Tokens
//! ```
//! use auth::verification;
//!
//! let token = verification::generate_token();
//! let link = verification::build_link("http://localhost:8080", "42", &token);
//! assert!(link.ends_with(&token));
//! ```

pub mod password;
pub mod token;
pub mod verification;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::SessionClaims;
pub use token::TokenError;
pub use token::TokenIssuer;
