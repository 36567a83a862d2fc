use thiserror::Error;

/// Error type for session token operations.
///
/// The three validation failures are all rejected identically by callers,
/// but stay distinguishable for logging.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
