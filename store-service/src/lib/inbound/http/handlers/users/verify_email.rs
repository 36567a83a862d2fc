use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::domain::user::models::UserId;
use crate::domain::user::models::VerifyEmailOutcome;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn verify_email(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
) -> Result<ApiSuccess<VerifyEmailResponseData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    let outcome = state
        .user_service
        .verify_email(&user_id, &token)
        .await
        .map_err(ApiError::from)?;

    let message = match outcome {
        VerifyEmailOutcome::Verified => "your email has been verified, you can now log in",
        VerifyEmailOutcome::AlreadyVerified => "your email is already verified",
    };

    Ok(ApiSuccess::new(
        StatusCode::OK,
        VerifyEmailResponseData {
            message: message.to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEmailResponseData {
    pub message: String,
}
