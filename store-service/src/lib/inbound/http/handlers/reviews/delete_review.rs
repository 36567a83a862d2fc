use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use crate::domain::policy::IdentityContext;
use crate::domain::review::models::ReviewId;
use crate::domain::review::ports::ReviewServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(review_id): Path<String>,
) -> Result<ApiSuccess<DeleteReviewResponseData>, ApiError> {
    let review_id = ReviewId::from_string(&review_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .review_service
        .delete_review(&identity, &review_id)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                DeleteReviewResponseData {
                    message: "Review has been deleted".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReviewResponseData {
    pub message: String,
}
