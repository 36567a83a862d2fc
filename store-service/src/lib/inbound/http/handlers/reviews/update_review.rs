use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ReviewData;
use crate::domain::policy::IdentityContext;
use crate::domain::review::models::Rating;
use crate::domain::review::models::ReviewId;
use crate::domain::review::models::UpdateReviewCommand;
use crate::domain::review::ports::ReviewServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::review::errors::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateReviewRequest {
    rating: Option<i32>,
    comment: Option<String>,
}

pub async fn update_review(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(review_id): Path<String>,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<ApiSuccess<ReviewData>, ApiError> {
    let review_id = ReviewId::from_string(&review_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let command = UpdateReviewCommand {
        rating: body
            .rating
            .map(Rating::new)
            .transpose()
            .map_err(ReviewError::from)?,
        comment: body.comment,
    };

    state
        .review_service
        .update_review(&identity, &review_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref review| ApiSuccess::new(StatusCode::OK, review.into()))
}
