use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ReviewData;
use crate::domain::policy::IdentityContext;
use crate::domain::product::models::ProductId;
use crate::domain::review::models::CreateReviewCommand;
use crate::domain::review::models::Rating;
use crate::domain::review::ports::ReviewServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::review::errors::ReviewError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateReviewRequest {
    rating: i32,
    comment: String,
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(product_id): Path<String>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<ApiSuccess<ReviewData>, ApiError> {
    let product_id = ProductId::from_string(&product_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let command = CreateReviewCommand {
        rating: Rating::new(body.rating).map_err(ReviewError::from)?,
        comment: body.comment,
    };

    state
        .review_service
        .create_review(&identity, &product_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref review| ApiSuccess::new(StatusCode::CREATED, review.into()))
}
