use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ReviewData;
use crate::domain::review::models::ReviewPage;
use crate::domain::review::ports::ReviewServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    page_number: Option<u32>,
    review_per_page: Option<u32>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<ApiSuccess<Vec<ReviewData>>, ApiError> {
    let page = ReviewPage {
        page_number: query.page_number.unwrap_or(1),
        per_page: query.review_per_page.unwrap_or(10),
    };

    state
        .review_service
        .list_reviews(page)
        .await
        .map_err(ApiError::from)
        .map(|reviews| {
            ApiSuccess::new(
                StatusCode::OK,
                reviews.iter().map(ReviewData::from).collect(),
            )
        })
}
