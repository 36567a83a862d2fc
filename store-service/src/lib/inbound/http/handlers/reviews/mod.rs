use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::review::models::Review;

pub mod create_review;
pub mod delete_review;
pub mod list_reviews;
pub mod update_review;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewData {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewData {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            product_id: review.product_id.to_string(),
            user_id: review.user_id.to_string(),
            rating: review.rating.value(),
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}
