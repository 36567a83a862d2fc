use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::product::models::ProductId;
use crate::domain::review::models::Rating;
use crate::domain::review::models::Review;
use crate::domain::review::models::ReviewId;
use crate::domain::review::models::ReviewPage;
use crate::domain::review::ports::ReviewRepository;
use crate::domain::user::models::UserId;
use crate::review::errors::ReviewError;

pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn review_from_row(row: &PgRow) -> Result<Review, ReviewError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;
    let product_id: Uuid = row
        .try_get("product_id")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;
    let user_id: Uuid = row
        .try_get("user_id")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;
    let rating: i32 = row
        .try_get("rating")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;
    let comment: String = row
        .try_get("comment")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

    Ok(Review {
        id: ReviewId(id),
        product_id: ProductId(product_id),
        user_id: UserId(user_id),
        rating: Rating::new(rating)?,
        comment,
        created_at,
    })
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    async fn create(&self, review: Review) -> Result<Review, ReviewError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, product_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(review.id.0)
        .bind(review.product_id.0)
        .bind(review.user_id.0)
        .bind(review.rating.value())
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        Ok(review)
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewError> {
        let row = sqlx::query(
            "SELECT id, product_id, user_id, rating, comment, created_at FROM reviews WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        row.as_ref().map(review_from_row).transpose()
    }

    async fn list(&self, page: ReviewPage) -> Result<Vec<Review>, ReviewError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, user_id, rating, comment, created_at
            FROM reviews
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.per_page))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        rows.iter().map(review_from_row).collect()
    }

    async fn update(&self, review: Review) -> Result<Review, ReviewError> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET rating = $2, comment = $3
            WHERE id = $1
            "#,
        )
        .bind(review.id.0)
        .bind(review.rating.value())
        .bind(&review.comment)
        .execute(&self.pool)
        .await
        .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::NotFound(review.id.to_string()));
        }

        Ok(review)
    }

    async fn delete(&self, id: &ReviewId) -> Result<(), ReviewError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
