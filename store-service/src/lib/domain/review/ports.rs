use async_trait::async_trait;

use crate::domain::policy::IdentityContext;
use crate::domain::product::models::ProductId;
use crate::domain::review::models::CreateReviewCommand;
use crate::domain::review::models::Review;
use crate::domain::review::models::ReviewId;
use crate::domain::review::models::ReviewPage;
use crate::domain::review::models::UpdateReviewCommand;
use crate::review::errors::ReviewError;

/// Port for review domain service operations.
#[async_trait]
pub trait ReviewServicePort: Send + Sync + 'static {
    /// Create a review on a product, owned by the acting identity.
    ///
    /// # Errors
    /// * `ProductNotFound` - Product does not exist
    /// * `DatabaseError` - Database operation failed
    async fn create_review(
        &self,
        actor: &IdentityContext,
        product_id: &ProductId,
        command: CreateReviewCommand,
    ) -> Result<Review, ReviewError>;

    /// List reviews, newest first, one page at a time.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_reviews(&self, page: ReviewPage) -> Result<Vec<Review>, ReviewError>;

    /// Update a review. Gated by the ownership policy (owner or admin).
    ///
    /// # Errors
    /// * `NotFound` - Review does not exist (checked before ownership)
    /// * `Forbidden` - Actor is neither the owner nor an admin
    /// * `DatabaseError` - Database operation failed
    async fn update_review(
        &self,
        actor: &IdentityContext,
        id: &ReviewId,
        command: UpdateReviewCommand,
    ) -> Result<Review, ReviewError>;

    /// Delete a review. Gated by the ownership policy (owner or admin).
    ///
    /// # Errors
    /// * `NotFound` - Review does not exist (checked before ownership)
    /// * `Forbidden` - Actor is neither the owner nor an admin
    /// * `DatabaseError` - Database operation failed
    async fn delete_review(
        &self,
        actor: &IdentityContext,
        id: &ReviewId,
    ) -> Result<(), ReviewError>;
}

/// Persistence operations for reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync + 'static {
    /// Persist new review to storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, review: Review) -> Result<Review, ReviewError>;

    /// Retrieve review by identifier, `None` if absent.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewError>;

    /// Retrieve one page of reviews ordered by creation time descending.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self, page: ReviewPage) -> Result<Vec<Review>, ReviewError>;

    /// Update existing review in storage.
    ///
    /// # Errors
    /// * `NotFound` - Review does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, review: Review) -> Result<Review, ReviewError>;

    /// Remove review from storage.
    ///
    /// # Errors
    /// * `NotFound` - Review does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &ReviewId) -> Result<(), ReviewError>;
}
