use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::policy;
use crate::domain::policy::IdentityContext;
use crate::domain::product::models::ProductId;
use crate::domain::product::ports::ProductRepository;
use crate::domain::review::models::CreateReviewCommand;
use crate::domain::review::models::Review;
use crate::domain::review::models::ReviewId;
use crate::domain::review::models::ReviewPage;
use crate::domain::review::models::UpdateReviewCommand;
use crate::review::errors::ReviewError;
use crate::review::ports::ReviewRepository;
use crate::review::ports::ReviewServicePort;

/// Domain service for reviews.
///
/// Creation checks the product exists; update and delete run the shared
/// ownership policy after the review is loaded.
pub struct ReviewService<RR, PR>
where
    RR: ReviewRepository,
    PR: ProductRepository,
{
    repository: Arc<RR>,
    products: Arc<PR>,
}

impl<RR, PR> ReviewService<RR, PR>
where
    RR: ReviewRepository,
    PR: ProductRepository,
{
    pub fn new(repository: Arc<RR>, products: Arc<PR>) -> Self {
        Self {
            repository,
            products,
        }
    }

    async fn get_review(&self, id: &ReviewId) -> Result<Review, ReviewError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ReviewError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<RR, PR> ReviewServicePort for ReviewService<RR, PR>
where
    RR: ReviewRepository,
    PR: ProductRepository,
{
    async fn create_review(
        &self,
        actor: &IdentityContext,
        product_id: &ProductId,
        command: CreateReviewCommand,
    ) -> Result<Review, ReviewError> {
        let product = self
            .products
            .find_by_id(product_id)
            .await
            .map_err(|e| ReviewError::DatabaseError(e.to_string()))?
            .ok_or(ReviewError::ProductNotFound(product_id.to_string()))?;

        let review = Review {
            id: ReviewId::new(),
            product_id: product.id,
            user_id: actor.id,
            rating: command.rating,
            comment: command.comment,
            created_at: Utc::now(),
        };

        let created = self.repository.create(review).await?;
        tracing::info!(review_id = %created.id, product_id = %product.id, "Review created");

        Ok(created)
    }

    async fn list_reviews(&self, page: ReviewPage) -> Result<Vec<Review>, ReviewError> {
        self.repository.list(page).await
    }

    async fn update_review(
        &self,
        actor: &IdentityContext,
        id: &ReviewId,
        command: UpdateReviewCommand,
    ) -> Result<Review, ReviewError> {
        let mut review = self.get_review(id).await?;

        if !policy::can_mutate(actor, &review.user_id) {
            return Err(ReviewError::Forbidden);
        }

        if let Some(rating) = command.rating {
            review.rating = rating;
        }

        if let Some(comment) = command.comment {
            review.comment = comment;
        }

        self.repository.update(review).await
    }

    async fn delete_review(
        &self,
        actor: &IdentityContext,
        id: &ReviewId,
    ) -> Result<(), ReviewError> {
        let review = self.get_review(id).await?;

        if !policy::can_mutate(actor, &review.user_id) {
            return Err(ReviewError::Forbidden);
        }

        self.repository.delete(id).await?;
        tracing::info!(review_id = %id, actor_id = %actor.id, "Review deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::product::models::Product;
    use crate::domain::review::models::Rating;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::UserId;
    use crate::product::errors::ProductError;

    mock! {
        pub TestReviewRepository {}

        #[async_trait]
        impl ReviewRepository for TestReviewRepository {
            async fn create(&self, review: Review) -> Result<Review, ReviewError>;
            async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewError>;
            async fn list(&self, page: ReviewPage) -> Result<Vec<Review>, ReviewError>;
            async fn update(&self, review: Review) -> Result<Review, ReviewError>;
            async fn delete(&self, id: &ReviewId) -> Result<(), ReviewError>;
        }
    }

    mock! {
        pub TestProductRepository {}

        #[async_trait]
        impl ProductRepository for TestProductRepository {
            async fn create(&self, product: Product) -> Result<Product, ProductError>;
            async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductError>;
            async fn list_all(&self) -> Result<Vec<Product>, ProductError>;
            async fn update(&self, product: Product) -> Result<Product, ProductError>;
            async fn delete(&self, id: &ProductId) -> Result<(), ProductError>;
        }
    }

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(),
            title: "Keyboard".to_string(),
            description: "A keyboard".to_string(),
            price: 49.99,
            created_at: Utc::now(),
        }
    }

    fn sample_review(owner: UserId) -> Review {
        Review {
            id: ReviewId::new(),
            product_id: ProductId::new(),
            user_id: owner,
            rating: Rating::new(4).unwrap(),
            comment: "solid".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_review_success() {
        let mut reviews = MockTestReviewRepository::new();
        let mut products = MockTestProductRepository::new();

        let product = sample_product();
        let product_id = product.id;

        products
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(product.clone())));

        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);
        let actor_id = actor.id;

        reviews
            .expect_create()
            .withf(move |review| {
                review.user_id == actor_id
                    && review.product_id == product_id
                    && review.rating.value() == 5
            })
            .times(1)
            .returning(|review| Ok(review));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let command = CreateReviewCommand {
            rating: Rating::new(5).unwrap(),
            comment: "great".to_string(),
        };

        let created = service
            .create_review(&actor, &product_id, command)
            .await
            .unwrap();
        assert_eq!(created.user_id, actor_id);
    }

    #[tokio::test]
    async fn test_create_review_missing_product() {
        let mut reviews = MockTestReviewRepository::new();
        let mut products = MockTestProductRepository::new();

        products
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        reviews.expect_create().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);
        let command = CreateReviewCommand {
            rating: Rating::new(5).unwrap(),
            comment: "great".to_string(),
        };

        let result = service
            .create_review(&actor, &ProductId::new(), command)
            .await;
        assert!(matches!(result, Err(ReviewError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_review_as_owner() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        let owner = UserId::new();
        let review = sample_review(owner);
        let review_id = review.id;

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(review.clone())));
        reviews
            .expect_update()
            .withf(|review| review.rating.value() == 2 && review.comment == "changed my mind")
            .times(1)
            .returning(|review| Ok(review));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(owner, Role::NormalUser);
        let command = UpdateReviewCommand {
            rating: Some(Rating::new(2).unwrap()),
            comment: Some("changed my mind".to_string()),
        };

        assert!(service.update_review(&actor, &review_id, command).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_review_forbidden_for_non_owner() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        let review = sample_review(UserId::new());
        let review_id = review.id;

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(review.clone())));
        reviews.expect_update().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);
        let command = UpdateReviewCommand {
            rating: None,
            comment: Some("drive-by".to_string()),
        };

        let result = service.update_review(&actor, &review_id, command).await;
        assert!(matches!(result, Err(ReviewError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_review_allowed_for_admin() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        let review = sample_review(UserId::new());
        let review_id = review.id;

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(review.clone())));
        reviews
            .expect_update()
            .times(1)
            .returning(|review| Ok(review));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::Admin);
        let command = UpdateReviewCommand {
            rating: None,
            comment: Some("moderated".to_string()),
        };

        assert!(service.update_review(&actor, &review_id, command).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_review_not_found_before_ownership() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        reviews.expect_delete().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);

        let result = service.delete_review(&actor, &ReviewId::new()).await;
        assert!(matches!(result, Err(ReviewError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_review_forbidden_for_non_owner() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        let review = sample_review(UserId::new());
        let review_id = review.id;

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(review.clone())));
        reviews.expect_delete().times(0);

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);

        let result = service.delete_review(&actor, &review_id).await;
        assert!(matches!(result, Err(ReviewError::Forbidden)));
    }

    #[tokio::test]
    async fn test_delete_review_as_admin() {
        let mut reviews = MockTestReviewRepository::new();
        let products = MockTestProductRepository::new();

        let review = sample_review(UserId::new());
        let review_id = review.id;

        reviews
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(review.clone())));
        reviews.expect_delete().times(1).returning(|_| Ok(()));

        let service = ReviewService::new(Arc::new(reviews), Arc::new(products));
        let actor = IdentityContext::new(UserId::new(), Role::Admin);

        assert!(service.delete_review(&actor, &review_id).await.is_ok());
    }
}
