use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::product::models::ProductId;
use crate::domain::user::models::UserId;
use crate::review::errors::RatingError;
use crate::review::errors::ReviewIdError;

/// Product review entity.
///
/// `user_id` is the owning identity; mutation is gated by the ownership
/// policy (owner or admin).
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReviewId(pub Uuid);

impl ReviewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a review ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ReviewIdError> {
        Uuid::parse_str(s)
            .map(ReviewId)
            .map_err(|e| ReviewIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Star rating value type, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(i32);

impl Rating {
    const MIN: i32 = 1;
    const MAX: i32 = 5;

    /// Create a validated rating.
    ///
    /// # Errors
    /// * `OutOfRange` - Value outside 1..=5
    pub fn new(value: i32) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: value,
            })
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Command to create a new review with domain types.
#[derive(Debug)]
pub struct CreateReviewCommand {
    pub rating: Rating,
    pub comment: String,
}

/// Command to update an existing review; only provided fields change.
#[derive(Debug)]
pub struct UpdateReviewCommand {
    pub rating: Option<Rating>,
    pub comment: Option<String>,
}

/// Page request for the admin review listing. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct ReviewPage {
    pub page_number: u32,
    pub per_page: u32,
}

impl ReviewPage {
    pub fn offset(&self) -> u32 {
        self.per_page * self.page_number.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
    }

    #[test]
    fn test_page_offset() {
        let page = ReviewPage {
            page_number: 3,
            per_page: 10,
        };
        assert_eq!(page.offset(), 20);

        let first = ReviewPage {
            page_number: 1,
            per_page: 10,
        };
        assert_eq!(first.offset(), 0);

        // Page 0 is treated like page 1 rather than underflowing
        let zero = ReviewPage {
            page_number: 0,
            per_page: 10,
        };
        assert_eq!(zero.offset(), 0);
    }
}
