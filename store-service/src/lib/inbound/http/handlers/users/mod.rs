use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::User;

pub mod current_user;
pub mod delete_user;
pub mod list_users;
pub mod login;
pub mod register;
pub mod update_user;
pub mod verify_email;

/// User representation returned by the API. Credential material and the
/// verification token never leave the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_image: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
            profile_image: user.profile_image.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}
