use async_trait::async_trait;

use crate::domain::policy::IdentityContext;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::VerifyEmailOutcome;
use crate::user::errors::MailError;
use crate::user::errors::UserError;

/// Port for identity and credential operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// The created user starts unverified, with a stored verification token
    /// and a verification mail on its way. No session token is returned.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DeliveryFailure` - User was created but the verification mail
    ///   could not be dispatched (re-triggered by logging in)
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Authenticate by email and password.
    ///
    /// Verified users receive a session token. Unverified users get the
    /// verification mail re-sent (issuing a token first if none is stored)
    /// and `VerificationRequired` back, never a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, same error
    ///   either way
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, UserError>;

    /// Consume a verification token from an emailed link.
    ///
    /// At most one concurrent call observes the unverified -> verified
    /// transition; competing calls fail with `NoPendingVerification`.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `NoPendingVerification` - Pending user without a stored token, or
    ///   the token was consumed concurrently
    /// * `TokenMismatch` - Supplied token differs from the stored one
    async fn verify_email(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<VerifyEmailOutcome, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update the calling user's own username and/or password.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError>;

    /// Hard-delete a user record.
    ///
    /// Permitted for the user themselves or an admin.
    ///
    /// # Errors
    /// * `NotFound` - Target user does not exist
    /// * `Forbidden` - Actor is neither the target nor an admin
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, actor: &IdentityContext, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier, `None` if absent.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by exact email address, `None` if absent.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Store a verification token on a user that has none.
    ///
    /// Guarded so a concurrent login cannot clobber a token that was just
    /// issued: the write only happens while the stored token is NULL.
    ///
    /// # Returns
    /// The token now stored on the row (the supplied one, or the
    /// pre-existing one if the guard did not fire)
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_verification_token_if_absent(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<String, UserError>;

    /// Atomically consume a verification token: set `is_verified`, clear the
    /// token, but only while the row still holds exactly `token` and is not
    /// yet verified.
    ///
    /// # Returns
    /// True if this call performed the transition
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn consume_verification_token(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<bool, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Outbound mail dispatch, fire-and-forget from the domain's perspective.
///
/// Transport mechanics live behind this port; the domain only cares whether
/// the dispatch was accepted.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send the account-verification mail containing `link`.
    ///
    /// # Errors
    /// * `DeliveryFailed` - Transport rejected the dispatch
    async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError>;

    /// Send the post-login notification mail.
    ///
    /// # Errors
    /// * `DeliveryFailed` - Transport rejected the dispatch
    async fn send_login_notice(&self, to: &str) -> Result<(), MailError>;
}
