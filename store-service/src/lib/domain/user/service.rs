use std::sync::Arc;

use async_trait::async_trait;
use auth::verification;
use auth::TokenIssuer;
use chrono::Utc;

use crate::domain::policy;
use crate::domain::policy::IdentityContext;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::VerifyEmailOutcome;
use crate::user::errors::UserError;
use crate::user::ports::Mailer;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service for identity, credentials, and the verification lifecycle.
///
/// Orchestrates the password hasher, token issuer, and verification token
/// manager over the repository and mailer ports.
pub struct UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    repository: Arc<UR>,
    mailer: Arc<M>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: auth::PasswordHasher,
    base_url: String,
}

impl<UR, M> UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `mailer` - Outbound mail dispatch implementation
    /// * `token_issuer` - Session token issuer, configured with the signing secret
    /// * `base_url` - Public base URL used when building verification links
    pub fn new(
        repository: Arc<UR>,
        mailer: Arc<M>,
        token_issuer: Arc<TokenIssuer>,
        base_url: String,
    ) -> Self {
        Self {
            repository,
            mailer,
            token_issuer,
            password_hasher: auth::PasswordHasher::new(),
            base_url,
        }
    }

    async fn send_verification_mail(&self, user: &User, token: &str) -> Result<(), UserError> {
        let link = verification::build_link(&self.base_url, &user.id.to_string(), token);

        self.mailer
            .send_verification(user.email.as_str(), &link)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %user.id, "Verification mail dispatch failed: {}", e);
                UserError::DeliveryFailure
            })
    }
}

#[async_trait]
impl<UR, M> UserServicePort for UserService<UR, M>
where
    UR: UserRepository,
    M: Mailer,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        if let Some(existing) = self.repository.find_by_email(command.email.as_str()).await? {
            return Err(UserError::EmailAlreadyExists(
                existing.email.as_str().to_string(),
            ));
        }

        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| UserError::PasswordHashing(e.to_string()))?;

        let verification_token = verification::generate_token();

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            role: Role::NormalUser,
            profile_image: None,
            verification_token: Some(verification_token.clone()),
            is_verified: false,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered, verification pending");

        // The user row is already committed; a failed dispatch surfaces to
        // the caller but is recoverable by logging in again.
        self.send_verification_mail(&created_user, &verification_token)
            .await?;

        Ok(created_user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, UserError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.password_hasher.verify(password, &user.password_hash) {
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_verified {
            // Lazily issue a token if an earlier dispatch never stored one
            let token = match &user.verification_token {
                Some(token) => token.clone(),
                None => {
                    self.repository
                        .set_verification_token_if_absent(&user.id, &verification::generate_token())
                        .await?
                }
            };

            self.send_verification_mail(&user, &token).await?;
            tracing::info!(user_id = %user.id, "Unverified login, verification mail re-sent");

            return Ok(LoginOutcome::VerificationRequired);
        }

        let access_token = self
            .token_issuer
            .issue(&user.id.to_string(), user.role.as_str())
            .map_err(|e| UserError::TokenSigning(e.to_string()))?;

        if let Err(e) = self.mailer.send_login_notice(user.email.as_str()).await {
            tracing::warn!(user_id = %user.id, "Login notice dispatch failed: {}", e);
        }

        Ok(LoginOutcome::Authenticated { access_token })
    }

    async fn verify_email(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<VerifyEmailOutcome, UserError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if user.is_verified {
            return Ok(VerifyEmailOutcome::AlreadyVerified);
        }

        if user.verification_token.is_none() {
            return Err(UserError::NoPendingVerification);
        }

        // Compare-and-clear in the repository; only one concurrent caller
        // can observe the transition.
        if self.repository.consume_verification_token(id, token).await? {
            tracing::info!(user_id = %id, "Email verified");
            return Ok(VerifyEmailOutcome::Verified);
        }

        // The guarded update did not fire: either the token was wrong, or a
        // concurrent call consumed it first. Re-read to tell them apart.
        match self.repository.find_by_id(id).await? {
            Some(user) if user.is_verified => Err(UserError::NoPendingVerification),
            Some(_) => Err(UserError::TokenMismatch),
            None => Err(UserError::NotFound(id.to_string())),
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self
                .password_hasher
                .hash(&new_password)
                .map_err(|e| UserError::PasswordHashing(e.to_string()))?;
        }

        self.repository.update(user).await
    }

    async fn delete_user(&self, actor: &IdentityContext, id: &UserId) -> Result<(), UserError> {
        let target = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if !policy::can_mutate(actor, &target.id) {
            return Err(UserError::Forbidden);
        }

        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, actor_id = %actor.id, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Username;
    use crate::user::errors::MailError;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn set_verification_token_if_absent(&self, id: &UserId, token: &str) -> Result<String, UserError>;
            async fn consume_verification_token(&self, id: &UserId, token: &str) -> Result<bool, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    mock! {
        pub TestMailer {}

        #[async_trait]
        impl Mailer for TestMailer {
            async fn send_verification(&self, to: &str, link: &str) -> Result<(), MailError>;
            async fn send_login_notice(&self, to: &str) -> Result<(), MailError>;
        }
    }

    fn service(
        repository: MockTestUserRepository,
        mailer: MockTestMailer,
    ) -> UserService<MockTestUserRepository, MockTestMailer> {
        UserService::new(
            Arc::new(repository),
            Arc::new(mailer),
            Arc::new(TokenIssuer::new(SECRET, 24)),
            "http://localhost:8080".to_string(),
        )
    }

    fn existing_user(email: &str, password: &str, verified: bool) -> User {
        let hasher = auth::PasswordHasher::new();
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: hasher.hash(password).unwrap(),
            role: Role::NormalUser,
            profile_image: None,
            verification_token: if verified {
                None
            } else {
                Some("a".repeat(64))
            },
            is_verified: verified,
            created_at: Utc::now(),
        }
    }

    fn register_command(email: &str) -> RegisterUserCommand {
        RegisterUserCommand::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            "secret1".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create()
            .withf(|user| {
                !user.is_verified
                    && user.role == Role::NormalUser
                    && user.password_hash.starts_with("$argon2")
                    && user
                        .verification_token
                        .as_deref()
                        .is_some_and(|t| t.len() == 64)
            })
            .times(1)
            .returning(|user| Ok(user));

        mailer
            .expect_send_verification()
            .withf(|to, link| to == "a@x.com" && link.contains("/api/users/verify-email/"))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, mailer);
        let user = service.register(register_command("a@x.com")).await.unwrap();

        assert!(!user.is_verified);
        assert!(user.verification_token.is_some());
        // Plaintext never stored
        assert_ne!(user.password_hash, "secret1");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_user("a@x.com", "secret1", true))));
        repository.expect_create().times(0);
        mailer.expect_send_verification().times(0);

        let service = service(repository, mailer);
        let result = service.register(register_command("a@x.com")).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_mail_failure_keeps_user() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        // The user must still be created even though dispatch fails
        repository
            .expect_create()
            .times(1)
            .returning(|user| Ok(user));

        mailer
            .expect_send_verification()
            .times(1)
            .returning(|_, _| Err(MailError::DeliveryFailed("smtp down".to_string())));

        let service = service(repository, mailer);
        let result = service.register(register_command("a@x.com")).await;

        assert!(matches!(result, Err(UserError::DeliveryFailure)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, mailer);
        let result = service.login("nobody@x.com", "secret1").await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_same_error_as_unknown_email() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_user("a@x.com", "secret1", true))));

        let service = service(repository, mailer);
        let result = service.login("a@x.com", "wrong").await;

        // Indistinguishable from the unknown-email failure
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unverified_resends_mail_without_token() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", false);
        let stored_token = user.verification_token.clone().unwrap();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let expected_token = stored_token.clone();
        mailer
            .expect_send_verification()
            .withf(move |to, link| to == "a@x.com" && link.ends_with(&expected_token))
            .times(1)
            .returning(|_, _| Ok(()));
        mailer.expect_send_login_notice().times(0);

        let service = service(repository, mailer);
        let outcome = service.login("a@x.com", "secret1").await.unwrap();

        assert_eq!(outcome, LoginOutcome::VerificationRequired);
    }

    #[tokio::test]
    async fn test_login_unverified_lazily_issues_token() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        let mut user = existing_user("a@x.com", "secret1", false);
        user.verification_token = None;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_set_verification_token_if_absent()
            .withf(|_, token| token.len() == 64)
            .times(1)
            .returning(|_, token| Ok(token.to_string()));

        mailer
            .expect_send_verification()
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, mailer);
        let outcome = service.login("a@x.com", "secret1").await.unwrap();

        assert_eq!(outcome, LoginOutcome::VerificationRequired);
    }

    #[tokio::test]
    async fn test_login_verified_issues_session_token() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        mailer
            .expect_send_login_notice()
            .with(eq("a@x.com"))
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository, mailer);
        let outcome = service.login("a@x.com", "secret1").await.unwrap();

        let LoginOutcome::Authenticated { access_token } = outcome else {
            panic!("expected a session token");
        };

        // Claims round-trip through a fresh issuer with the same secret
        let claims = TokenIssuer::new(SECRET, 24).validate(&access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "normal_user");
    }

    #[tokio::test]
    async fn test_login_notice_failure_does_not_fail_login() {
        let mut repository = MockTestUserRepository::new();
        let mut mailer = MockTestMailer::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_user("a@x.com", "secret1", true))));

        mailer
            .expect_send_login_notice()
            .times(1)
            .returning(|_| Err(MailError::DeliveryFailed("smtp down".to_string())));

        let service = service(repository, mailer);
        let outcome = service.login("a@x.com", "secret1").await.unwrap();

        assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
    }

    #[tokio::test]
    async fn test_verify_email_success() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", false);
        let user_id = user.id;
        let token = user.verification_token.clone().unwrap();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let expected_token = token.clone();
        repository
            .expect_consume_verification_token()
            .withf(move |id, t| *id == user_id && t == expected_token)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = service(repository, mailer);
        let outcome = service.verify_email(&user_id, &token).await.unwrap();

        assert_eq!(outcome, VerifyEmailOutcome::Verified);
    }

    #[tokio::test]
    async fn test_verify_email_already_verified_is_noop() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_consume_verification_token().times(0);

        let service = service(repository, mailer);
        let outcome = service.verify_email(&user_id, "whatever").await.unwrap();

        assert_eq!(outcome, VerifyEmailOutcome::AlreadyVerified);
    }

    #[tokio::test]
    async fn test_verify_email_wrong_token() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", false);
        let user_id = user.id;

        // First read for the pre-check, second for the post-failure re-read;
        // state is unchanged in between.
        repository
            .expect_find_by_id()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_consume_verification_token()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = service(repository, mailer);
        let result = service.verify_email(&user_id, "wrong_token").await;

        assert!(matches!(result, Err(UserError::TokenMismatch)));
    }

    #[tokio::test]
    async fn test_verify_email_no_pending_token() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let mut user = existing_user("a@x.com", "secret1", false);
        user.verification_token = None;
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_consume_verification_token().times(0);

        let service = service(repository, mailer);
        let result = service.verify_email(&user_id, "anything").await;

        assert!(matches!(result, Err(UserError::NoPendingVerification)));
    }

    #[tokio::test]
    async fn test_verify_email_lost_race_reports_no_pending() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let pending = existing_user("a@x.com", "secret1", false);
        let user_id = pending.id;
        let token = pending.verification_token.clone().unwrap();

        let mut verified = pending.clone();
        verified.is_verified = true;
        verified.verification_token = None;

        // Pending on the first read, already consumed by the time the
        // compare-and-clear runs
        let mut reads = vec![Ok(Some(verified)), Ok(Some(pending))];
        repository
            .expect_find_by_id()
            .times(2)
            .returning(move |_| reads.pop().unwrap());
        repository
            .expect_consume_verification_token()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = service(repository, mailer);
        let result = service.verify_email(&user_id, &token).await;

        assert!(matches!(result, Err(UserError::NoPendingVerification)));
    }

    #[tokio::test]
    async fn test_verify_email_unknown_user() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, mailer);
        let result = service.verify_email(&UserId::new(), "token").await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_profile_rehashes_password() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;
        let old_hash = user.password_hash.clone();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let old_hash_check = old_hash.clone();
        repository
            .expect_update()
            .withf(move |user| {
                user.username.as_str() == "bob" && user.password_hash != old_hash_check
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository, mailer);
        let command = UpdateProfileCommand {
            username: Some(Username::new("bob".to_string()).unwrap()),
            password: Some("secret2".to_string()),
        };

        let updated = service.update_profile(&user_id, command).await.unwrap();
        assert!(auth::PasswordHasher::new().verify("secret2", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_delete_user_as_self() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_delete()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(repository, mailer);
        let actor = IdentityContext::new(user_id, Role::NormalUser);

        assert!(service.delete_user(&actor, &user_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_as_admin() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_delete().times(1).returning(|_| Ok(()));

        let service = service(repository, mailer);
        let actor = IdentityContext::new(UserId::new(), Role::Admin);

        assert!(service.delete_user(&actor, &user_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_forbidden_for_other_normal_user() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        let user = existing_user("a@x.com", "secret1", true);
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository.expect_delete().times(0);

        let service = service(repository, mailer);
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);

        let result = service.delete_user(&actor, &user_id).await;
        assert!(matches!(result, Err(UserError::Forbidden)));
    }

    #[tokio::test]
    async fn test_delete_user_not_found_before_ownership() {
        let mut repository = MockTestUserRepository::new();
        let mailer = MockTestMailer::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_delete().times(0);

        let service = service(repository, mailer);
        let actor = IdentityContext::new(UserId::new(), Role::NormalUser);

        let result = service.delete_user(&actor, &UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
