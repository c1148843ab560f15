#![allow(async_fn_in_trait)]

use chrono::Duration;
use uuid::Uuid;
use yata_auth_types::password::PasswordHasher;
use yata_auth_types::token::TokenService;

use crate::domain::repository::{
    NotificationPublisher, UserCache, UserRepository, VerificationCodeRepository,
};
use crate::domain::types::{CodePurpose, NewUser, User};
use crate::error::AuthServiceError;
use crate::usecase::lookup::CachedUserLookup;
use crate::usecase::verification::VerificationCodes;

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct ResetPasswordInput {
    pub user_id: Uuid,
    pub password: String,
    pub password_confirm: String,
    pub code: String,
}

/// Operations exposed to the transport layer.
pub trait Auth: Send + Sync {
    async fn register(&self, input: RegisterInput) -> Result<Uuid, AuthServiceError>;

    async fn login(&self, input: LoginInput) -> Result<String, AuthServiceError>;

    /// Mail an email-confirmation link.
    async fn request_verification(&self, user_id: Uuid) -> Result<(), AuthServiceError>;

    /// Consume an email-confirmation code and mark its owner verified.
    async fn confirm_verification(&self, code: &str) -> Result<(), AuthServiceError>;

    /// Mail a password-reset link.
    async fn forgot_password(&self, user_id: Uuid) -> Result<(), AuthServiceError>;

    /// Check a password-reset code without consuming it.
    async fn verify_reset_code(&self, code: &str) -> Result<(), AuthServiceError>;

    async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<User, AuthServiceError>;
}

/// Callback endpoints and code lifetime.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub email_endpoint: String,
    pub password_reset_endpoint: String,
    pub code_ttl: Duration,
}

/// Orchestrates hashing, tokens, the cached user read path and verification
/// codes across Postgres, Redis and the mail broker.
///
/// Every user mutation drops the cached copy before returning. If that delete
/// fails the call returns `Internal`, but the durable write and the code
/// consumption have already happened: retrying with the same code yields
/// `CodeLookupFailed`.
pub struct AuthService<U, V, C, P> {
    pub users: U,
    pub cache: C,
    pub codes: VerificationCodes<V, P>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub email_endpoint: String,
    pub password_reset_endpoint: String,
}

impl<U, V, C, P> AuthService<U, V, C, P>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    C: UserCache,
    P: NotificationPublisher,
{
    pub fn new(
        users: U,
        codes: V,
        cache: C,
        publisher: P,
        tokens: TokenService,
        hasher: PasswordHasher,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            cache,
            codes: VerificationCodes {
                codes,
                publisher,
                code_ttl: settings.code_ttl,
            },
            tokens,
            hasher,
            email_endpoint: settings.email_endpoint,
            password_reset_endpoint: settings.password_reset_endpoint,
        }
    }

    fn lookup(&self) -> CachedUserLookup<'_, U, C> {
        CachedUserLookup {
            users: &self.users,
            cache: &self.cache,
        }
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        self.cache.delete(user_id).await
    }
}

impl<U, V, C, P> Auth for AuthService<U, V, C, P>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    C: UserCache,
    P: NotificationPublisher,
{
    async fn register(&self, input: RegisterInput) -> Result<Uuid, AuthServiceError> {
        let user = NewUser {
            username: input.username,
            email: input.email,
            password_hash: self.hasher.hash(&input.password),
        };
        self.users.insert(&user).await
    }

    async fn login(&self, input: LoginInput) -> Result<String, AuthServiceError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !self.hasher.verify(&input.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        Ok(self.tokens.issue(user.id)?)
    }

    async fn request_verification(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        let user = self.lookup().get_by_id(user_id).await?;
        if user.is_verified {
            return Err(AuthServiceError::AlreadyVerified);
        }
        self.codes
            .issue(&user, CodePurpose::Email, &self.email_endpoint)
            .await?;
        Ok(())
    }

    async fn confirm_verification(&self, code: &str) -> Result<(), AuthServiceError> {
        let code = self.codes.check(code, CodePurpose::Email).await?;

        if !self.users.mark_verified(code.user_id).await? {
            return Err(AuthServiceError::NotFound);
        }
        self.codes.consume(&code).await?;
        self.invalidate(code.user_id).await
    }

    async fn forgot_password(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        let user = self.lookup().get_by_id(user_id).await?;
        self.codes
            .issue(&user, CodePurpose::Password, &self.password_reset_endpoint)
            .await?;
        Ok(())
    }

    async fn verify_reset_code(&self, code: &str) -> Result<(), AuthServiceError> {
        self.codes.check(code, CodePurpose::Password).await?;
        Ok(())
    }

    async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        if input.password != input.password_confirm {
            return Err(AuthServiceError::PasswordMismatch);
        }

        // The code is checked before anything is written.
        let code = self.codes.check(&input.code, CodePurpose::Password).await?;
        if code.user_id != input.user_id {
            return Err(AuthServiceError::CodeInvalid);
        }

        let digest = self.hasher.hash(&input.password);
        if !self.users.update_password_hash(input.user_id, &digest).await? {
            return Err(AuthServiceError::NotFound);
        }
        self.codes.consume(&code).await?;
        self.invalidate(input.user_id).await
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<User, AuthServiceError> {
        self.lookup().get_by_id(user_id).await
    }
}
