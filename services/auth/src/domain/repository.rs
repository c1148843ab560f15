#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{CodePurpose, NewUser, User, VerificationCode};
use crate::error::AuthServiceError;

/// Durable user store. Every lookup distinguishes "absent" (`None` / `false`)
/// from failure (`Err`).
pub trait UserRepository: Send + Sync {
    /// Insert a user and return its id. A duplicate email yields
    /// [`AuthServiceError::EmailExists`].
    async fn insert(&self, user: &NewUser) -> Result<Uuid, AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Replace the password digest and bump `updated_at`. Returns `false` if
    /// no such user exists.
    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError>;

    /// Set `is_verified` and bump `updated_at`. Returns `false` if no such
    /// user exists.
    async fn mark_verified(&self, id: Uuid) -> Result<bool, AuthServiceError>;
}

/// Durable store for verification codes.
pub trait VerificationCodeRepository: Send + Sync {
    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError>;

    async fn find_by_code(&self, code: Uuid) -> Result<Option<VerificationCode>, AuthServiceError>;

    /// Delete every code of `purpose` owned by `user_id`. Returns the number
    /// of rows removed.
    async fn delete_for_user(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError>;
}

/// Fast, disposable copy of user records keyed by id.
pub trait UserCache: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    async fn set(&self, user: &User) -> Result<(), AuthServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError>;
}

/// Out-of-band delivery of serialized notifications (at most once).
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, payload: &[u8]) -> Result<(), AuthServiceError>;
}
