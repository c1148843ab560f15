use uuid::Uuid;

use crate::domain::repository::{UserCache, UserRepository};
use crate::domain::types::User;
use crate::error::AuthServiceError;

/// Cache-aside read path for users.
///
/// Redis is consulted first; on a miss or a cache failure the user is read from
/// Postgres and written back. Cache failures are logged and never fail the read.
pub struct CachedUserLookup<'a, U, C> {
    pub users: &'a U,
    pub cache: &'a C,
}

impl<U, C> CachedUserLookup<'_, U, C>
where
    U: UserRepository,
    C: UserCache,
{
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<User, AuthServiceError> {
        match self.cache.get(user_id).await {
            Ok(Some(user)) => return Ok(user),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, %user_id, "user cache read failed"),
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if let Err(e) = self.cache.set(&user).await {
            tracing::warn!(error = ?e, %user_id, "user cache write failed");
        }

        Ok(user)
    }
}
