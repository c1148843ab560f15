use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError};
use uuid::Uuid;

use crate::domain::repository::UserCache;
use crate::domain::types::{USER_CACHE_TTL_SECS, User};
use crate::error::AuthServiceError;

/// JSON-serialized users in Redis under `user:<id>` with a fixed TTL.
#[derive(Clone)]
pub struct RedisUserCache {
    pub pool: Pool,
}

pub fn user_key(id: Uuid) -> String {
    format!("user:{id}")
}

impl UserCache for RedisUserCache {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let bytes: Option<Vec<u8>> = conn
            .get(user_key(id))
            .await
            .map_err(|e: RedisError| AuthServiceError::Internal(e.into()))?;
        bytes
            .map(|b| serde_json::from_slice(&b))
            .transpose()
            .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    async fn set(&self, user: &User) -> Result<(), AuthServiceError> {
        let payload = serde_json::to_vec(user).map_err(|e| AuthServiceError::Internal(e.into()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(user_key(user.id), payload, USER_CACHE_TTL_SECS)
            .await
            .map_err(|e: RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let _removed: u64 = conn
            .del(user_key(id))
            .await
            .map_err(|e: RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }
}
