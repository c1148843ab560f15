use anyhow::Context as _;
use deadpool_redis::Pool as RedisPool;
use deadpool_redis::redis;
use sea_orm::DatabaseConnection;
use yata_auth_types::password::PasswordHasher;
use yata_auth_types::token::TokenService;

use crate::infra::amqp::AmqpEmailPublisher;
use crate::infra::cache::RedisUserCache;
use crate::infra::db::{DbUserRepository, DbVerificationCodeRepository};
use crate::instrument::Traced;
use crate::router::Readiness;
use crate::usecase::auth::{AuthService, AuthSettings};

/// The production [`Auth`](crate::usecase::auth::Auth) stack.
pub type AppAuth = Traced<
    AuthService<DbUserRepository, DbVerificationCodeRepository, RedisUserCache, AmqpEmailPublisher>,
>;

/// Shared application state held by the gRPC server.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub publisher: AmqpEmailPublisher,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub settings: AuthSettings,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_cache(&self) -> RedisUserCache {
        RedisUserCache {
            pool: self.redis.clone(),
        }
    }

    pub fn auth_service(&self) -> AppAuth {
        Traced::new(AuthService::new(
            self.user_repo(),
            self.code_repo(),
            self.user_cache(),
            self.publisher.clone(),
            self.tokens.clone(),
            self.hasher.clone(),
            self.settings.clone(),
        ))
    }
}

impl Readiness for AppState {
    async fn check(&self) -> anyhow::Result<()> {
        self.db.ping().await.context("ping postgres")?;

        let mut conn = self.redis.get().await.context("get redis connection")?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("ping redis")?;

        self.publisher.ensure_connected().await
    }
}
