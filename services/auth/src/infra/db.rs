use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr, sea_query::Expr,
};
use uuid::Uuid;

use yata_auth_schema::{users, verification_codes};

use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::types::{CodePurpose, NewUser, User, VerificationCode};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<Uuid, AuthServiceError> {
        let now = Utc::now();
        let id = Uuid::now_v7();
        users::ActiveModel {
            id: Set(id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(classify_insert_error)?;
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update password hash")?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsVerified, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("mark user verified")?;
        Ok(result.rows_affected > 0)
    }
}

/// `email` is the only unique column besides the generated primary key.
fn classify_insert_error(err: DbErr) -> AuthServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AuthServiceError::EmailExists,
        _ => anyhow::Error::new(err).context("insert user").into(),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        is_verified: model.is_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Verification code repository ─────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        verification_codes::ActiveModel {
            code: Set(code.code),
            user_id: Set(code.user_id),
            purpose: Set(code.purpose.as_str().to_owned()),
            expires_at: Set(code.expires_at),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert verification code")?;
        Ok(())
    }

    async fn find_by_code(&self, code: Uuid) -> Result<Option<VerificationCode>, AuthServiceError> {
        let model = verification_codes::Entity::find_by_id(code)
            .one(&self.db)
            .await
            .context("find verification code")?;
        model.map(code_from_model).transpose()
    }

    async fn delete_for_user(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError> {
        let result = verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .exec(&self.db)
            .await
            .context("delete verification codes")?;
        Ok(result.rows_affected)
    }
}

fn code_from_model(model: verification_codes::Model) -> Result<VerificationCode, AuthServiceError> {
    Ok(VerificationCode {
        code: model.code,
        user_id: model.user_id,
        purpose: model.purpose.parse()?,
        expires_at: model.expires_at,
    })
}
