use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account record. Postgres owns it; Redis only ever holds a disposable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new user. The id and timestamps are assigned by
/// the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Which workflow a verification code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePurpose {
    Email,
    Password,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl std::fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CodePurpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            other => Err(anyhow::anyhow!("unknown verification code purpose: {other}")),
        }
    }
}

/// Short-lived code mailed to a user. The code value is globally unique and is
/// the lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub code: Uuid,
    pub user_id: Uuid,
    pub purpose: CodePurpose,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Message handed to the mail worker through the broker.
///
/// Field names follow the mail worker's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotification {
    #[serde(rename = "Type")]
    pub purpose: CodePurpose,
    #[serde(rename = "To")]
    pub recipient: String,
    #[serde(rename = "Code")]
    pub callback_url: String,
}

impl EmailNotification {
    pub fn new(purpose: CodePurpose, recipient: &str, endpoint: &str, code: Uuid) -> Self {
        Self {
            purpose,
            recipient: recipient.to_owned(),
            callback_url: format!("{endpoint}?code={code}"),
        }
    }
}

/// Redis TTL for cached users, in seconds.
pub const USER_CACHE_TTL_SECS: u64 = 3600;

/// Default verification-code lifetime in minutes.
pub const DEFAULT_CODE_TTL_MINUTES: i64 = 60;

/// Default bearer-token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
