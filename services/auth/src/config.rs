use serde::Deserialize;
use yata_auth_types::password::PasswordHasher;
use yata_auth_types::token::TokenService;
use yata_core::config::Config;

use crate::domain::types::{DEFAULT_CODE_TTL_MINUTES, DEFAULT_TOKEN_TTL_HOURS};
use crate::infra::amqp::BrokerSettings;
use crate::usecase::auth::AuthSettings;

/// Auth service configuration loaded from environment variables.
///
/// No `Debug`: the struct carries the signing secret and the password salt.
#[derive(Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// RabbitMQ connection URL.
    pub amqp_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    pub password_salt: String,
    /// Base URL of the email-confirmation page; the code is appended as `?code=`.
    pub email_endpoint: String,
    /// Base URL of the password-reset page.
    pub password_reset_endpoint: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    /// Port for health probes.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Deadline applied to every gRPC call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_email_exchange")]
    pub email_exchange: String,
    #[serde(default = "default_email_queue")]
    pub email_queue: String,
    #[serde(default = "default_email_binding_key")]
    pub email_binding_key: String,
}

fn default_token_ttl_hours() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

fn default_code_ttl_minutes() -> i64 {
    DEFAULT_CODE_TTL_MINUTES
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_http_port() -> u16 {
    3112
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_email_exchange() -> String {
    "emails".to_owned()
}

fn default_email_queue() -> String {
    "email_queue".to_owned()
}

fn default_email_binding_key() -> String {
    "email".to_owned()
}

impl Config for AuthConfig {}

impl AuthConfig {
    pub fn token_service(&self) -> TokenService {
        TokenService::new(self.jwt_secret.clone(), self.token_ttl_hours)
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.password_salt.clone())
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            email_endpoint: self.email_endpoint.clone(),
            password_reset_endpoint: self.password_reset_endpoint.clone(),
            code_ttl: chrono::Duration::minutes(self.code_ttl_minutes),
        }
    }

    pub fn broker_settings(&self) -> BrokerSettings {
        BrokerSettings {
            exchange: self.email_exchange.clone(),
            queue: self.email_queue.clone(),
            binding_key: self.email_binding_key.clone(),
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
