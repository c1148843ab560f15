use std::future::Future;

use tracing::{Instrument, Span, info_span};
use uuid::Uuid;

use crate::domain::types::User;
use crate::error::AuthServiceError;
use crate::usecase::auth::{Auth, LoginInput, RegisterInput, ResetPasswordInput};

/// Wraps an [`Auth`] implementation and runs every operation inside its own
/// span, recording the error kind on failure. Results pass through untouched.
pub struct Traced<A> {
    inner: A,
}

impl<A: Auth> Traced<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

async fn observe<T, F>(span: Span, fut: F) -> Result<T, AuthServiceError>
where
    F: Future<Output = Result<T, AuthServiceError>>,
{
    let result = fut.instrument(span.clone()).await;
    span.in_scope(|| match &result {
        Ok(_) => tracing::debug!("ok"),
        Err(e) => {
            span.record("error.kind", e.kind());
            tracing::warn!(kind = e.kind(), "failed");
        }
    });
    result
}

impl<A: Auth> Auth for Traced<A> {
    async fn register(&self, input: RegisterInput) -> Result<Uuid, AuthServiceError> {
        let span = info_span!("auth", op = "register", email = %input.email, error.kind = tracing::field::Empty);
        observe(span, self.inner.register(input)).await
    }

    async fn login(&self, input: LoginInput) -> Result<String, AuthServiceError> {
        let span = info_span!("auth", op = "login", email = %input.email, error.kind = tracing::field::Empty);
        observe(span, self.inner.login(input)).await
    }

    async fn request_verification(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        let span = info_span!("auth", op = "request_verification", %user_id, error.kind = tracing::field::Empty);
        observe(span, self.inner.request_verification(user_id)).await
    }

    async fn confirm_verification(&self, code: &str) -> Result<(), AuthServiceError> {
        let span = info_span!("auth", op = "confirm_verification", error.kind = tracing::field::Empty);
        observe(span, self.inner.confirm_verification(code)).await
    }

    async fn forgot_password(&self, user_id: Uuid) -> Result<(), AuthServiceError> {
        let span = info_span!("auth", op = "forgot_password", %user_id, error.kind = tracing::field::Empty);
        observe(span, self.inner.forgot_password(user_id)).await
    }

    async fn verify_reset_code(&self, code: &str) -> Result<(), AuthServiceError> {
        let span = info_span!("auth", op = "verify_reset_code", error.kind = tracing::field::Empty);
        observe(span, self.inner.verify_reset_code(code)).await
    }

    async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        let span = info_span!("auth", op = "reset_password", user_id = %input.user_id, error.kind = tracing::field::Empty);
        observe(span, self.inner.reset_password(input)).await
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<User, AuthServiceError> {
        let span = info_span!("auth", op = "get_profile", %user_id, error.kind = tracing::field::Empty);
        observe(span, self.inner.get_profile(user_id)).await
    }
}
