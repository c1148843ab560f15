use anyhow::Context as _;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::{NotificationPublisher, VerificationCodeRepository};
use crate::domain::types::{CodePurpose, EmailNotification, User, VerificationCode};
use crate::error::AuthServiceError;

/// Lifecycle of verification codes for one purpose at a time:
/// issue (clear, create, notify), check, consume.
///
/// Clearing and inserting are separate statements, so two concurrent issues for
/// the same user and purpose can leave two pending codes. Either one confirms.
pub struct VerificationCodes<V, P> {
    pub codes: V,
    pub publisher: P,
    pub code_ttl: Duration,
}

impl<V, P> VerificationCodes<V, P>
where
    V: VerificationCodeRepository,
    P: NotificationPublisher,
{
    /// Replace any pending code of `purpose` for `user` and mail a link to it.
    ///
    /// A publish failure is returned to the caller. The stored code stays
    /// valid; the user recovers by requesting again.
    pub async fn issue(
        &self,
        user: &User,
        purpose: CodePurpose,
        endpoint: &str,
    ) -> Result<VerificationCode, AuthServiceError> {
        self.codes.delete_for_user(user.id, purpose).await?;

        let code = VerificationCode {
            code: Uuid::new_v4(),
            user_id: user.id,
            purpose,
            expires_at: Utc::now() + self.code_ttl,
        };
        self.codes.insert(&code).await?;

        let notification = EmailNotification::new(purpose, &user.email, endpoint, code.code);
        let payload = serde_json::to_vec(&notification).context("serialize email notification")?;
        self.publisher.publish(&payload).await?;

        Ok(code)
    }

    /// Validate a presented code for `purpose` without consuming it.
    ///
    /// Expired codes are left in place.
    pub async fn check(
        &self,
        presented: &str,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, AuthServiceError> {
        let id = presented
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::CodeLookupFailed)?;

        let code = self
            .codes
            .find_by_code(id)
            .await?
            .ok_or(AuthServiceError::CodeLookupFailed)?;

        // The lookup already matched on the code; this re-check also rejects
        // non-canonical spellings of it.
        if code.code.to_string() != presented || code.purpose != purpose {
            return Err(AuthServiceError::CodeInvalid);
        }

        if code.is_expired_at(Utc::now()) {
            return Err(AuthServiceError::CodeExpired);
        }

        Ok(code)
    }

    /// Delete the consumed code along with any sibling of the same purpose.
    pub async fn consume(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        self.codes.delete_for_user(code.user_id, code.purpose).await?;
        Ok(())
    }
}
