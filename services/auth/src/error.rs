use tonic::{Code, Status};

/// Auth service error taxonomy. Every failing operation yields exactly one of
/// these; the gRPC layer maps them to status codes via `From<AuthServiceError>`.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("email already exists")]
    EmailExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not found")]
    NotFound,
    #[error("code is expired")]
    CodeExpired,
    #[error("code is invalid")]
    CodeInvalid,
    #[error("error getting code")]
    CodeLookupFailed,
    #[error("user already verified")]
    AlreadyVerified,
    #[error("password mismatch")]
    PasswordMismatch,
    /// A presented token failed validation. No orchestrator operation parses
    /// tokens; this is for callers that validate them through `TokenService`.
    #[error("invalid token")]
    InvalidToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmailExists => "EMAIL_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound => "NOT_FOUND",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::CodeInvalid => "CODE_INVALID",
            Self::CodeLookupFailed => "CODE_LOOKUP_FAILED",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn code(&self) -> Code {
        match self {
            Self::NotFound | Self::CodeLookupFailed => Code::NotFound,
            Self::InvalidCredentials | Self::InvalidToken => Code::Unauthenticated,
            Self::EmailExists | Self::AlreadyVerified => Code::AlreadyExists,
            Self::PasswordMismatch | Self::CodeInvalid => Code::InvalidArgument,
            Self::CodeExpired => Code::DeadlineExceeded,
            Self::Internal(_) => Code::Internal,
        }
    }
}

impl From<yata_auth_types::token::TokenError> for AuthServiceError {
    fn from(err: yata_auth_types::token::TokenError) -> Self {
        use yata_auth_types::token::TokenError;
        match err {
            TokenError::Signing(e) => Self::Internal(anyhow::Error::new(e).context("sign token")),
            TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed => {
                Self::InvalidToken
            }
        }
    }
}

impl From<AuthServiceError> for Status {
    fn from(err: AuthServiceError) -> Self {
        // Internal errors carry the anyhow chain; log it here and send only the
        // generic message to the client.
        if let AuthServiceError::Internal(ref e) = err {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        Status::new(err.code(), err.to_string())
    }
}
