use yata_auth::error::AuthServiceError;
use yata_auth::usecase::auth::{Auth, LoginInput};

use crate::helpers::{fixture_with, test_user, tokens};

#[tokio::test]
async fn should_issue_token_bound_to_user() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);

    let token = f
        .auth
        .login(LoginInput {
            email: user.email.clone(),
            password: "pw1".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(tokens().parse(&token).unwrap(), user.id);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);

    let result = f
        .auth
        .login(LoginInput {
            email: user.email,
            password: "pw2".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_distinguish_unknown_email_from_wrong_password() {
    let f = fixture_with(vec![test_user("pw1")]);

    let result = f
        .auth
        .login(LoginInput {
            email: "nobody@x.com".to_owned(),
            password: "pw1".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_classify_foreign_token_as_invalid_token() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    let token = f
        .auth
        .login(LoginInput {
            email: user.email,
            password: "pw1".to_owned(),
        })
        .await
        .unwrap();

    let foreign = yata_auth_types::token::TokenService::new("another-secret", 1);
    let err = AuthServiceError::from(foreign.parse(&token).unwrap_err());

    assert!(
        matches!(err, AuthServiceError::InvalidToken),
        "expected InvalidToken, got {err:?}"
    );
    assert_eq!(err.code(), tonic::Code::Unauthenticated);
}
