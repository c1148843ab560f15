use uuid::Uuid;

use yata_auth::domain::types::CodePurpose;
use yata_auth::error::AuthServiceError;
use yata_auth::usecase::auth::Auth;

use crate::helpers::{EMAIL_ENDPOINT, fixture_with, test_user};

#[tokio::test]
async fn should_store_code_and_publish_callback_link() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);

    f.auth.request_verification(user.id).await.unwrap();

    let pending = f.codes.pending(user.id, CodePurpose::Email);
    assert_eq!(pending.len(), 1, "expected exactly one pending code");
    assert!(pending[0].expires_at > chrono::Utc::now());

    let notifications = f.publisher.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].purpose, CodePurpose::Email);
    assert_eq!(notifications[0].recipient, user.email);
    assert_eq!(
        notifications[0].callback_url,
        format!("{EMAIL_ENDPOINT}?code={}", pending[0].code)
    );
}

#[tokio::test]
async fn should_replace_pending_code_on_second_request() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);

    f.auth.request_verification(user.id).await.unwrap();
    let first = f.publisher.last_code();
    f.auth.request_verification(user.id).await.unwrap();
    let second = f.publisher.last_code();

    assert_ne!(first, second);
    let pending = f.codes.pending(user.id, CodePurpose::Email);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].code.to_string(), second);
}

#[tokio::test]
async fn should_confirm_once_and_then_reject_consumed_code() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.auth.request_verification(user.id).await.unwrap();
    let code = f.publisher.last_code();

    let wrong = f.auth.confirm_verification(&Uuid::new_v4().to_string()).await;
    assert!(
        matches!(
            wrong,
            Err(AuthServiceError::CodeLookupFailed | AuthServiceError::CodeInvalid)
        ),
        "expected a code failure, got {wrong:?}"
    );

    f.auth.confirm_verification(&code).await.unwrap();
    assert!(f.users.get(user.id).unwrap().is_verified);
    assert!(f.codes.pending(user.id, CodePurpose::Email).is_empty());

    let again = f.auth.confirm_verification(&code).await;
    assert!(
        matches!(again, Err(AuthServiceError::CodeLookupFailed)),
        "expected CodeLookupFailed, got {again:?}"
    );
}

#[tokio::test]
async fn should_refuse_code_for_already_verified_user() {
    let mut user = test_user("pw1");
    user.is_verified = true;
    let f = fixture_with(vec![user.clone()]);

    let result = f.auth.request_verification(user.id).await;

    assert!(
        matches!(result, Err(AuthServiceError::AlreadyVerified)),
        "expected AlreadyVerified, got {result:?}"
    );
    assert!(f.codes.pending(user.id, CodePurpose::Email).is_empty());
    assert!(f.publisher.notifications().is_empty());
}

#[tokio::test]
async fn should_reject_expired_code_and_leave_user_unverified() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.auth.request_verification(user.id).await.unwrap();
    let code = f.publisher.last_code();
    f.codes.expire_all();

    let result = f.auth.confirm_verification(&code).await;

    assert!(
        matches!(result, Err(AuthServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
    assert!(!f.users.get(user.id).unwrap().is_verified);
    assert_eq!(
        f.codes.pending(user.id, CodePurpose::Email).len(),
        1,
        "expired code stays in place"
    );
}

#[tokio::test]
async fn should_reject_unparsable_code_as_lookup_failure() {
    let f = fixture_with(vec![test_user("pw1")]);

    let result = f.auth.confirm_verification("not-a-code").await;

    assert!(
        matches!(result, Err(AuthServiceError::CodeLookupFailed)),
        "expected CodeLookupFailed, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_non_canonical_spelling_of_code() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.auth.request_verification(user.id).await.unwrap();
    let code = f.publisher.last_code().to_uppercase();

    let result = f.auth.confirm_verification(&code).await;

    assert!(
        matches!(result, Err(AuthServiceError::CodeInvalid)),
        "expected CodeInvalid, got {result:?}"
    );
    assert!(!f.users.get(user.id).unwrap().is_verified);
}

#[tokio::test]
async fn should_not_confirm_email_with_password_code() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.auth.forgot_password(user.id).await.unwrap();
    let code = f.publisher.last_code();

    let result = f.auth.confirm_verification(&code).await;

    assert!(
        matches!(result, Err(AuthServiceError::CodeInvalid)),
        "expected CodeInvalid, got {result:?}"
    );
    assert!(!f.users.get(user.id).unwrap().is_verified);
}

#[tokio::test]
async fn should_reflect_verification_despite_warm_cache() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);

    let before = f.auth.get_profile(user.id).await.unwrap();
    assert!(!before.is_verified);

    f.auth.request_verification(user.id).await.unwrap();
    let code = f.publisher.last_code();
    f.auth.confirm_verification(&code).await.unwrap();
    assert!(!f.cache.contains(user.id), "confirmation must drop the cached user");

    let after = f.auth.get_profile(user.id).await.unwrap();
    assert!(after.is_verified);
}

#[tokio::test]
async fn should_surface_publish_failure() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.publisher.set_failing(true);

    let result = f.auth.request_verification(user.id).await;

    assert!(
        matches!(result, Err(AuthServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_when_requesting_for_unknown_user() {
    let f = fixture_with(vec![]);

    let result = f.auth.request_verification(Uuid::now_v7()).await;

    assert!(
        matches!(result, Err(AuthServiceError::NotFound)),
        "expected NotFound, got {result:?}"
    );
    assert!(f.publisher.notifications().is_empty());
}

#[tokio::test]
async fn should_keep_confirmation_when_cache_invalidation_fails() {
    let user = test_user("pw1");
    let f = fixture_with(vec![user.clone()]);
    f.auth.request_verification(user.id).await.unwrap();
    let code = f.publisher.last_code();
    f.cache.set_failing(true);

    let result = f.auth.confirm_verification(&code).await;

    assert!(
        matches!(result, Err(AuthServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert!(
        f.users.get(user.id).unwrap().is_verified,
        "durable write happens before invalidation"
    );
    assert!(f.codes.pending(user.id, CodePurpose::Email).is_empty());

    let retry = f.auth.confirm_verification(&code).await;
    assert!(
        matches!(retry, Err(AuthServiceError::CodeLookupFailed)),
        "expected CodeLookupFailed, got {retry:?}"
    );
}
