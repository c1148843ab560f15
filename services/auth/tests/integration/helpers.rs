use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use yata_auth::domain::repository::{
    NotificationPublisher, UserCache, UserRepository, VerificationCodeRepository,
};
use yata_auth::domain::types::{CodePurpose, EmailNotification, NewUser, User, VerificationCode};
use yata_auth::error::AuthServiceError;
use yata_auth::usecase::auth::{AuthService, AuthSettings};
use yata_auth_types::password::PasswordHasher;
use yata_auth_types::token::TokenService;

pub const JWT_SECRET: &str = "integration-secret";
pub const PASSWORD_SALT: &str = "integration-salt";
pub const EMAIL_ENDPOINT: &str = "https://example.com/verify";
pub const PASSWORD_RESET_ENDPOINT: &str = "https://example.com/reset";

fn unavailable(what: &str) -> AuthServiceError {
    AuthServiceError::Internal(anyhow::anyhow!("{what} unavailable"))
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub find_by_id_calls: Arc<AtomicUsize>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            find_by_id_calls: Arc::default(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn find_by_id_count(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }
}

impl UserRepository for MockUserRepo {
    async fn insert(&self, user: &NewUser) -> Result<Uuid, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::EmailExists);
        }
        let now = Utc::now();
        let id = Uuid::now_v7();
        users.push(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_owned();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_verified = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCodeRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
}

impl MockCodeRepo {
    pub fn pending(&self, user_id: Uuid, purpose: CodePurpose) -> Vec<VerificationCode> {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id && c.purpose == purpose)
            .cloned()
            .collect()
    }

    /// Push the expiry of every stored code into the past.
    pub fn expire_all(&self) {
        for code in self.codes.lock().unwrap().iter_mut() {
            code.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

impl VerificationCodeRepository for MockCodeRepo {
    async fn insert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn find_by_code(
        &self,
        code: Uuid,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn delete_for_user(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !(c.user_id == user_id && c.purpose == purpose));
        Ok((before - codes.len()) as u64)
    }
}

// ── MockUserCache ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserCache {
    pub entries: Arc<Mutex<HashMap<Uuid, User>>>,
    /// When set, every read and write fails.
    pub failing: Arc<AtomicBool>,
}

impl MockUserCache {
    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AuthServiceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("cache"));
        }
        Ok(())
    }
}

impl UserCache for MockUserCache {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(&id).cloned())
    }

    async fn set(&self, user: &User) -> Result<(), AuthServiceError> {
        self.check()?;
        self.entries.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AuthServiceError> {
        self.check()?;
        self.entries.lock().unwrap().remove(&id);
        Ok(())
    }
}

// ── MockPublisher ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPublisher {
    pub payloads: Arc<Mutex<Vec<Vec<u8>>>>,
    pub failing: Arc<AtomicBool>,
}

impl MockPublisher {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<EmailNotification> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }

    /// The code embedded in the most recent notification's callback URL.
    pub fn last_code(&self) -> String {
        let notification = self.notifications().pop().expect("no notification published");
        notification
            .callback_url
            .split_once("?code=")
            .expect("callback url without code")
            .1
            .to_owned()
    }
}

impl NotificationPublisher for MockPublisher {
    async fn publish(&self, payload: &[u8]) -> Result<(), AuthServiceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("broker"));
        }
        self.payloads.lock().unwrap().push(payload.to_vec());
        Ok(())
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────────

pub type TestAuth = AuthService<MockUserRepo, MockCodeRepo, MockUserCache, MockPublisher>;

/// An orchestrator over in-memory ports plus handles to each of them.
pub struct Fixture {
    pub auth: TestAuth,
    pub users: MockUserRepo,
    pub codes: MockCodeRepo,
    pub cache: MockUserCache,
    pub publisher: MockPublisher,
}

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(PASSWORD_SALT)
}

pub fn tokens() -> TokenService {
    TokenService::new(JWT_SECRET, 1)
}

pub fn fixture_with(users: Vec<User>) -> Fixture {
    let users = MockUserRepo::new(users);
    let codes = MockCodeRepo::default();
    let cache = MockUserCache::default();
    let publisher = MockPublisher::default();

    let auth = AuthService::new(
        users.clone(),
        codes.clone(),
        cache.clone(),
        publisher.clone(),
        tokens(),
        hasher(),
        AuthSettings {
            email_endpoint: EMAIL_ENDPOINT.to_owned(),
            password_reset_endpoint: PASSWORD_RESET_ENDPOINT.to_owned(),
            code_ttl: Duration::minutes(60),
        },
    );

    Fixture {
        auth,
        users,
        codes,
        cache,
        publisher,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(vec![])
}

pub fn test_user(password: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        username: "alice".to_owned(),
        email: "a@x.com".to_owned(),
        password_hash: hasher().hash(password),
        is_verified: false,
        created_at: now,
        updated_at: now,
    }
}
