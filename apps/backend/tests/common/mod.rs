//! Common test utilities and fixtures for integration tests.
//!
//! Every context runs against its own in-memory store, snapshotting only when
//! a test hands it a temp file, so tests need no external services.

pub mod fixtures;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::Router;

use quiz_backend::db::Database;
use quiz_backend::models::{ResetToken, Role, SearchResult, User};
use quiz_backend::services::auth::hash_password;
use quiz_backend::services::notify::ResetNotifier;
use quiz_backend::services::search::{ProviderError, SearchProvider, SearchService};
use quiz_backend::{build_router, AppState};
use quiz_core::NormalizedQuery;

pub const TEST_PASSWORD: &str = "password1";

/// Notifier that keeps issued tokens for inspection.
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
}

impl CapturingNotifier {
    /// Most recent token sent to `user_id`.
    pub fn last_token_for(&self, user_id: i64) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| *id == user_id)
            .map(|(_, token)| token.clone())
    }

    /// Every token sent to `user_id`, oldest first.
    pub fn tokens_for(&self, user_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, token)| token.clone())
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl ResetNotifier for CapturingNotifier {
    fn send_reset(&self, user: &User, token: &ResetToken) {
        self.sent
            .lock()
            .unwrap()
            .push((user.id, token.token.clone()));
    }
}

/// Search provider double with a call counter.
pub struct StubProvider {
    name: &'static str,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn new(name: &'static str, fail: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            name,
            fail,
            calls: calls.clone(),
        };
        (provider, calls)
    }
}

#[async_trait]
impl SearchProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, query: &NormalizedQuery) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Transport("connection refused".to_string()));
        }
        Ok(vec![SearchResult {
            title: format!("About {}", query.as_str()),
            snippet: "stub".to_string(),
            url: format!("https://{}.example/1", self.name),
            source: self.name.to_string(),
        }])
    }
}

/// Test context holding the store, the notifier, and the router.
pub struct TestContext {
    pub db: Arc<Database>,
    pub notifier: Arc<CapturingNotifier>,
    app: Router,
}

impl TestContext {
    /// Context with no search providers configured.
    pub fn new() -> Self {
        Self::with_providers(Vec::new())
    }

    pub fn with_providers(providers: Vec<Box<dyn SearchProvider>>) -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory store");
        Self::with_store(db, providers)
    }

    /// Context whose store snapshots to `path`, seeded with a root admin.
    pub fn with_snapshot_file(path: &Path) -> Self {
        let root = fixtures::new_user("root", Role::Admin, &hash_password(TEST_PASSWORD));
        let db = Database::open(path, &root).expect("Failed to open snapshot-backed store");
        Self::with_store(db, Vec::new())
    }

    fn with_store(db: Database, providers: Vec<Box<dyn SearchProvider>>) -> Self {
        let db = Arc::new(db);
        let notifier = Arc::new(CapturingNotifier::default());
        let search = SearchService::new(db.clone(), providers, Duration::from_secs(3600));

        let state = AppState {
            db: db.clone(),
            search: Arc::new(search),
            notifier: notifier.clone(),
            session_ttl: Duration::from_secs(3600),
            reset_token_ttl: Duration::from_secs(600),
        };

        Self {
            db,
            notifier,
            app: build_router(state),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Insert a user with [`TEST_PASSWORD`] and return it with a session token.
    pub fn create_user(&self, username: &str, role: Role) -> (User, String) {
        let user = self
            .db
            .create_user(&fixtures::new_user(username, role, &hash_password(TEST_PASSWORD)))
            .expect("Failed to create test user");
        let session = self
            .db
            .create_session(user.id, 3_600_000)
            .expect("Failed to create test session");
        (user, session.token)
    }

    pub fn create_admin(&self) -> (User, String) {
        self.create_user("admin", Role::Admin)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }
}
