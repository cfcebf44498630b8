use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Duration, TimeZone, Utc};

use reclaim_reset::domain::repository::{
    AccountDirectory, Clock, CodeDelivery, CredentialStore, ResetRecordStore,
};
use reclaim_reset::domain::types::{CredentialUpdate, ResetRecord};
use reclaim_reset::error::ResetError;
use reclaim_reset::infra::memory::MemoryResetStore;

pub const EMAIL: &str = "a@x.com";
pub const NEW_PASSWORD: &str = "longenough1";

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

// ── ManualClock ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── MockAccountDirectory ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAccountDirectory {
    pub known: HashSet<String>,
}

impl MockAccountDirectory {
    pub fn with(identifiers: &[&str]) -> Self {
        Self {
            known: identifiers.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AccountDirectory for MockAccountDirectory {
    async fn exists(&self, identifier: &str) -> Result<bool, ResetError> {
        Ok(self.known.contains(identifier))
    }
}

// ── MockCredentialStore ──────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    Accept,
    UnknownAccount,
    Fail,
}

#[derive(Clone)]
pub struct MockCredentialStore {
    pub mode: CredentialMode,
    pub writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockCredentialStore {
    pub fn new(mode: CredentialMode) -> Self {
        Self {
            mode,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn accepting() -> Self {
        Self::new(CredentialMode::Accept)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl CredentialStore for MockCredentialStore {
    async fn set_credential(
        &self,
        identifier: &str,
        credential: &str,
    ) -> Result<CredentialUpdate, ResetError> {
        match self.mode {
            CredentialMode::Accept => {
                self.writes
                    .lock()
                    .unwrap()
                    .push((identifier.to_owned(), credential.to_owned()));
                Ok(CredentialUpdate::Updated)
            }
            CredentialMode::UnknownAccount => Ok(CredentialUpdate::UnknownAccount),
            CredentialMode::Fail => Err(ResetError::DownstreamFailure(anyhow::anyhow!(
                "accounts service unavailable"
            ))),
        }
    }
}

// ── MockDelivery ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDelivery {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockDelivery {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl CodeDelivery for MockDelivery {
    async fn deliver(&self, identifier: &str, code: &str) -> Result<(), ResetError> {
        self.sent
            .lock()
            .unwrap()
            .push((identifier.to_owned(), code.to_owned()));
        Ok(())
    }
}

// ── InterleavingStore ────────────────────────────────────────────────────────

/// Memory store that writes `injected` right after the `after_get`-th read
/// returns, as if another request landed between that read and the caller's
/// next step.
#[derive(Clone)]
pub struct InterleavingStore {
    pub inner: MemoryResetStore,
    injected: ResetRecord,
    after_get: usize,
    gets: Arc<AtomicUsize>,
}

impl InterleavingStore {
    pub fn new(inner: MemoryResetStore, injected: ResetRecord, after_get: usize) -> Self {
        Self {
            inner,
            injected,
            after_get,
            gets: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ResetRecordStore for InterleavingStore {
    async fn get(&self, identifier: &str) -> Result<Option<ResetRecord>, ResetError> {
        let record = self.inner.get(identifier).await?;
        if self.gets.fetch_add(1, Ordering::SeqCst) + 1 == self.after_get {
            self.inner.put(&self.injected).await?;
        }
        Ok(record)
    }

    async fn put(&self, record: &ResetRecord) -> Result<(), ResetError> {
        self.inner.put(record).await
    }

    async fn delete(&self, identifier: &str) -> Result<(), ResetError> {
        self.inner.delete(identifier).await
    }

    async fn compare_and_set(
        &self,
        identifier: &str,
        expected: Option<&ResetRecord>,
        new: Option<&ResetRecord>,
    ) -> Result<bool, ResetError> {
        self.inner.compare_and_set(identifier, expected, new).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, ResetError> {
        self.inner.sweep_expired(now).await
    }

    async fn ping(&self) -> Result<(), ResetError> {
        self.inner.ping().await
    }
}

// ── Fake accounts service ────────────────────────────────────────────────────

/// Serve the accounts internal API on an ephemeral port. `a@x.com` exists;
/// every credential written is recorded.
pub async fn spawn_accounts_service() -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&writes);

    let app = Router::new()
        .route(
            "/internal/accounts/{email}",
            get(|Path(email): Path<String>| async move {
                if email == EMAIL {
                    StatusCode::OK
                } else {
                    StatusCode::NOT_FOUND
                }
            }),
        )
        .route(
            "/internal/accounts/{email}/credential",
            put(
                move |Path(email): Path<String>, Json(body): Json<serde_json::Value>| async move {
                    if email != EMAIL {
                        return StatusCode::NOT_FOUND;
                    }
                    let password = body["password"].as_str().unwrap_or_default().to_owned();
                    recorded.lock().unwrap().push(password);
                    StatusCode::NO_CONTENT
                },
            ),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, writes)
}
