use crate::infra::accounts::HttpAccountService;
use crate::infra::clock::SystemClock;
use crate::infra::delivery::QueuedDelivery;
use crate::infra::store::StoreBackend;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreBackend,
    pub accounts: HttpAccountService,
    pub delivery: QueuedDelivery,
    /// Echo issued codes in challenge responses. Never enable in production.
    pub debug_echo_code: bool,
}

impl AppState {
    pub fn record_store(&self) -> StoreBackend {
        self.store.clone()
    }

    pub fn account_directory(&self) -> HttpAccountService {
        self.accounts.clone()
    }

    pub fn credential_store(&self) -> HttpAccountService {
        self.accounts.clone()
    }

    pub fn code_delivery(&self) -> QueuedDelivery {
        self.delivery.clone()
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}
