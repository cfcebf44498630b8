use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::repository::ResetRecordStore;
use crate::domain::types::ResetRecord;
use crate::error::ResetError;
use crate::infra::memory::MemoryResetStore;
use crate::infra::redis_store::RedisResetStore;

/// Which record store backs the service. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redis,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown store `{other}` (expected memory or redis)")),
        }
    }
}

/// Store selected at startup; dispatches to the concrete backend.
#[derive(Clone)]
pub enum StoreBackend {
    Memory(MemoryResetStore),
    Redis(RedisResetStore),
}

impl StoreBackend {
    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Memory(_) => StoreKind::Memory,
            Self::Redis(_) => StoreKind::Redis,
        }
    }
}

impl ResetRecordStore for StoreBackend {
    async fn get(&self, identifier: &str) -> Result<Option<ResetRecord>, ResetError> {
        match self {
            Self::Memory(s) => s.get(identifier).await,
            Self::Redis(s) => s.get(identifier).await,
        }
    }

    async fn put(&self, record: &ResetRecord) -> Result<(), ResetError> {
        match self {
            Self::Memory(s) => s.put(record).await,
            Self::Redis(s) => s.put(record).await,
        }
    }

    async fn delete(&self, identifier: &str) -> Result<(), ResetError> {
        match self {
            Self::Memory(s) => s.delete(identifier).await,
            Self::Redis(s) => s.delete(identifier).await,
        }
    }

    async fn compare_and_set(
        &self,
        identifier: &str,
        expected: Option<&ResetRecord>,
        new: Option<&ResetRecord>,
    ) -> Result<bool, ResetError> {
        match self {
            Self::Memory(s) => s.compare_and_set(identifier, expected, new).await,
            Self::Redis(s) => s.compare_and_set(identifier, expected, new).await,
        }
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, ResetError> {
        match self {
            Self::Memory(s) => s.sweep_expired(now).await,
            Self::Redis(s) => s.sweep_expired(now).await,
        }
    }

    async fn ping(&self) -> Result<(), ResetError> {
        match self {
            Self::Memory(s) => s.ping().await,
            Self::Redis(s) => s.ping().await,
        }
    }
}
