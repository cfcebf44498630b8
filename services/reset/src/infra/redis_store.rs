use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use deadpool_redis::redis::{AsyncCommands, RedisError, Script, cmd};

use crate::domain::repository::ResetRecordStore;
use crate::domain::types::{ResetRecord, StoredRecord};
use crate::error::ResetError;

/// Keys outlive the record's own expiry by this much so that the lazy check
/// on read, not Redis eviction, decides when a record is expired.
const EXPIRY_GRACE_MS: i64 = 60_000;

/// Compare-and-set in one server-side step. Empty ARGV[1] means "expect
/// absent", empty ARGV[2] means "delete".
const COMPARE_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '' then
    if current then return 0 end
elseif current ~= ARGV[1] then
    return 0
end
if ARGV[2] == '' then
    redis.call('DEL', KEYS[1])
else
    redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
end
return 1
"#;

static COMPARE_AND_SET_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(COMPARE_AND_SET));

/// Record store shared across instances through Redis.
#[derive(Clone)]
pub struct RedisResetStore {
    pub pool: Pool,
}

impl RedisResetStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, ResetError> {
        self.pool
            .get()
            .await
            .map_err(|e| ResetError::Internal(e.into()))
    }
}

fn record_key(identifier: &str) -> String {
    format!("password_reset:{identifier}")
}

fn encode(record: &ResetRecord) -> Result<String, ResetError> {
    serde_json::to_string(&StoredRecord::from(record)).map_err(|e| ResetError::Internal(e.into()))
}

fn decode(raw: &str) -> Result<ResetRecord, ResetError> {
    let stored: StoredRecord =
        serde_json::from_str(raw).map_err(|e| ResetError::Internal(e.into()))?;
    Ok(stored.into())
}

fn ttl_ms(record: &ResetRecord) -> u64 {
    let remaining = (record.expires_at() - Utc::now()).num_milliseconds();
    (remaining.max(0) + EXPIRY_GRACE_MS) as u64
}

impl ResetRecordStore for RedisResetStore {
    async fn get(&self, identifier: &str) -> Result<Option<ResetRecord>, ResetError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(record_key(identifier))
            .await
            .map_err(|e: RedisError| ResetError::Internal(e.into()))?;
        raw.as_deref().map(decode).transpose()
    }

    async fn put(&self, record: &ResetRecord) -> Result<(), ResetError> {
        let mut conn = self.conn().await?;
        let value = encode(record)?;
        let (): () = conn
            .pset_ex(record_key(record.identifier()), value, ttl_ms(record))
            .await
            .map_err(|e: RedisError| ResetError::Internal(e.into()))?;
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), ResetError> {
        let mut conn = self.conn().await?;
        let (): () = conn
            .del(record_key(identifier))
            .await
            .map_err(|e: RedisError| ResetError::Internal(e.into()))?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        identifier: &str,
        expected: Option<&ResetRecord>,
        new: Option<&ResetRecord>,
    ) -> Result<bool, ResetError> {
        let expected = expected.map(encode).transpose()?.unwrap_or_default();
        let (value, ttl) = match new {
            Some(record) => (encode(record)?, ttl_ms(record)),
            None => (String::new(), 0),
        };
        let mut conn = self.conn().await?;
        let applied: i64 = COMPARE_AND_SET_SCRIPT
            .key(record_key(identifier))
            .arg(expected)
            .arg(value)
            .arg(ttl)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| ResetError::Internal(e.into()))?;
        Ok(applied == 1)
    }

    /// Keys carry their own PX expiry, so there is nothing to sweep.
    async fn sweep_expired(&self, _now: DateTime<Utc>) -> Result<usize, ResetError> {
        Ok(0)
    }

    async fn ping(&self) -> Result<(), ResetError> {
        let mut conn = self.conn().await?;
        let _pong: String = cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ResetError::Internal(e.into()))?;
        Ok(())
    }
}
