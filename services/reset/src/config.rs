use std::time::Duration;

use anyhow::anyhow;

use reclaim_core::config::{flag, optional, parse_or, required};
use reclaim_core::tracing::LogFormat;

use crate::infra::store::StoreKind;

/// Reset service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ResetConfig {
    /// TCP port to listen on (default 3114). Env var: `RESET_PORT`.
    pub reset_port: u16,
    /// Record store backend (default memory). Env var: `RESET_STORE`.
    pub store: StoreKind,
    /// Redis connection URL, required for the redis store. Env var: `REDIS_URL`.
    pub redis_url: Option<String>,
    /// Accounts service base URL (directory + credential store). Env var: `ACCOUNTS_URL`.
    pub accounts_url: String,
    /// Notification webhook; codes go to a log sink when unset. Env var: `NOTIFIER_URL`.
    pub notifier_url: Option<String>,
    /// Return the issued code in the challenge response. Development only.
    /// Env var: `RESET_DEBUG_ECHO_CODE`.
    pub debug_echo_code: bool,
    /// Interval of the expired-record sweep (default 60s). Env var:
    /// `RESET_SWEEP_INTERVAL_SECS`.
    pub sweep_interval: Duration,
    /// Pending deliveries held before new codes are dropped (default 1024).
    /// Env var: `DELIVERY_QUEUE_CAPACITY`.
    pub delivery_queue_capacity: usize,
    /// `json` or `pretty`. Env var: `LOG_FORMAT`.
    pub log_format: LogFormat,
}

impl ResetConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = parse_or("RESET_STORE", StoreKind::Memory)?;
        let redis_url = optional("REDIS_URL");
        if store == StoreKind::Redis && redis_url.is_none() {
            return Err(anyhow!("REDIS_URL must be set when RESET_STORE=redis"));
        }
        let sweep_secs: u64 = parse_or("RESET_SWEEP_INTERVAL_SECS", 60)?;
        if sweep_secs == 0 {
            return Err(anyhow!("RESET_SWEEP_INTERVAL_SECS must be positive"));
        }

        Ok(Self {
            reset_port: parse_or("RESET_PORT", 3114)?,
            store,
            redis_url,
            accounts_url: required("ACCOUNTS_URL")?,
            notifier_url: optional("NOTIFIER_URL"),
            debug_echo_code: flag("RESET_DEBUG_ECHO_CODE")?,
            sweep_interval: Duration::from_secs(sweep_secs),
            delivery_queue_capacity: parse_or("DELIVERY_QUEUE_CAPACITY", 1024)?,
            log_format: parse_or("LOG_FORMAT", LogFormat::Json)?,
        })
    }
}
