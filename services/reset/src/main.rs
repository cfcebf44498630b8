use anyhow::Context;
use tracing::{info, warn};

use reclaim_core::shutdown::shutdown_signal;
use reclaim_core::tracing::init_tracing;
use reclaim_reset::config::ResetConfig;
use reclaim_reset::infra::accounts::HttpAccountService;
use reclaim_reset::infra::clock::SystemClock;
use reclaim_reset::infra::delivery::{Notifier, spawn_delivery_worker};
use reclaim_reset::infra::memory::MemoryResetStore;
use reclaim_reset::infra::redis_store::RedisResetStore;
use reclaim_reset::infra::store::{StoreBackend, StoreKind};
use reclaim_reset::infra::sweep::spawn_sweeper;
use reclaim_reset::router::build_router;
use reclaim_reset::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ResetConfig::from_env()?;
    init_tracing(config.log_format);

    let store = match config.store {
        StoreKind::Memory => {
            warn!("memory record store: pending resets are lost on restart");
            StoreBackend::Memory(MemoryResetStore::new())
        }
        StoreKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL must be set when RESET_STORE=redis")?;
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("failed to create Redis pool")?;
            StoreBackend::Redis(RedisResetStore::new(pool))
        }
    };

    // Redis expires keys itself.
    if store.kind() == StoreKind::Memory {
        spawn_sweeper(store.clone(), SystemClock, config.sweep_interval);
    }

    let notifier = match config.notifier_url.as_deref() {
        Some(url) => Notifier::webhook(url).context("invalid NOTIFIER_URL")?,
        None => {
            warn!("NOTIFIER_URL not set, reset codes will not leave this process");
            Notifier::Log
        }
    };
    let (delivery, _worker) = spawn_delivery_worker(notifier, config.delivery_queue_capacity);

    let accounts =
        HttpAccountService::new(&config.accounts_url).context("invalid ACCOUNTS_URL")?;

    if config.debug_echo_code {
        warn!("RESET_DEBUG_ECHO_CODE is on: challenge responses carry the code");
    }

    let state = AppState {
        store,
        accounts,
        delivery,
        debug_echo_code: config.debug_echo_code,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.reset_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(store = ?config.store, "reset service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
