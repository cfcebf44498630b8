use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::repository::{Clock, ResetRecordStore};
use crate::infra::clock::SystemClock;
use crate::infra::store::StoreBackend;

/// Periodically drop abandoned challenges and tokens to bound memory.
/// Expiry is still checked on every read, so a missed sweep only costs memory.
pub fn spawn_sweeper(store: StoreBackend, clock: SystemClock, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.sweep_expired(clock.now()).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "swept expired reset records"),
                Err(e) => warn!(error = ?e, "reset record sweep failed"),
            }
        }
    })
}
