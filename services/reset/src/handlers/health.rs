use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use reclaim_core::health::readiness;

use crate::domain::repository::ResetRecordStore;
use crate::state::AppState;

/// `GET /readyz`: ready when the record store answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let ready = match state.record_store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = ?e, "record store not ready");
            false
        }
    };
    readiness(ready)
}
