use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ResetError;
use crate::handlers::bearer::BearerToken;
use crate::state::AppState;
use crate::usecase::consume_token::{ConsumeTokenInput, ConsumeTokenUseCase};
use crate::usecase::request_challenge::{RequestChallengeInput, RequestChallengeUseCase};
use crate::usecase::verify_challenge::{VerifyChallengeInput, VerifyChallengeUseCase};

/// Identifiers are compared case-insensitively; the core expects them folded.
fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ResetError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ResetError::validation(rejection.body_text()))
}

// ── POST /password-reset/challenge ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestChallengeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct RequestChallengeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub async fn request_challenge(
    State(state): State<AppState>,
    payload: Result<Json<RequestChallengeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RequestChallengeResponse>), ResetError> {
    let req = body(payload)?;
    let usecase = RequestChallengeUseCase {
        records: state.record_store(),
        accounts: state.account_directory(),
        delivery: state.code_delivery(),
        clock: state.clock(),
    };
    let out = usecase
        .execute(RequestChallengeInput {
            identifier: normalize_email(&req.email),
        })
        .await?;

    let code = state.debug_echo_code.then_some(out.code);
    Ok((StatusCode::ACCEPTED, Json(RequestChallengeResponse { code })))
}

// ── POST /password-reset/verification ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyChallengeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Serialize)]
pub struct VerifyChallengeResponse {
    pub token: String,
}

pub async fn verify_challenge(
    State(state): State<AppState>,
    payload: Result<Json<VerifyChallengeRequest>, JsonRejection>,
) -> Result<Json<VerifyChallengeResponse>, ResetError> {
    let req = body(payload)?;
    let usecase = VerifyChallengeUseCase {
        records: state.record_store(),
        clock: state.clock(),
    };
    let out = usecase
        .execute(VerifyChallengeInput {
            identifier: normalize_email(&req.email),
            code: req.otp.trim().to_owned(),
        })
        .await?;
    Ok(Json(VerifyChallengeResponse { token: out.token }))
}

// ── POST /password-reset/credential ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConsumeTokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

pub async fn consume_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    payload: Result<Json<ConsumeTokenRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ResetError> {
    let req = body(payload)?;
    let usecase = ConsumeTokenUseCase {
        records: state.record_store(),
        credentials: state.credential_store(),
        clock: state.clock(),
    };
    usecase
        .execute(ConsumeTokenInput {
            identifier: normalize_email(&req.email),
            token,
            new_credential: req.password,
            new_credential_confirmation: req.confirm_password,
        })
        .await?;
    Ok(Json(serde_json::json!({})))
}
