use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use solace_crypto::keys::{SHARE_KEY_LEN, generate_share_key};
use solace_types::api::IssueShareKeyRequest;

use crate::{AppState, run_blocking};

/// Issue the requested key, or a freshly generated one. The body is optional.
pub async fn issue(
    State(state): State<AppState>,
    req: Option<Json<IssueShareKeyRequest>>,
) -> Result<impl IntoResponse, StatusCode> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let key = req
        .key
        .unwrap_or_else(|| generate_share_key(SHARE_KEY_LEN));

    let record = run_blocking(&state, move |db| db.issue_share_key(&key)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let record = run_blocking(&state, move |db| db.get_share_key(&key))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(record))
}

/// 404 for unknown keys, 409 for keys already redeemed.
pub async fn redeem(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let record = run_blocking(&state, move |db| db.redeem_share_key(&key)).await?;
    Ok(Json(record))
}
