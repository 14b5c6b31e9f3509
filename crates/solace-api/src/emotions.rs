use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use solace_db::SaveOutcome;
use solace_types::api::{ClearResponse, SaveEmotionResponse, SaveStatus};
use solace_types::models::{EmotionEntry, EntryMatch};

use crate::{AppState, run_blocking};

pub async fn list_emotions(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let entries = run_blocking(&state, |db| db.load_emotions()).await?;
    Ok(Json(entries))
}

/// 201 when stored, 200 when dropped as a duplicate or as too old to keep.
pub async fn save_emotion(
    State(state): State<AppState>,
    Json(entry): Json<EmotionEntry>,
) -> Result<impl IntoResponse, StatusCode> {
    let outcome = run_blocking(&state, move |db| db.save_emotion(&entry)).await?;

    let (status, body) = match outcome {
        SaveOutcome::Inserted { id, trimmed } => (
            StatusCode::CREATED,
            SaveEmotionResponse {
                status: SaveStatus::Inserted,
                id: Some(id),
                trimmed,
            },
        ),
        SaveOutcome::Duplicate => (
            StatusCode::OK,
            SaveEmotionResponse {
                status: SaveStatus::Duplicate,
                id: None,
                trimmed: 0,
            },
        ),
        SaveOutcome::Expired => (
            StatusCode::OK,
            SaveEmotionResponse {
                status: SaveStatus::Expired,
                id: None,
                trimmed: 0,
            },
        ),
    };
    Ok((status, Json(body)))
}

pub async fn delete_matching(
    State(state): State<AppState>,
    Json(target): Json<EntryMatch>,
) -> Result<impl IntoResponse, StatusCode> {
    let found = run_blocking(&state, move |db| db.delete_emotion(&target)).await?;
    Ok(if found { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND })
}

pub async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let found = run_blocking(&state, move |db| db.delete_emotion_by_id(id)).await?;
    Ok(if found { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND })
}

pub async fn clear_emotions(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let removed = run_blocking(&state, |db| db.clear_emotions()).await?;
    Ok(Json(ClearResponse { removed }))
}
