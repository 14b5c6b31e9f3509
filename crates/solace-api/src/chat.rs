use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use solace_types::api::{ClearResponse, SaveChatResponse};
use solace_types::models::ChatMessage;

use crate::{AppState, run_blocking};

pub async fn load_messages(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let messages = run_blocking(&state, |db| db.load_chat_messages()).await?;
    Ok(Json(messages))
}

pub async fn save_message(
    State(state): State<AppState>,
    Json(message): Json<ChatMessage>,
) -> Result<impl IntoResponse, StatusCode> {
    let id = run_blocking(&state, move |db| db.save_chat_message(&message)).await?;
    Ok((StatusCode::CREATED, Json(SaveChatResponse { id })))
}

pub async fn clear_messages(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let removed = run_blocking(&state, |db| db.clear_chat()).await?;
    Ok(Json(ClearResponse { removed }))
}
