//! Local HTTP surface over the encrypted journal store.

pub mod chat;
pub mod emotions;
pub mod share_keys;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post},
};
use tracing::error;

use solace_db::{Database, StoreError};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/emotions",
            get(emotions::list_emotions)
                .post(emotions::save_emotion)
                .delete(emotions::clear_emotions),
        )
        .route("/emotions/delete", post(emotions::delete_matching))
        .route("/emotions/{id}", delete(emotions::delete_by_id))
        .route(
            "/chat",
            get(chat::load_messages)
                .post(chat::save_message)
                .delete(chat::clear_messages),
        )
        .route("/share-keys", post(share_keys::issue))
        .route("/share-keys/{key}", get(share_keys::get_key))
        .route("/share-keys/{key}/redeem", post(share_keys::redeem))
        .with_state(state)
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, StatusCode>
where
    F: FnOnce(&Database) -> solace_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(status_for)
}

fn status_for(err: StoreError) -> StatusCode {
    match err {
        StoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::KeyAlreadyUsed(_) => StatusCode::CONFLICT,
        StoreError::InvalidEntry(_) => StatusCode::BAD_REQUEST,
        other => {
            error!("Store error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
