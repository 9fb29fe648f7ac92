//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};

use super::public;
use crate::api::state::AppState;
use crate::core::models::find_model;

type SharedState = Arc<RwLock<AppState>>;

/// Get the transcript of a chat session by ID
async fn chat_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let session = state
        .write()
        .expect("Unable to write share state")
        .find_session(&id);

    let Some(session) = session else {
        return Ok((
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response());
    };

    let session = session.lock().await;
    Ok(Json(public::ChatTranscriptResponse {
        session_id: session.id().to_string(),
        model: session.model().id.clone(),
        transcript: session.transcript().messages(),
    })
    .into_response())
}

/// Initiate or add to a chat session and respond with the reply
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let model = match payload.model.as_deref() {
        Some(selection) => match find_model(selection) {
            Some(model) => Some(model),
            None => {
                return Ok((
                    StatusCode::BAD_REQUEST,
                    format!("Unknown model {}", selection),
                )
                    .into_response());
            }
        },
        None => None,
    };

    let (session, client) = {
        let mut shared_state = state.write().expect("Unable to write share state");
        let session = match &payload.session_id {
            Some(id) => shared_state.get_or_create_session(id),
            None => {
                let id = shared_state.create_session();
                shared_state.get_or_create_session(&id)
            }
        };
        (session, shared_state.client.clone())
    };

    let mut session = session.lock().await;
    if let Some(api_key) = &payload.api_key {
        session.set_api_key(api_key);
    }
    if let Some(model) = model {
        session.select_model(model);
    }

    let reply = session.turn(&payload.message, &client).await;

    Ok(Json(public::ChatResponse {
        session_id: session.id().to_string(),
        reply: reply.content,
        transcript: session.transcript().messages(),
    })
    .into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/{id}", get(chat_session))
}
