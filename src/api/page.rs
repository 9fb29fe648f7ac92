//! The browser chat page. Settings and prompts are submitted as a
//! plain HTML form and the browser is redirected back to the page so
//! a reload never resubmits a prompt.

use std::sync::{Arc, RwLock};

use axum::{
    Form, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::Query;
use http::{HeaderValue, header};
use serde::Deserialize;

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::models::find_model;
use crate::ui::render_chat_page;

type SharedState = Arc<RwLock<AppState>>;

#[derive(Deserialize)]
pub struct PageParams {
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatForm {
    pub session_id: String,
    // Left blank to keep the session's current key
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub clear_api_key: bool,
    pub model: Option<String>,
    #[serde(default)]
    pub message: String,
}

pub fn session_url(session_id: &str) -> String {
    format!("/?session_id={}", urlencoding::encode(session_id))
}

// Pages carry the transcript so they must never be served from a
// cache.
async fn set_no_cache(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Render the chat page for a session, starting a new session when
/// none was given
async fn chat_page(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> Result<Response, ApiError> {
    let Some(session_id) = params.session_id else {
        let session_id = state
            .write()
            .expect("Unable to write share state")
            .create_session();
        return Ok(Redirect::to(&session_url(&session_id)).into_response());
    };

    let (session, templates, server_key) = {
        let mut shared_state = state.write().expect("Unable to write share state");
        (
            shared_state.get_or_create_session(&session_id),
            Arc::clone(&shared_state.templates),
            shared_state.config.hf_api_key.clone(),
        )
    };

    let session = session.lock().await;
    let html = render_chat_page(&templates, &session, &server_key)?;
    Ok(Html(html).into_response())
}

/// Apply the sidebar settings and run a turn if a message was sent
async fn chat_submit(
    State(state): State<SharedState>,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let model = match form.model.as_deref() {
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
        (
            shared_state.get_or_create_session(&form.session_id),
            shared_state.client.clone(),
        )
    };

    let mut session = session.lock().await;
    if form.clear_api_key {
        session.set_api_key("");
    } else if !form.api_key.trim().is_empty() {
        session.set_api_key(form.api_key.trim());
    }
    if let Some(model) = model {
        session.select_model(model);
    }
    if !form.message.trim().is_empty() {
        session.turn(&form.message, &client).await;
    }

    Ok(Redirect::to(&session_url(session.id())).into_response())
}

/// Create the page router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(chat_page).post(chat_submit))
        .layer(middleware::from_fn(set_no_cache))
}
