//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};

use edugenius::api::AppState;
use edugenius::api::app;
use edugenius::core::{AppConfig, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use edugenius::huggingface::{Endpoints, GenerationParams};

/// Creates a test application router whose Hugging Face endpoints
/// point at `api_url`, usually a `mockito` server.
pub fn test_app(api_url: &str, hf_api_key: &str) -> Router {
    test_app_with_session_ttl(api_url, hf_api_key, DEFAULT_SESSION_TTL)
}

pub fn test_app_with_session_ttl(api_url: &str, hf_api_key: &str, session_ttl: Duration) -> Router {
    let app_config = AppConfig {
        hf_api_key: hf_api_key.to_string(),
        endpoints: Endpoints {
            chat_completions_url: format!("{}/featherless-ai/v1/chat/completions", api_url),
            inference_api_url: format!("{}/models", api_url),
        },
        request_timeout: None,
        generation: GenerationParams::default(),
        session_ttl,
        max_sessions: DEFAULT_MAX_SESSIONS,
    };
    let app_state = AppState::new(app_config).expect("Failed to build app state");
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

/// Pulls the session ID out of a `/?session_id=...` redirect.
pub fn session_id_from_location(location: &str) -> String {
    location
        .split_once("session_id=")
        .map(|(_, id)| id.to_string())
        .expect("Missing session_id in location")
}
