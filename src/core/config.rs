use std::env;
use std::time::Duration;

use crate::huggingface::{
    DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_INFERENCE_API_URL, Endpoints, GenerationParams,
};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub hf_api_key: String,
    pub endpoints: Endpoints,
    pub request_timeout: Option<Duration>,
    pub generation: GenerationParams,
    // Web sessions idle for longer than this are dropped
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let hf_api_key = env::var("HF_API_KEY").unwrap_or_default();
        let chat_completions_url = env::var("HF_CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|_| DEFAULT_CHAT_COMPLETIONS_URL.to_string());
        let inference_api_url = env::var("HF_INFERENCE_API_URL")
            .unwrap_or_else(|_| DEFAULT_INFERENCE_API_URL.to_string());
        // Unset or unparseable means the HTTP client's default
        let request_timeout = env::var("HF_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs);
        let session_ttl = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SESSION_TTL);
        let max_sessions = env::var("MAX_SESSIONS")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_SESSIONS);

        Self {
            hf_api_key,
            endpoints: Endpoints {
                chat_completions_url,
                inference_api_url,
            },
            request_timeout,
            generation: GenerationParams::default(),
            session_ttl,
            max_sessions,
        }
    }
}
