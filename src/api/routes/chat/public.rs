//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::Message;

#[derive(Deserialize)]
pub struct ChatRequest {
    // A new session is started when missing
    pub session_id: Option<String>,
    pub message: String,
    // Model label or ID from the model table
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    pub transcript: Vec<Message>,
}

#[derive(Serialize)]
pub struct ChatTranscriptResponse {
    pub session_id: String,
    pub model: String,
    pub transcript: Vec<Message>,
}
