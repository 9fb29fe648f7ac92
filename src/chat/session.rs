use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Message, Role, Transcript};
use crate::huggingface::Model;

/// Anything that can turn a prompt into reply text for a model.
///
/// Implementations must never fail: problems talking to the backend
/// are reported back as the reply itself so the conversation can
/// continue.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str, model: &Model, api_key: &str) -> String;
}

/// A single user's chat. Owns the transcript and the settings that
/// apply to the next turn.
#[derive(Clone, Debug)]
pub struct Session {
    id: String,
    model: Model,
    api_key: String,
    transcript: Transcript,
}

impl Session {
    pub fn new(model: Model, api_key: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), model, api_key)
    }

    pub fn with_id(id: &str, model: Model, api_key: &str) -> Self {
        Self {
            id: id.to_string(),
            model,
            api_key: api_key.to_string(),
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn select_model(&mut self, model: Model) {
        tracing::debug!("Session {} switched to model {}", self.id, model.id);
        self.model = model;
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = api_key.to_string();
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs the next turn: records the prompt, asks the responder for
    /// a reply and records that too. Only the current prompt is sent,
    /// earlier turns stay local.
    pub async fn turn(&mut self, prompt: &str, responder: &dyn Responder) -> Message {
        self.transcript.push(Message::new(Role::User, prompt));
        let reply = responder.respond(prompt, &self.model, &self.api_key).await;
        let msg = Message::new(Role::Assistant, &reply);
        self.transcript.push(msg.clone());
        tracing::debug!(
            "Session {} now has {} messages",
            self.id,
            self.transcript.len()
        );
        msg
    }
}
