use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::core::{
    Endpoints, GenerationParams, Model, ModelKind, build_request, completion, http_client,
};
use crate::chat::Responder;
use crate::core::AppConfig;

pub const MISSING_API_KEY_MESSAGE: &str =
    "⚠️ Please enter your Hugging Face API key in the sidebar.";
pub const UNRECOGNIZED_RESPONSE_MESSAGE: &str =
    "I received a response, but couldn't process it. Please try again.";

/// Outcome of reading a successful response body.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Unrecognized,
}

impl Reply {
    pub fn into_text(self) -> String {
        match self {
            Reply::Text(text) => text,
            Reply::Unrecognized => UNRECOGNIZED_RESPONSE_MESSAGE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

/// `{"choices": [{"message": {"content": "..."}}]}`
pub fn parse_chat_completion(body: &Value) -> Reply {
    ChatCompletionResponse::deserialize(body)
        .ok()
        .and_then(|resp| resp.choices.into_iter().next())
        .and_then(|choice| choice.message.content)
        .map_or(Reply::Unrecognized, Reply::Text)
}

/// Text generation answers with a list of generations, but some
/// models return a single object or bare strings instead.
pub fn parse_raw_inference(body: &Value) -> Reply {
    match body {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) if first.contains_key("generated_text") => {
                Reply::Text(value_to_text(&first["generated_text"]))
            }
            Some(first) => Reply::Text(value_to_text(first)),
            None => Reply::Unrecognized,
        },
        Value::Object(obj) => obj
            .get("generated_text")
            .map_or(Reply::Unrecognized, |text| Reply::Text(value_to_text(text))),
        _ => Reply::Unrecognized,
    }
}

pub fn parse_reply(kind: ModelKind, body: &Value) -> Reply {
    match kind {
        ModelKind::ChatCompletion => parse_chat_completion(body),
        ModelKind::RawInference => parse_raw_inference(body),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Client for the hosted Hugging Face APIs. Cheap to clone, the
/// underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct HuggingFace {
    client: reqwest::Client,
    endpoints: Endpoints,
    params: GenerationParams,
}

impl HuggingFace {
    pub fn new(
        endpoints: Endpoints,
        params: GenerationParams,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoints,
            params,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.endpoints.clone(),
            config.generation,
            config.request_timeout,
        )
    }

    /// Gets a reply for `message` from `model`. Every failure is
    /// turned into text for the user, nothing is returned as an error.
    pub async fn get_response(&self, message: &str, model: &Model, api_key: &str) -> String {
        if api_key.is_empty() {
            return MISSING_API_KEY_MESSAGE.to_string();
        }

        let request = match build_request(message, model, &self.endpoints, &self.params) {
            Ok(request) => request,
            Err(e) => return format!("⚠️ An error occurred: {}", e),
        };

        tracing::debug!(
            "Requesting {:?} completion for model {} from {}",
            model.kind,
            model.id,
            request.url
        );

        match completion(&self.client, &request, api_key).await {
            Ok(body) => {
                let reply = parse_reply(model.kind, &body);
                if reply == Reply::Unrecognized {
                    tracing::warn!("Unrecognized response from {}: {}", model.id, body);
                }
                reply.into_text()
            }
            Err(e) => match e.downcast_ref::<reqwest::Error>() {
                Some(http_err) if http_err.is_status() => {
                    tracing::error!("HTTP error from {}: {}", model.id, http_err);
                    format!("⚠️ HTTP error occurred: {}", http_err)
                }
                _ => {
                    tracing::error!("Completion for {} failed: {}", model.id, e);
                    format!("⚠️ An error occurred: {}", e)
                }
            },
        }
    }
}

#[async_trait]
impl Responder for HuggingFace {
    async fn respond(&self, message: &str, model: &Model, api_key: &str) -> String {
        self.get_response(message, model, api_key).await
    }
}
