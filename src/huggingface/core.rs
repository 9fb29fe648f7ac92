use std::time::Duration;

use anyhow::{Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::chat::{Message, Role};

pub const DEFAULT_CHAT_COMPLETIONS_URL: &str =
    "https://router.huggingface.co/featherless-ai/v1/chat/completions";
pub const DEFAULT_INFERENCE_API_URL: &str = "https://api-inference.huggingface.co/models";

/// The two request/response shapes the Hugging Face APIs speak.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// OpenAI style `/v1/chat/completions` for instruction tuned models
    #[serde(rename = "chat_completion")]
    ChatCompletion,
    /// Plain text generation against `/models/<id>`
    #[serde(rename = "raw_inference")]
    RawInference,
}

impl ModelKind {
    /// Llama models are served through the chat completions router,
    /// everything else through the inference API.
    pub fn for_model_id(model_id: &str) -> Self {
        if model_id.to_lowercase().contains("llama") {
            ModelKind::ChatCompletion
        } else {
            ModelKind::RawInference
        }
    }
}

/// A model id with its request shape resolved up front so callers
/// never have to sniff the id again.
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub kind: ModelKind,
}

impl Model {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ModelKind::for_model_id(id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Endpoints {
    pub chat_completions_url: String,
    pub inference_api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chat_completions_url: DEFAULT_CHAT_COMPLETIONS_URL.to_string(),
            inference_api_url: DEFAULT_INFERENCE_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Model ids are namespaced like `org/name` so each segment is
    /// encoded separately and the slashes are kept.
    pub fn url_for(&self, model: &Model) -> String {
        match model.kind {
            ModelKind::ChatCompletion => self.chat_completions_url.clone(),
            ModelKind::RawInference => {
                let path = model
                    .id
                    .split('/')
                    .map(urlencoding::encode)
                    .collect::<Vec<_>>()
                    .join("/");
                format!("{}/{}", self.inference_api_url.trim_end_matches('/'), path)
            }
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    return_full_text: bool,
    temperature: f64,
}

#[derive(Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub url: String,
    pub body: Value,
}

pub fn build_request(
    message: &str,
    model: &Model,
    endpoints: &Endpoints,
    params: &GenerationParams,
) -> Result<Request> {
    let body = match model.kind {
        ModelKind::ChatCompletion => serde_json::to_value(ChatCompletionPayload {
            model: &model.id,
            messages: vec![Message::new(Role::User, message)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        })?,
        ModelKind::RawInference => serde_json::to_value(InferencePayload {
            inputs: message,
            parameters: InferenceParameters {
                max_new_tokens: params.max_tokens,
                return_full_text: false,
                temperature: params.temperature,
            },
        })?,
    };

    Ok(Request {
        url: endpoints.url_for(model),
        body,
    })
}

/// Sends the request and returns the decoded JSON body. Non-success
/// statuses are returned as errors carrying the status.
pub async fn completion(
    client: &reqwest::Client,
    request: &Request,
    api_key: &str,
) -> Result<Value, Error> {
    let response = client
        .post(&request.url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(&request.body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
