//! Client for the upstream chat-completion API (OpenRouter-compatible).

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::OpenRouterConfig;
use crate::errors::AppError;
use crate::models::ChatRole;

const APP_TITLE: &str = "Resume Backend";

/// One entry of the upstream `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_details: Option<Value>,
}

/// Body of a `POST {base_url}/chat/completions` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<UpstreamMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_body: Option<Value>,
}

/// Raw upstream reply: status, content type and the unparsed body.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &OpenRouterConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one completion request. Any HTTP status is returned as-is; only
    /// transport failures and a missing API key are errors.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        referer: Option<&str>,
    ) -> Result<UpstreamReply, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("OpenRouter API key not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %request.model, messages = request.messages.len(), "Calling chat upstream");

        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("X-Title", APP_TITLE)
            .json(request);
        if let Some(referer) = referer.filter(|r| !r.is_empty()) {
            builder = builder.header("HTTP-Referer", referer);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!(%status, "Chat upstream returned an error status");
        }

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}

/// The assistant turn extracted from a successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub reasoning_details: Option<Value>,
}

impl Completion {
    /// Read `choices[0].message.content` (and `reasoning_details`, if any).
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            AppError::InvalidUpstreamResponse(format!("Invalid JSON response from OpenRouter: {}", e))
        })?;

        let message = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| {
                AppError::InvalidUpstreamResponse("Invalid response from OpenRouter".to_string())
            })?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::InvalidUpstreamResponse("Invalid content format".to_string()))?
            .to_string();

        let reasoning_details = message
            .get("reasoning_details")
            .filter(|v| !v.is_null())
            .cloned();

        Ok(Self {
            content,
            reasoning_details,
        })
    }
}
