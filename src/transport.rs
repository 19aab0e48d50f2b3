use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic text for a well-formed reply that carries no answer
pub const UNSUCCESSFUL_REPLY: &str = "Failed to get response";

/// Ways a single exchange with the assistant can fail
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or timeout failure
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not JSON
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON reply without `success: true` and an answer
    #[error("{}", UNSUCCESSFUL_REPLY)]
    Unsuccessful,
}

impl TransportError {
    /// Text of the error message shown in the conversation
    pub fn display_text(&self) -> String {
        match self {
            TransportError::Unsuccessful => UNSUCCESSFUL_REPLY.to_string(),
            other => format!("Error: {other}"),
        }
    }
}

/// One request/response exchange with the assistant backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send user text, returning the assistant's answer
    async fn send(&self, text: &str) -> Result<String, TransportError>;
}

/// Webhook request body: `entry[].changes[].value.messages[]`
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEnvelope {
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookEntry {
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookChange {
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookValue {
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboundMessage {
    pub from: String,
    pub text: MessageBody,
    /// Unix seconds, as a decimal string
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub body: String,
}

impl WebhookEnvelope {
    /// Wrap one user message
    pub fn new(sender_id: &str, body: &str, sent_at: DateTime<Utc>) -> Self {
        Self {
            entry: vec![WebhookEntry {
                changes: vec![WebhookChange {
                    value: WebhookValue {
                        messages: vec![InboundMessage {
                            from: sender_id.to_string(),
                            text: MessageBody {
                                body: body.to_string(),
                            },
                            timestamp: sent_at.timestamp().to_string(),
                        }],
                    },
                }],
            }],
        }
    }
}

/// Reply body from the assistant
#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    answer: Option<serde_json::Value>,
}

/// Interpret a reply body.
///
/// Non-JSON is a decode error. Any JSON without `success: true` and a
/// non-empty string `answer` is [`TransportError::Unsuccessful`].
pub fn decode_reply(body: &str) -> Result<String, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let Ok(reply) = serde_json::from_value::<ChatReply>(value) else {
        return Err(TransportError::Unsuccessful);
    };

    match (reply.success, reply.answer) {
        (Some(true), Some(serde_json::Value::String(answer))) if !answer.is_empty() => Ok(answer),
        _ => Err(TransportError::Unsuccessful),
    }
}

/// HTTP client for the assistant webhook
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    endpoint: String,
    sender_id: String,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            sender_id: config.sender_id.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for WebhookClient {
    async fn send(&self, text: &str) -> Result<String, TransportError> {
        let payload = WebhookEnvelope::new(&self.sender_id, text, Utc::now());
        tracing::info!(endpoint = %self.endpoint, chars = text.chars().count(), "sending message");
        tracing::debug!(?payload, "webhook envelope");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "assistant endpoint returned an error status");
            return Err(TransportError::Status { status, body });
        }

        let result = decode_reply(&body);
        match &result {
            Ok(answer) => tracing::info!(chars = answer.chars().count(), "received answer"),
            Err(e) => tracing::warn!(error = %e, "reply carried no answer"),
        }
        result
    }
}
