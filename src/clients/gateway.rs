//! OpenAI-compatible chat-completions gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::clients::traits::{GatewayError, ModelGateway, RawModelResponse};
use crate::config::Config;
use crate::error::{Result, UnravelerError};
use crate::request::PromptSpec;

const ERROR_BODY_LOG_CAP: usize = 500;

pub struct HttpGateway {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: String,
    timeout_ms: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        api_key_env: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| UnravelerError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            api_key_env: api_key_env.into(),
            timeout_ms,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.gateway.base_url,
            config.runtime.api_key.clone(),
            config.gateway.api_key_env.clone(),
            config.gateway.timeout_ms,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_err(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    async fn complete(
        &self,
        prompt: &PromptSpec,
    ) -> std::result::Result<RawModelResponse, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredential {
                var: self.api_key_env.clone(),
            })?;

        let body = ChatRequest {
            model: &prompt.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user_prompt,
                },
            ],
            temperature: prompt.temperature,
        };

        tracing::debug!("POST {} (model={})", self.endpoint, prompt.model);
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        // Check response status before parsing
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            let snippet: String = body_text.chars().take(ERROR_BODY_LOG_CAP).collect();
            tracing::error!("AI gateway error: {} {}", status.as_u16(), snippet);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let envelope: ChatResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_err(e)
            } else {
                GatewayError::InvalidEnvelope(e.to_string())
            }
        })?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(RawModelResponse::new)
            .ok_or_else(|| {
                GatewayError::InvalidEnvelope("missing choices[0].message.content".to_string())
            })
    }
}
