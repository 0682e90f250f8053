//! HTTP client for OpenAI-compatible chat completions.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;

use super::sse::DeltaSseParser;
use super::types::{AssistError, AssistErrorKind, AssistResult, AssistStream, ChatTurn};
use crate::settings::AssistSettings;

pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
pub const MODELS_PATH: &str = "/models";

/// Fixed request parameters; not user-tunable per call.
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;

/// Connectivity check deadline.
const TEST_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat completions configuration.
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatClientConfig {
    /// Builds a config from validated settings.
    ///
    /// # Errors
    /// Returns a `Configuration` error when the settings are incomplete.
    pub fn from_settings(settings: &AssistSettings) -> AssistResult<Self> {
        settings.validate()?;
        Ok(Self {
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        })
    }
}

/// OpenAI-compatible chat completions client.
pub struct ChatClient {
    config: ChatClientConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Opens a streaming chat completion for the given turn history.
    ///
    /// # Errors
    /// Returns an error for non-success HTTP statuses or request-level
    /// transport failures. Frame-level parse failures inside the returned
    /// stream are logged and skipped, never surfaced.
    pub async fn send_stream(&self, turns: &[ChatTurn]) -> AssistResult<AssistStream> {
        let request = ChatCompletionRequest::new(&self.config, turns);
        let url = format!("{}{}", self.config.api_url, CHAT_COMPLETIONS_PATH);

        tracing::debug!(model = %self.config.model, turns = turns.len(), "opening chat stream");

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AssistError::http_status(status.as_u16(), &error_body));
        }

        let byte_stream = response.bytes_stream();
        Ok(DeltaSseParser::new(byte_stream).boxed())
    }

    /// Probes `{api_url}/models` with a 10-second deadline.
    ///
    /// # Errors
    /// Returns an error on non-success statuses, timeouts, or transport
    /// failures.
    pub async fn test_connection(&self) -> AssistResult<()> {
        let url = format!("{}{}", self.config.api_url, MODELS_PATH);

        let response = self
            .http
            .get(&url)
            .headers(build_headers(&self.config.api_key))
            .timeout(TEST_CONNECTION_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistError::new(
                        AssistErrorKind::HttpStatus,
                        format!(
                            "Connection test timed out after {}s",
                            TEST_CONNECTION_TIMEOUT.as_secs()
                        ),
                    )
                } else {
                    classify_reqwest_error(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AssistError::http_status(status.as_u16(), &error_body));
        }

        Ok(())
    }
}

fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("accept", HeaderValue::from_static("text/event-stream"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers
}

fn classify_reqwest_error(e: reqwest::Error) -> AssistError {
    if e.is_timeout() {
        AssistError::new(AssistErrorKind::HttpStatus, format!("Request timed out: {e}"))
    } else if e.is_connect() {
        AssistError::new(AssistErrorKind::HttpStatus, format!("Connection failed: {e}"))
    } else if e.is_body() || e.is_decode() {
        AssistError::stream_unavailable(format!("Response body unavailable: {e}"))
    } else {
        AssistError::new(AssistErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatTurn>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

impl ChatCompletionRequest {
    fn new(config: &ChatClientConfig, turns: &[ChatTurn]) -> Self {
        Self {
            model: config.model.clone(),
            messages: turns.to_vec(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    #[test]
    fn test_request_body_shape() {
        let config = ChatClientConfig {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let turns = vec![ChatTurn {
            role: Role::User,
            content: "hello".to_string(),
        }];

        let body = serde_json::to_value(ChatCompletionRequest::new(&config, &turns)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_config_strips_trailing_slash() {
        let settings = AssistSettings {
            api_url: "https://api.openai.com/v1/".to_string(),
            api_key: "sk-0123456789".to_string(),
            model: "gpt-4o-mini".to_string(),
        };
        let config = ChatClientConfig::from_settings(&settings).unwrap();
        assert_eq!(config.api_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_config_rejects_incomplete_settings() {
        let settings = AssistSettings {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        };
        let err = ChatClientConfig::from_settings(&settings).unwrap_err();
        assert_eq!(err.kind, AssistErrorKind::Configuration);
    }
}
