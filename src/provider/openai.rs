//! OpenAI provider speaking the Responses API.
//!
//! Auth priority: config key → `OPENAI_API_KEY` environment variable.
//! The provider returns the model's raw output text untouched; downstream
//! validation decides whether it is usable.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{DreamError, Result};
use crate::prompt::GenerationRequest;

use super::GenerationProvider;

/// Default API base. Overridable via config for proxies and tests.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI Responses API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build a provider with an explicit key and model.
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: OPENAI_API_BASE.to_string(),
            client: Self::build_client(),
        }
    }

    /// Build from config, resolving the key in priority order:
    /// config `api_key`, then `OPENAI_API_KEY`.
    ///
    /// Returns `None` when no key is available.
    pub fn from_config(config: &ProviderConfig) -> Option<Self> {
        let env_key = std::env::var("OPENAI_API_KEY").ok();
        let api_key = Self::resolve_key(config.api_key.as_deref(), env_key.as_deref())?;
        Some(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client: Self::build_client(),
        })
    }

    /// Pick the first non-empty key.
    fn resolve_key(explicit: Option<&str>, env: Option<&str>) -> Option<String> {
        if let Some(k) = explicit.filter(|k| !k.is_empty()) {
            return Some(k.to_string());
        }
        if let Some(k) = env.filter(|k| !k.is_empty()) {
            return Some(k.to_string());
        }
        None
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client")
    }

    /// Build the Responses API request body for one generation call.
    pub fn build_request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": self.model,
            "input": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "max_output_tokens": request.max_output_tokens
        })
    }

    /// Extract the output text from a Responses API reply.
    ///
    /// The reply carries an `output` array whose `message` items hold
    /// `content` parts; only `output_text` parts contribute. Reasoning items
    /// and other part types are skipped.
    pub fn extract_output_text(response: &Value) -> Option<String> {
        let output = response["output"].as_array()?;

        let parts: Vec<&str> = output
            .iter()
            .filter(|item| item["type"].as_str() == Some("message"))
            .filter_map(|item| item["content"].as_array())
            .flatten()
            .filter(|part| part["type"].as_str() == Some("output_text"))
            .filter_map(|part| part["text"].as_str())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(""))
        }
    }

    fn api_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = self.build_request_body(request);

        debug!(model = %self.model, "OpenAI responses request");

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DreamError::Provider(format!("OpenAI request failed: {e}")))?;

        if response.status().is_success() {
            let json: Value = response
                .json()
                .await
                .map_err(|e| DreamError::Provider(format!("failed to read OpenAI response: {e}")))?;

            return Self::extract_output_text(&json)
                .ok_or_else(|| DreamError::Provider("OpenAI response contained no output text".into()));
        }

        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();

        // Surface the API's own message when the error body is JSON.
        let message = serde_json::from_str::<Value>(&error_text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(error_text);

        Err(DreamError::Provider(format!(
            "OpenAI API error (status {status}): {message}"
        )))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_generation_request;

    #[test]
    fn test_resolve_key_prefers_explicit() {
        let key = OpenAiProvider::resolve_key(Some("config-key"), Some("env-key"));
        assert_eq!(key.as_deref(), Some("config-key"));
    }

    #[test]
    fn test_resolve_key_falls_back_to_env() {
        let key = OpenAiProvider::resolve_key(None, Some("env-key"));
        assert_eq!(key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_resolve_key_skips_empty_explicit() {
        let key = OpenAiProvider::resolve_key(Some(""), Some("env-key"));
        assert_eq!(key.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_resolve_key_none_without_credentials() {
        assert!(OpenAiProvider::resolve_key(None, None).is_none());
    }

    #[test]
    fn test_build_request_body_shape() {
        let provider = OpenAiProvider::new("key", "gpt-4o");
        let request = build_generation_request("a dream about water", false, &[], 900);
        let body = provider.build_request_body(&request);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_output_tokens"], 900);
        assert_eq!(body["input"][0]["role"], "system");
        assert_eq!(body["input"][1]["role"], "user");
        assert!(body["input"][1]["content"]
            .as_str()
            .unwrap()
            .contains("a dream about water"));
    }

    #[test]
    fn test_extract_output_text_from_message_item() {
        let response = json!({
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "{\"lines\": []}" }]
            }]
        });
        let text = OpenAiProvider::extract_output_text(&response);
        assert_eq!(text.as_deref(), Some("{\"lines\": []}"));
    }

    #[test]
    fn test_extract_output_text_skips_reasoning_items() {
        let response = json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "part one " },
                        { "type": "output_text", "text": "part two" }
                    ]
                }
            ]
        });
        let text = OpenAiProvider::extract_output_text(&response);
        assert_eq!(text.as_deref(), Some("part one part two"));
    }

    #[test]
    fn test_extract_output_text_none_when_empty() {
        let response = json!({ "output": [] });
        assert!(OpenAiProvider::extract_output_text(&response).is_none());
    }

    #[test]
    fn test_extract_output_text_skips_refusal_parts() {
        let response = json!({
            "output": [{
                "type": "message",
                "content": [{ "type": "refusal", "refusal": "no" }]
            }]
        });
        assert!(OpenAiProvider::extract_output_text(&response).is_none());
    }

    #[test]
    fn test_api_url() {
        let provider = OpenAiProvider::new("key", "gpt-4o");
        assert_eq!(provider.api_url(), "https://api.openai.com/v1/responses");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = OpenAiProvider::new("sk-secret", "gpt-4o");
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(OpenAiProvider::new("k", "m").name(), "openai");
    }
}
