//! Chat-completion client used for translation and relevance ranking

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{CatalogError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String, // "system" or "user"
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Text-in, text-out language model. Replies are untrusted free text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Any transport, auth or provider failure is `CatalogError::OracleUnavailable`.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; translation and search calls will fail");
        }
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.oracle_timeout_secs),
        )
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CatalogError::OracleUnavailable("no API key configured".to_string())
        })?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::OracleUnavailable(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| CatalogError::OracleUnavailable("response had no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_omits_unset_options() {
        let messages = vec![ChatMessage::user("rank these")];
        let body = ChatCompletionBody {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: None,
            max_tokens: Some(60),
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 60);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_null_content_parses() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:9",
            None,
            "gpt-3.5-turbo",
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client
            .complete(CompletionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Port 9 (discard) is closed on test hosts; the connect fails fast.
        let client = OpenAiClient::new(
            "http://127.0.0.1:9/v1/",
            Some("sk-test".to_string()),
            "gpt-3.5-turbo",
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9/v1");

        let err = client
            .complete(CompletionRequest {
                messages: vec![ChatMessage::user("hi")],
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::OracleUnavailable(_)));
    }
}
