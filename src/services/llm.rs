//! Chat-completion client for OpenAI-compatible endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl LlmClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.llm_base_url, &config.llm_model, config.llm_api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a system + user prompt and return the first completion text.
    pub async fn complete(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("LLM_API_KEY is not set".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": max_tokens,
            "temperature": 0.3
        });

        debug!(model = %self.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Llm(format!("Provider returned {}: {}", status, text)));
        }

        parse_completion(&text)
    }
}

fn parse_completion(text: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(text)
        .map_err(|e| Error::Llm(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Llm(error.message));
    }

    let choice = response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| Error::Llm("No content in response".to_string()))?;

    match (choice.message, choice.text) {
        (Some(message), _) => Ok(message.content),
        (None, Some(text)) => Ok(text),
        (None, None) => Err(Error::Llm("No content in response".to_string())),
    }
}

/// Pull a JSON value out of completion text, which models often wrap in
/// prose or a fenced code block.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip a language tag such as `json`.
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            if let Ok(value) = serde_json::from_str(text[start..start + end].trim()) {
                return Some(value);
            }
        }
    }

    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if end > start {
                if let Ok(value) = serde_json::from_str(&text[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_message() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "hello");
    }

    #[test]
    fn surfaces_provider_error() {
        let body = r#"{"error":{"message":"quota exceeded","type":"insufficient_quota"}}"#;
        let err = parse_completion(body).unwrap_err();
        assert!(matches!(err, Error::Llm(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_completion(r#"{"choices":[]}"#).is_err());
    }

    #[test]
    fn extracts_json_from_fences_and_prose() {
        let fenced = "Here you go:\n```json\n[{\"title\":\"A\"}]\n```\nThanks";
        assert_eq!(extract_json(fenced).unwrap()[0]["title"], "A");

        let prose = "Sure! [{\"title\":\"B\"}] Let me know.";
        assert_eq!(extract_json(prose).unwrap()[0]["title"], "B");

        let object = "{\"milestones\":[]}";
        assert!(extract_json(object).unwrap()["milestones"].is_array());

        assert!(extract_json("no json here").is_none());
    }

    #[tokio::test]
    async fn missing_key_is_a_config_error() {
        let client = LlmClient::new("http://localhost:1", "m", None);
        let err = client.complete("s", "p", 10).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
