//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shakmaty::Color;
use std::time::Duration;
use tracing::debug;

use super::prompts;
use super::types::{ApiErrorBody, GameAnalysis, GenerateContentResponse, MoveSuggestion};
use super::Advisor;
use crate::error::AdvisorError;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiAdvisor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAdvisor {
    pub fn new(api_key: String) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends one prompt and decodes the JSON answer into `T`.
    async fn generate<T: DeserializeOwned>(&self, prompt: String, schema: Value) -> Result<T, AdvisorError> {
        let body = request_body(&prompt, schema);
        debug!(model = %self.model, "sending advisor request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|e| format!("{} {}: {}", e.error.code, e.error.status, e.error.message))
                .unwrap_or_else(|_| format!("{} - {}", status, text));
            return Err(AdvisorError::Api(message));
        }

        decode_output(&text)
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    async fn analyze_game(&self, history: &str) -> Result<GameAnalysis, AdvisorError> {
        let analysis: GameAnalysis = self
            .generate(prompts::analysis_prompt(history), prompts::analysis_schema())
            .await?;
        analysis.validate()
    }

    async fn suggest_move(&self, fen: &str, side: Color) -> Result<MoveSuggestion, AdvisorError> {
        let suggestion: MoveSuggestion = self
            .generate(prompts::suggestion_prompt(fen, side), prompts::suggestion_schema())
            .await?;
        suggestion.validate()
    }
}

fn request_body(prompt: &str, schema: Value) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema
        }
    })
}

/// Unwraps the candidate text and parses it as the structured output.
fn decode_output<T: DeserializeOwned>(raw: &str) -> Result<T, AdvisorError> {
    let envelope: GenerateContentResponse = serde_json::from_str(raw)?;
    let text = envelope.first_text().ok_or(AdvisorError::EmptyResponse)?;
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

/// Models sometimes wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_decode_suggestion() {
        let raw = envelope(r#"{"suggestedMove": "g1f3", "explanation": "Develops a piece."}"#);
        let suggestion: MoveSuggestion = decode_output(&raw).unwrap();
        assert_eq!(suggestion.suggested_move, "g1f3");
    }

    #[test]
    fn test_decode_fenced_json() {
        let raw = envelope("```json\n{\"suggestedMove\": \"e2e4\", \"explanation\": \"Centre.\"}\n```");
        let suggestion: MoveSuggestion = decode_output(&raw).unwrap();
        assert_eq!(suggestion.suggested_move, "e2e4");
    }

    #[test]
    fn test_decode_empty_envelope() {
        let result: Result<MoveSuggestion, _> = decode_output(r#"{"candidates": []}"#);
        assert!(matches!(result, Err(AdvisorError::EmptyResponse)));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let raw = envelope(r#"{"move": "e2e4"}"#);
        let result: Result<MoveSuggestion, _> = decode_output(&raw);
        assert!(matches!(result, Err(AdvisorError::Json(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hello", prompts::suggestion_schema());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_endpoint_uses_model() {
        let advisor = GeminiAdvisor::new("key".to_string())
            .unwrap()
            .with_model("gemini-test")
            .with_base_url("http://localhost:1234/v1beta/");
        assert_eq!(
            advisor.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    #[ignore] // Requires GEMINI_API_KEY and network access
    async fn test_live_suggestion() {
        let key = std::env::var("GEMINI_API_KEY").unwrap();
        let advisor = GeminiAdvisor::new(key).unwrap();
        let suggestion = advisor
            .suggest_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", Color::White)
            .await
            .unwrap();
        assert!(!suggestion.suggested_move.is_empty());
    }
}
