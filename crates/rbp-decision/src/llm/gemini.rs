use super::{Counters, LlmClient, LlmError, Message, Role, Statistics};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google's generative-language REST shape, distinct from the OpenAI
/// Chat Completions envelope: system instructions are a separate field,
/// content is nested under `parts`, and the key travels as a query param.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    counters: Counters,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self { http: reqwest::Client::new(), api_key, model, counters: Counters::default() }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    async fn chat(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NoKey);
        }

        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| Content { parts: vec![Part { text: &m.content }] });
        let contents = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| Content { parts: vec![Part { text: &m.content }] })
            .collect();

        let body = GenerateRequest {
            contents,
            system_instruction: system,
            generation_config: Some(GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            }),
        };

        let url = format!("{}/{}:generateContent?key={}", BASE_URL, self.model, self.api_key);
        let result = self.http.post(url).json(&body).timeout(timeout).send().await;

        let outcome = match result {
            Ok(response) if response.status().is_success() => response
                .json::<GenerateResponse>()
                .await
                .map_err(|e| LlmError::BadResponse(e.to_string()))
                .and_then(|parsed| {
                    parsed
                        .candidates
                        .into_iter()
                        .next()
                        .and_then(|c| c.content.parts.into_iter().next())
                        .map(|p| p.text)
                        .ok_or_else(|| LlmError::BadResponse("no candidates in response".into()))
                }),
            Ok(response) => Err(LlmError::Request(format!("status {}", response.status()))),
            Err(e) if e.is_timeout() => Err(LlmError::Timeout),
            Err(e) => Err(LlmError::Request(e.to_string())),
        };

        self.counters.record(outcome.is_ok());
        outcome
    }

    fn statistics(&self) -> Statistics {
        self.counters.snapshot()
    }
}
