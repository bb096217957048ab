//! Google Gemini `generateContent` client.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use studydeck_core::config_file::{
    DEFAULT_ENDPOINT, DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_MODEL, GenerationConfig,
};
use studydeck_core::{Flashcard, FlashcardGenerator, GenerationError};

use crate::decode::decode_flashcards;

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY: usize = 500;

/// Build the instruction sent along with the study material.
pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following study material. Identify the most important concepts, \
         definitions, and key information.\n\
         Based on this analysis, generate a concise set of flashcards. Each flashcard should \
         have a clear 'question' (a term or concept) and a corresponding 'answer' (its \
         definition or explanation).\n\
         Focus on creating high-quality, effective study aids.\n\n\
         Study Material:\n---\n{text}\n---\n"
    )
}

/// JSON schema the model is asked to follow: an array of
/// `{question, answer}` objects, both required strings.
fn flashcard_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": {
                    "type": "STRING",
                    "description": "A question or key term from the text."
                },
                "answer": {
                    "type": "STRING",
                    "description": "The corresponding answer or definition for the question/term."
                }
            },
            "required": ["question", "answer"]
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    /// Per-request limit; `None` leaves requests unbounded.
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS)),
        }
    }

    /// Build a client from the `[generation]` config section.
    /// `api_key` overrides the key stored in the config.
    pub fn from_config(
        config: Option<&GenerationConfig>,
        api_key: Option<String>,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key
            .or_else(|| config.and_then(|c| c.api_key.clone()))
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let mut client = Self::new(api_key);
        if let Some(config) = config {
            if let Some(model) = &config.model {
                client = client.with_model(model.clone());
            }
            if let Some(endpoint) = &config.endpoint {
                client = client.with_endpoint(endpoint.clone());
            }
            match config.timeout_secs {
                // 0 disables the timeout, as for PDF extraction
                Some(0) => client.timeout = None,
                Some(secs) => client = client.with_timeout(Duration::from_secs(secs)),
                None => {}
            }
        }
        Ok(client)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// Ask the model for flashcards covering `text`.
    pub async fn generate_flashcards(&self, text: &str) -> Result<Vec<Flashcard>, GenerationError> {
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyInput);
        }

        tracing::info!(model = %self.model, chars = text.len(), "requesting flashcards");

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(text) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": flashcard_schema(),
            }
        });

        let mut request = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let resp = request.send().await.map_err(map_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let json_text = candidate_text(data)?;
        let cards = decode_flashcards(&json_text)?;
        tracing::info!(cards = cards.len(), "generated flashcards");
        Ok(cards)
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(data: GenerateContentResponse) -> Result<String, GenerationError> {
    let content = data
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| GenerationError::MalformedResponse("no candidates in response".into()))?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(GenerationError::MalformedResponse(
            "candidate has no text".into(),
        ));
    }
    Ok(text)
}

fn map_reqwest_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Http(e.to_string())
    }
}

impl FlashcardGenerator for GeminiClient {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn generate<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Flashcard>, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate_flashcards(text))
    }
}
