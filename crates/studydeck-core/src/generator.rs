//! Boundary to the flashcard generation service.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::Flashcard;

/// Message shown to the end user for any generation failure other than
/// blank input.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate flashcards. The AI model may be temporarily unavailable or the input text could not be processed.";

/// Message shown when there is no study text to send.
pub const EMPTY_INPUT_MESSAGE: &str =
    "Please enter some text or upload a document to generate flashcards from.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("study text is empty")]
    EmptyInput,
    #[error("no API key configured for the generation service")]
    MissingApiKey,
    #[error("HTTP request error: {0}")]
    Http(String),
    #[error("generation request timed out")]
    Timeout,
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("response element {index} is invalid: {reason}")]
    InvalidCard { index: usize, reason: String },
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Short message suitable for display. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::EmptyInput => EMPTY_INPUT_MESSAGE,
            _ => GENERATION_FAILED_MESSAGE,
        }
    }
}

/// A service that turns study text into an ordered list of flashcards.
pub trait FlashcardGenerator: Send + Sync {
    /// Name of the service, for logs.
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Flashcard>, GenerationError>> + Send + 'a>>;
}
