//! Mock generator for tests and offline runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use studydeck_core::{Flashcard, FlashcardGenerator, GenerationError};

use crate::decode::decode_flashcards;

/// A configurable mock response for [`MockGenerator`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Raw model output, run through the same strict decoder as real responses.
    Json(String),
    /// Simulate a non-success HTTP status.
    Status(u16),
    /// Simulate a request timeout.
    Timeout,
}

/// A hand-rolled [`FlashcardGenerator`] with call counting and optional latency.
pub struct MockGenerator {
    response: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockGenerator {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// A mock that answers with `pairs` as question/answer cards.
    pub fn with_cards(pairs: &[(&str, &str)]) -> Self {
        let items: Vec<serde_json::Value> = pairs
            .iter()
            .map(|(q, a)| serde_json::json!({ "question": q, "answer": a }))
            .collect();
        Self::new(MockResponse::Json(serde_json::Value::Array(items).to_string()))
    }

    /// Set simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls that reached the (simulated) service.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl FlashcardGenerator for MockGenerator {
    fn name(&self) -> &str {
        "Mock"
    }

    fn generate<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Flashcard>, GenerationError>> + Send + 'a>> {
        Box::pin(async move {
            if text.trim().is_empty() {
                return Err(GenerationError::EmptyInput);
            }
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.response {
                MockResponse::Json(raw) => decode_flashcards(raw),
                MockResponse::Status(status) => Err(GenerationError::Status {
                    status: *status,
                    body: String::new(),
                }),
                MockResponse::Timeout => Err(GenerationError::Timeout),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cards_are_returned_and_calls_counted() {
        let mock = MockGenerator::with_cards(&[("Q1", "A1"), ("Q2", "A2")]);
        let cards = mock.generate("some notes").await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].answer, "A2");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_the_call() {
        let mock = MockGenerator::with_cards(&[("Q", "A")]);
        let err = mock.generate("   ").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyInput));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn raw_json_goes_through_strict_decode() {
        let mock = MockGenerator::new(MockResponse::Json(r#"[{"question": "Q"}]"#.into()));
        let err = mock.generate("notes").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidCard { index: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let mock = MockGenerator::new(MockResponse::Timeout).with_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        let err = mock.generate("notes").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
