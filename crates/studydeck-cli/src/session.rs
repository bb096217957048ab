//! State for one study session: the text being studied, where it came
//! from, and the deck generated from it.
//!
//! Every file pick and generation issues a request token. Outcomes are only
//! applied when they carry the latest token, so a slow extraction or
//! generation can never overwrite the result of a newer one.

use studydeck_core::generator::EMPTY_INPUT_MESSAGE;
use studydeck_core::{Flashcard, GenerationError};
use studydeck_ingest::{ExtractionOutcome, RequestToken, RequestTracker, Tracked};

#[derive(Debug, Default)]
pub struct StudySession {
    text: String,
    file_name: Option<String>,
    submitted_text: Option<String>,
    cards: Vec<Flashcard>,
    error: Option<String>,
    tracker: RequestTracker,
}

impl StudySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The text the current deck was (or is being) generated from.
    pub fn submitted_text(&self) -> Option<&str> {
        self.submitted_text.as_deref()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A new file was picked. Returns the token its extraction must carry.
    pub fn begin_file(&mut self, name: impl Into<String>) -> RequestToken {
        self.text.clear();
        self.cards.clear();
        self.error = None;
        self.file_name = Some(name.into());
        self.tracker.issue()
    }

    /// Apply an extraction outcome. Returns `false` if it was superseded.
    pub fn finish_file(&mut self, tracked: Tracked<ExtractionOutcome>) -> bool {
        let Some(outcome) = self.tracker.accept(tracked) else {
            return false;
        };
        match outcome {
            Ok(text) => self.text = text,
            Err(e) => {
                self.error = Some(e.message);
                self.file_name = None;
            }
        }
        true
    }

    /// Drop the selected file and everything derived from it.
    pub fn clear_file(&mut self) {
        self.text.clear();
        self.file_name = None;
        self.submitted_text = None;
        self.cards.clear();
        self.error = None;
        // Anything still in flight belongs to the cleared file.
        self.tracker.issue();
    }

    /// Typed or pasted text replaces whatever file was selected.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.file_name = None;
    }

    /// Start a generation from the current text.
    pub fn begin_generate(&mut self) -> Result<RequestToken, &'static str> {
        if self.text.trim().is_empty() {
            self.error = Some(EMPTY_INPUT_MESSAGE.to_string());
            return Err(EMPTY_INPUT_MESSAGE);
        }
        self.cards.clear();
        self.error = None;
        self.submitted_text = Some(self.text.clone());
        Ok(self.tracker.issue())
    }

    /// Apply a generation outcome. Returns `false` if it was superseded.
    pub fn finish_generate(
        &mut self,
        tracked: Tracked<Result<Vec<Flashcard>, GenerationError>>,
    ) -> bool {
        let Some(outcome) = self.tracker.accept(tracked) else {
            return false;
        };
        match outcome {
            Ok(cards) => self.cards = cards,
            Err(e) => {
                tracing::warn!(error = %e, "flashcard generation failed");
                self.error = Some(e.user_message().to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studydeck_core::generator::GENERATION_FAILED_MESSAGE;
    use studydeck_ingest::{ExtractionError, ExtractionErrorKind};

    fn card(n: usize) -> Flashcard {
        Flashcard {
            id: format!("card-{n}"),
            question: format!("Q{n}"),
            answer: format!("A{n}"),
        }
    }

    #[test]
    fn file_text_replaces_session_state() {
        let mut session = StudySession::new();
        session.set_text("old notes");
        let token = session.begin_file("notes.txt");
        assert_eq!(session.text(), "");
        assert_eq!(session.file_name(), Some("notes.txt"));

        assert!(session.finish_file(Tracked::new(token, Ok("fresh text".into()))));
        assert_eq!(session.text(), "fresh text");
        assert!(session.error().is_none());
    }

    #[test]
    fn stale_extraction_is_dropped() {
        let mut session = StudySession::new();
        let first = session.begin_file("a.pdf");
        let second = session.begin_file("b.txt");

        assert!(session.finish_file(Tracked::new(second, Ok("from b".into()))));
        assert!(!session.finish_file(Tracked::new(first, Ok("from a".into()))));
        assert_eq!(session.text(), "from b");
        assert_eq!(session.file_name(), Some("b.txt"));
    }

    #[test]
    fn extraction_error_clears_the_file_name() {
        let mut session = StudySession::new();
        let token = session.begin_file("broken.docx");
        let err =
            ExtractionError::new(ExtractionErrorKind::ParseError, "Could not parse broken.docx");
        assert!(session.finish_file(Tracked::new(token, Err(err))));
        assert_eq!(session.error(), Some("Could not parse broken.docx"));
        assert!(session.file_name().is_none());
        assert_eq!(session.text(), "");
    }

    #[test]
    fn set_text_clears_the_selected_file() {
        let mut session = StudySession::new();
        let token = session.begin_file("notes.txt");
        session.finish_file(Tracked::new(token, Ok("file text".into())));
        session.set_text("typed text");
        assert_eq!(session.text(), "typed text");
        assert!(session.file_name().is_none());
    }

    #[test]
    fn blank_text_cannot_be_generated() {
        let mut session = StudySession::new();
        session.set_text("  \n ");
        assert_eq!(session.begin_generate(), Err(EMPTY_INPUT_MESSAGE));
        assert_eq!(session.error(), Some(EMPTY_INPUT_MESSAGE));
        assert!(session.submitted_text().is_none());
    }

    #[test]
    fn generation_results_apply_only_when_current() {
        let mut session = StudySession::new();
        session.set_text("photosynthesis notes");
        let first = session.begin_generate().unwrap();
        let second = session.begin_generate().unwrap();

        assert!(!session.finish_generate(Tracked::new(first, Ok(vec![card(1)]))));
        assert!(session.cards().is_empty());

        assert!(session.finish_generate(Tracked::new(second, Ok(vec![card(1), card(2)]))));
        assert_eq!(session.cards().len(), 2);
        assert_eq!(session.submitted_text(), Some("photosynthesis notes"));
    }

    #[test]
    fn generation_failure_shows_generic_message() {
        let mut session = StudySession::new();
        session.set_text("notes");
        let token = session.begin_generate().unwrap();
        let err = GenerationError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(session.finish_generate(Tracked::new(token, Err(err))));
        assert_eq!(session.error(), Some(GENERATION_FAILED_MESSAGE));
        assert!(session.cards().is_empty());
    }

    #[test]
    fn clear_file_resets_and_supersedes_in_flight_work() {
        let mut session = StudySession::new();
        let token = session.begin_file("notes.txt");
        session.clear_file();
        assert!(!session.finish_file(Tracked::new(token, Ok("late".into()))));
        assert_eq!(session.text(), "");
        assert!(session.file_name().is_none());
        assert!(session.cards().is_empty());
    }
}
