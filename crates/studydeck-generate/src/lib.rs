pub mod decode;
pub mod gemini;
pub mod mock;

pub use decode::decode_flashcards;
pub use gemini::{GeminiClient, build_prompt};
pub use mock::{MockGenerator, MockResponse};
// Re-export domain types for convenience
pub use studydeck_core::{Flashcard, FlashcardGenerator, GenerationError};
