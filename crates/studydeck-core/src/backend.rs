use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF is encrypted or password-protected")]
    Encrypted,
    #[error("failed to load page {page}: {message}")]
    PageError { page: usize, message: String },
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// A positioned fragment of text on a page.
///
/// Engines may report runs without a string payload (e.g. glyphs with no
/// Unicode mapping); `text` is `None` for those.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: Option<String>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }

    /// The run's text, or `""` when the payload is missing.
    pub fn as_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// An opened document made of independently loadable pages.
pub trait PaginatedDocument {
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Load the page with the given 1-based number and return its text runs
    /// in reading order.
    fn load_page(&self, number: usize) -> Result<Vec<TextRun>, BackendError>;
}

/// Trait for PDF engines.
///
/// Implementors only open the byte buffer and expose its pages; the page
/// walk and joining policy live in `studydeck_ingest::pdf`.
pub trait PdfBackend: Send + Sync {
    fn open<'a>(&'a self, data: &'a [u8]) -> Result<Box<dyn PaginatedDocument + 'a>, BackendError>;
}
