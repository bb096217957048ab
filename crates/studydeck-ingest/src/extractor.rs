use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use studydeck_core::{BackendError, ExtractionErrorKind, Format};

/// Faults raised inside an individual extractor.
///
/// These never leave the crate's public entry points; the orchestrator
/// logs them and converts them into an [`ExtractionError`](studydeck_core::ExtractionError).
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid {format} document: {message}")]
    Parse { format: Format, message: String },
    #[error("PDF backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0} support not compiled in")]
    Unavailable(Format),
}

impl ExtractorError {
    pub fn parse(format: Format, message: impl Into<String>) -> Self {
        ExtractorError::Parse {
            format,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            ExtractorError::Read(_) => ExtractionErrorKind::ReadError,
            ExtractorError::Parse { .. }
            | ExtractorError::Backend(_)
            | ExtractorError::Timeout(_)
            | ExtractorError::Unavailable(_) => ExtractionErrorKind::ParseError,
        }
    }
}

pub type ExtractFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, ExtractorError>> + Send + 'a>>;

/// Converts the bytes of one file format into plain text.
pub trait TextExtractor: Send + Sync {
    /// The format this extractor handles.
    fn format(&self) -> Format;

    /// Extract all text from `data`, in document order.
    fn extract(&self, data: Vec<u8>) -> ExtractFuture<'_>;
}
