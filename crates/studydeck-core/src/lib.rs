use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod generator;

// Re-export for convenience
pub use backend::{BackendError, PaginatedDocument, PdfBackend, TextRun};
pub use generator::{FlashcardGenerator, GenerationError};

/// Where the bytes of a [`SourceFile`] live.
#[derive(Debug, Clone)]
pub enum FileContents {
    /// Content already held in memory (pasted, uploaded, or pre-read).
    Bytes(Vec<u8>),
    /// Content on disk, read at extraction time.
    Path(PathBuf),
}

/// A file handed to the ingestion pipeline.
///
/// Carries the raw content plus two classification hints: the declared
/// media type (if the caller has one) and the filename, which is only
/// consulted for its extension.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    media_type: Option<String>,
    contents: FileContents,
}

impl SourceFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: Option<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type,
            contents: FileContents::Bytes(bytes.into()),
        }
    }

    /// Reference a file on disk. The filename hint is the path's final component.
    pub fn from_path(path: impl AsRef<Path>, media_type: Option<String>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type,
            contents: FileContents::Path(path.to_path_buf()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn contents(&self) -> &FileContents {
        &self.contents
    }
}

/// The extraction strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    PlainText,
    Pdf,
    /// Zipped WordprocessingML (`.docx`).
    Docx,
    Unsupported,
}

impl Format {
    /// Human-readable name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Format::PlainText => "plain text",
            Format::Pdf => "a PDF document",
            Format::Docx => "a Word document",
            Format::Unsupported => "an unsupported format",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::PlainText => "text",
            Format::Pdf => "pdf",
            Format::Docx => "docx",
            Format::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// All textual content of a source, in document order.
pub type ExtractedText = String;

/// Broad category of an extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// No extractor handles this file; the user must pick another file.
    UnsupportedFormat,
    /// The bytes could not be read from their source.
    ReadError,
    /// The bytes were read but are not a valid document of their format.
    ParseError,
}

/// The only error that crosses the ingestion boundary.
///
/// `message` is short and safe to show to an end user; the underlying
/// fault is logged where it was caught.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn new(kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of one extraction attempt. All-or-nothing per file.
pub type ExtractionOutcome = Result<ExtractedText, ExtractionError>;

/// A single question/answer study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
}
