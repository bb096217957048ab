use std::sync::Arc;

use studydeck_core::FileContents;

pub mod detect;
pub mod docx;
pub mod extractor;
pub mod pdf;
pub mod plain;
pub mod request;

pub use detect::classify;
pub use docx::DocxExtractor;
pub use extractor::{ExtractFuture, ExtractorError, TextExtractor};
pub use pdf::{PdfExtractor, PdfSettings};
pub use plain::PlainTextExtractor;
pub use request::{RequestToken, RequestTracker, Tracked};
// Re-export domain types for convenience
pub use studydeck_core::{
    ExtractedText, ExtractionError, ExtractionErrorKind, ExtractionOutcome, Format, SourceFile,
};

/// Shown when no extractor handles a file.
pub const UNSUPPORTED_MESSAGE: &str =
    "Unsupported file type. Please upload a .txt, .pdf, or .docx file.";

/// Dispatches files to the extractor for their format.
///
/// One extraction attempt per call, no retries. Extractor faults are
/// logged here and replaced by a short [`ExtractionError`].
pub struct Ingestor {
    plain_text: Arc<dyn TextExtractor>,
    pdf: Arc<dyn TextExtractor>,
    docx: Arc<dyn TextExtractor>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::with_pdf_settings(PdfSettings::default())
    }
}

impl Ingestor {
    pub fn new(
        plain_text: Arc<dyn TextExtractor>,
        pdf: Arc<dyn TextExtractor>,
        docx: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            plain_text,
            pdf,
            docx,
        }
    }

    /// The built-in extractors, with the PDF engine configured by `settings`.
    pub fn with_pdf_settings(settings: PdfSettings) -> Self {
        Self::new(
            Arc::new(PlainTextExtractor),
            default_pdf_extractor(settings),
            Arc::new(DocxExtractor),
        )
    }

    fn extractor_for(&self, format: Format) -> Option<&Arc<dyn TextExtractor>> {
        match format {
            Format::PlainText => Some(&self.plain_text),
            Format::Pdf => Some(&self.pdf),
            Format::Docx => Some(&self.docx),
            Format::Unsupported => None,
        }
    }

    /// Classify `file`, run the matching extractor and return its text.
    pub async fn extract(&self, file: &SourceFile) -> ExtractionOutcome {
        let format = classify(file.media_type(), file.name());
        let Some(extractor) = self.extractor_for(format) else {
            tracing::info!(
                file = file.name(),
                media_type = file.media_type().unwrap_or(""),
                "unsupported file type"
            );
            return Err(ExtractionError::new(
                ExtractionErrorKind::UnsupportedFormat,
                UNSUPPORTED_MESSAGE,
            ));
        };

        match run_extractor(extractor.as_ref(), file).await {
            Ok(text) => {
                tracing::info!(
                    file = file.name(),
                    %format,
                    chars = text.chars().count(),
                    "extracted text"
                );
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(file = file.name(), %format, error = %e, "extraction failed");
                Err(user_facing_error(&e, file.name(), format))
            }
        }
    }

    /// [`extract`](Self::extract), tagging the outcome with `token`.
    pub async fn extract_tracked(
        &self,
        file: &SourceFile,
        token: RequestToken,
    ) -> Tracked<ExtractionOutcome> {
        Tracked::new(token, self.extract(file).await)
    }
}

async fn run_extractor(
    extractor: &dyn TextExtractor,
    file: &SourceFile,
) -> Result<String, ExtractorError> {
    let data = read_contents(file.contents()).await?;
    extractor.extract(data).await
}

async fn read_contents(contents: &FileContents) -> Result<Vec<u8>, ExtractorError> {
    match contents {
        FileContents::Bytes(bytes) => Ok(bytes.clone()),
        FileContents::Path(path) => Ok(tokio::fs::read(path).await?),
    }
}

fn user_facing_error(err: &ExtractorError, name: &str, format: Format) -> ExtractionError {
    let kind = err.kind();
    let message = match kind {
        ExtractionErrorKind::ReadError => {
            format!("Could not read {name}. Please select the file again.")
        }
        ExtractionErrorKind::ParseError => match err {
            ExtractorError::Unavailable(_) => format!(
                "Could not parse {name}: {} support is not available in this build.",
                format
            ),
            _ => format!(
                "Could not parse {name} as {}. The file may be corrupted, encrypted, or truncated.",
                format.label()
            ),
        },
        ExtractionErrorKind::UnsupportedFormat => UNSUPPORTED_MESSAGE.to_string(),
    };
    ExtractionError::new(kind, message)
}

/// Extract text from `file` using the built-in extractors.
pub async fn extract(file: &SourceFile) -> ExtractionOutcome {
    Ingestor::default().extract(file).await
}

#[cfg(feature = "pdf")]
fn default_pdf_extractor(settings: PdfSettings) -> Arc<dyn TextExtractor> {
    Arc::new(PdfExtractor::new(
        studydeck_pdf_mupdf::MupdfBackend::new(),
        settings,
    ))
}

#[cfg(not(feature = "pdf"))]
fn default_pdf_extractor(_settings: PdfSettings) -> Arc<dyn TextExtractor> {
    Arc::new(NoPdfSupport)
}

/// Stands in for the PDF extractor when the `pdf` feature is off.
#[cfg(not(feature = "pdf"))]
struct NoPdfSupport;

#[cfg(not(feature = "pdf"))]
impl TextExtractor for NoPdfSupport {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn extract(&self, _data: Vec<u8>) -> ExtractFuture<'_> {
        Box::pin(async { Err(ExtractorError::Unavailable(Format::Pdf)) })
    }
}
