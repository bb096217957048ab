use std::sync::Arc;
use std::time::Duration;

use studydeck_core::config_file::{DEFAULT_PDF_TIMEOUT_SECS, PdfConfig, PdfExecution};
use studydeck_core::{BackendError, Format, PdfBackend};

use crate::extractor::{ExtractFuture, ExtractorError, TextExtractor};

/// How the PDF engine is run. Passed to [`PdfExtractor::new`]; there is no
/// process-wide engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfSettings {
    pub execution: PdfExecution,
    /// Upper bound on a whole-document extraction. Only enforceable with
    /// [`PdfExecution::Blocking`]; inline extraction never yields.
    pub timeout: Option<Duration>,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            execution: PdfExecution::Blocking,
            timeout: Some(Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS)),
        }
    }
}

impl PdfSettings {
    /// Settings for tests and single-threaded hosts: run on the calling task.
    pub fn inline() -> Self {
        Self {
            execution: PdfExecution::Inline,
            timeout: None,
        }
    }

    pub fn from_config(config: Option<&PdfConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };
        Self {
            execution: config.execution.unwrap_or(defaults.execution),
            // 0 disables the timeout
            timeout: match config.timeout_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.timeout,
            },
        }
    }
}

/// Walk every page of a PDF and concatenate its text.
///
/// Pages are visited in order from 1 to the page count. Each page's runs
/// are joined with a single space (runs without text contribute `""`) and
/// the page is followed by `\n`. Any page failure aborts the whole document.
pub fn extract_pages(backend: &dyn PdfBackend, data: &[u8]) -> Result<String, BackendError> {
    let document = backend.open(data)?;
    let page_count = document.page_count()?;
    tracing::debug!(page_count, "opened PDF");

    let mut text = String::new();
    for number in 1..=page_count {
        let runs = document.load_page(number)?;
        let page_text = runs.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(" ");
        text.push_str(&page_text);
        text.push('\n');
    }
    Ok(text)
}

pub struct PdfExtractor {
    backend: Arc<dyn PdfBackend>,
    settings: PdfSettings,
}

impl PdfExtractor {
    pub fn new(backend: impl PdfBackend + 'static, settings: PdfSettings) -> Self {
        Self::from_backend(Arc::new(backend), settings)
    }

    pub fn from_backend(backend: Arc<dyn PdfBackend>, settings: PdfSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &PdfSettings {
        &self.settings
    }
}

impl TextExtractor for PdfExtractor {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn extract(&self, data: Vec<u8>) -> ExtractFuture<'_> {
        Box::pin(async move {
            let work = async move {
                match self.settings.execution {
                    PdfExecution::Inline => {
                        extract_pages(self.backend.as_ref(), &data).map_err(ExtractorError::from)
                    }
                    PdfExecution::Blocking => {
                        let backend = Arc::clone(&self.backend);
                        tokio::task::spawn_blocking(move || extract_pages(backend.as_ref(), &data))
                            .await
                            .map_err(|e| {
                                ExtractorError::parse(
                                    Format::Pdf,
                                    format!("extraction task failed: {e}"),
                                )
                            })?
                            .map_err(ExtractorError::from)
                    }
                }
            };

            match self.settings.timeout {
                Some(limit) => tokio::time::timeout(limit, work)
                    .await
                    .map_err(|_| ExtractorError::Timeout(limit))?,
                None => work.await,
            }
        })
    }
}
