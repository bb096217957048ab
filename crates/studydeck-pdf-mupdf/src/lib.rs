use mupdf::{Document, TextPageFlags};

use studydeck_core::{BackendError, PaginatedDocument, PdfBackend, TextRun};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that non-PDF code paths do not transitively
/// depend on it.
///
/// Each text line MuPDF reports is one [`TextRun`]. Lines whose glyphs
/// carry no Unicode mapping at all become runs without a payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn open<'a>(
        &'a self,
        data: &'a [u8],
    ) -> Result<Box<dyn PaginatedDocument + 'a>, BackendError> {
        let document = Document::from_bytes(data, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }

        Ok(Box::new(MupdfDocument { document }))
    }
}

struct MupdfDocument {
    document: Document,
}

impl PaginatedDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn load_page(&self, number: usize) -> Result<Vec<TextRun>, BackendError> {
        let page_error = |message: String| BackendError::PageError {
            page: number,
            message,
        };

        let index = number
            .checked_sub(1)
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| page_error("page number out of range".into()))?;

        let page = self
            .document
            .load_page(index)
            .map_err(|e| page_error(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| page_error(e.to_string()))?;

        let mut runs = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let mut text = String::new();
                let mut mapped = false;
                for c in line.chars() {
                    if let Some(ch) = c.char() {
                        text.push(ch);
                        mapped = true;
                    }
                }
                runs.push(if mapped {
                    TextRun::new(text)
                } else {
                    TextRun::empty()
                });
            }
        }
        Ok(runs)
    }
}
