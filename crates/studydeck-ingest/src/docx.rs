//! Raw text extraction from `.docx` (zipped WordprocessingML) files.
//!
//! Only the main document part is read. Formatting is discarded: runs are
//! concatenated, tabs and line breaks inside runs are kept, and every
//! paragraph (including those in table cells) ends with a blank line.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use studydeck_core::Format;

use crate::extractor::{ExtractFuture, ExtractorError, TextExtractor};

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> Format {
        Format::Docx
    }

    fn extract(&self, data: Vec<u8>) -> ExtractFuture<'_> {
        Box::pin(async move { extract_docx_text(&data) })
    }
}

fn parse_error(message: impl Into<String>) -> ExtractorError {
    ExtractorError::parse(Format::Docx, message)
}

/// Open a `.docx` container and return the text of its body.
pub fn extract_docx_text(data: &[u8]) -> Result<String, ExtractorError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| parse_error(format!("failed to open archive: {e}")))?;

    let mut xml = Vec::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| parse_error(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_end(&mut xml)
        .map_err(|e| parse_error(format!("failed to read {DOCUMENT_PART}: {e}")))?;

    document_text(&xml)
}

/// Walk the WordprocessingML body and collect its text.
fn document_text(xml: &[u8]) -> Result<String, ExtractorError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);
    let mut out = String::new();
    let mut in_text = false;
    // <w:tab/> also appears in paragraph properties; only run-level ones count.
    let mut run_depth = 0usize;
    // Open elements. quick-xml reports EOF without checking this.
    let mut depth = 0usize;
    let mut saw_document = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 && e.local_name().as_ref() == b"document" {
                    saw_document = true;
                }
                depth += 1;
                match e.local_name().as_ref() {
                    b"t" => in_text = true,
                    b"r" => run_depth += 1,
                    b"tab" if run_depth > 0 => out.push('\t'),
                    b"br" | b"cr" if run_depth > 0 => out.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"document" if depth == 0 => saw_document = true,
                b"tab" if run_depth > 0 => out.push('\t'),
                b"br" | b"cr" if run_depth > 0 => out.push('\n'),
                b"p" => out.push_str("\n\n"),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| parse_error(format!("bad text content: {err}")))?;
                    out.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if in_text {
                    out.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"p" => out.push_str("\n\n"),
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                if !saw_document {
                    return Err(parse_error(format!("{DOCUMENT_PART} has no document element")));
                }
                if depth != 0 {
                    return Err(parse_error(format!(
                        "{DOCUMENT_PART} is truncated ({depth} unclosed elements)"
                    )));
                }
                break;
            }
            Err(e) => {
                return Err(parse_error(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
