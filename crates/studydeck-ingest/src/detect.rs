//! Format detection from a declared media type and a filename.

use studydeck_core::Format;

pub const PLAIN_TEXT_MIME: &str = "text/plain";
pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Choose an extraction strategy for a file.
///
/// The media type is checked first; if it is absent or not one of the
/// known types, the filename's extension decides (case-insensitive).
/// Pure function of its inputs.
pub fn classify(media_type: Option<&str>, filename: &str) -> Format {
    media_type
        .and_then(format_for_media_type)
        .or_else(|| format_for_filename(filename))
        .unwrap_or(Format::Unsupported)
}

fn format_for_media_type(media_type: &str) -> Option<Format> {
    // Compare the MIME essence only: "text/plain; charset=utf-8" is text/plain.
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        PLAIN_TEXT_MIME => Some(Format::PlainText),
        PDF_MIME => Some(Format::Pdf),
        DOCX_MIME => Some(Format::Docx),
        _ => None,
    }
}

fn format_for_filename(filename: &str) -> Option<Format> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".txt") {
        Some(Format::PlainText)
    } else if lower.ends_with(".pdf") {
        Some(Format::Pdf)
    } else if lower.ends_with(".docx") {
        Some(Format::Docx)
    } else {
        None
    }
}
