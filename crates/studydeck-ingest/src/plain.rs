use studydeck_core::Format;

use crate::extractor::{ExtractFuture, TextExtractor};

/// Decodes text files as UTF-8 and returns them untouched.
///
/// Invalid byte sequences become U+FFFD; nothing is trimmed or normalized.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

pub fn decode_text(data: Vec<u8>) -> String {
    String::from_utf8(data)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> Format {
        Format::PlainText
    }

    fn extract(&self, data: Vec<u8>) -> ExtractFuture<'_> {
        Box::pin(async move { Ok(decode_text(data)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_returned_verbatim() {
        let input = "  Mitochondria\r\n\tis the powerhouse\n\n of the cell.  \n";
        assert_eq!(decode_text(input.as_bytes().to_vec()), input);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let input = "Ångström · Δx ≥ ħ/2 · 光合作用 · 🌱";
        assert_eq!(decode_text(input.as_bytes().to_vec()), input);
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(decode_text(Vec::new()), "");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let bytes = vec![b'a', 0xff, b'b'];
        assert_eq!(decode_text(bytes), "a\u{FFFD}b");
    }

    #[tokio::test]
    async fn extractor_reports_plain_text_format() {
        let extractor = PlainTextExtractor;
        assert_eq!(extractor.format(), Format::PlainText);
        let text = extractor.extract(b"cell wall".to_vec()).await.unwrap();
        assert_eq!(text, "cell wall");
    }
}
