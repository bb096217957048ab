//! Strict decoding of the generation service's JSON output.
//!
//! The whole batch is rejected if any element is not an object with
//! non-blank string `question` and `answer` fields. Nothing is dropped
//! silently and no field is defaulted.

use serde_json::{Map, Value};

use studydeck_core::{Flashcard, GenerationError};

/// Parse the service's response text into flashcards.
///
/// Cards get ids `card-1`, `card-2`, ... in response order. Surrounding
/// whitespace in questions and answers is trimmed.
pub fn decode_flashcards(json: &str) -> Result<Vec<Flashcard>, GenerationError> {
    let value: Value = serde_json::from_str(json.trim())
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(GenerationError::MalformedResponse(
            "expected a JSON array of flashcards".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_card(index, item))
        .collect()
}

fn decode_card(index: usize, item: Value) -> Result<Flashcard, GenerationError> {
    let Value::Object(fields) = item else {
        return Err(GenerationError::InvalidCard {
            index,
            reason: "not an object".into(),
        });
    };

    Ok(Flashcard {
        id: format!("card-{}", index + 1),
        question: required_text(&fields, "question", index)?,
        answer: required_text(&fields, "answer", index)?,
    })
}

fn required_text(
    fields: &Map<String, Value>,
    name: &str,
    index: usize,
) -> Result<String, GenerationError> {
    let reason = match fields.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => return Ok(s.trim().to_string()),
        Some(Value::String(_)) => format!("`{name}` is blank"),
        Some(Value::Null) | None => format!("missing `{name}`"),
        Some(_) => format!("`{name}` is not a string"),
    };
    Err(GenerationError::InvalidCard { index, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_array_decodes_in_order() {
        let json = r#"[
            {"question": "What is ATP?", "answer": "The cell's energy currency."},
            {"question": " Define osmosis ", "answer": "Diffusion of water across a membrane.\n"}
        ]"#;
        let cards = decode_flashcards(json).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "card-1");
        assert_eq!(cards[0].question, "What is ATP?");
        assert_eq!(cards[1].id, "card-2");
        assert_eq!(cards[1].question, "Define osmosis");
        assert_eq!(cards[1].answer, "Diffusion of water across a membrane.");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let json = r#"[{"question": "Q", "answer": "A", "difficulty": 3}]"#;
        assert_eq!(decode_flashcards(json).unwrap().len(), 1);
    }

    #[test]
    fn empty_array_is_an_empty_deck() {
        assert!(decode_flashcards("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_is_malformed() {
        let err = decode_flashcards(r#"{"question": "Q", "answer": "A"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode_flashcards("[{\"question\": ").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn one_bad_card_rejects_the_batch() {
        let json = r#"[
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2"},
            {"question": "Q3", "answer": "A3"}
        ]"#;
        match decode_flashcards(json).unwrap_err() {
            GenerationError::InvalidCard { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("answer"));
            }
            other => panic!("expected InvalidCard, got {other:?}"),
        }
    }

    #[test]
    fn blank_and_mistyped_fields_are_rejected() {
        let cases = [
            (r#"[{"question": "   ", "answer": "A"}]"#, "blank"),
            (r#"[{"question": 42, "answer": "A"}]"#, "not a string"),
            (r#"[{"question": null, "answer": "A"}]"#, "missing"),
            (r#"["just a string"]"#, "not an object"),
        ];
        for (json, expected) in cases {
            match decode_flashcards(json) {
                Err(GenerationError::InvalidCard { index: 0, reason }) => {
                    assert!(reason.contains(expected), "{json}: {reason}");
                }
                other => panic!("{json}: expected InvalidCard, got {other:?}"),
            }
        }
    }
}
