use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use studydeck_core::Flashcard;

/// Output format for an exported deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Csv, ExportFormat::Json]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guess the format from a file extension; `None` if it is neither.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("unknown export format '{0}' (expected csv or json)")]
    UnknownFormat(String),
    #[error("failed to serialize deck: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Write `cards` to `path` in the given format.
pub fn export_deck(
    cards: &[Flashcard],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = match format {
        ExportFormat::Csv => export_csv(cards),
        ExportFormat::Json => export_json(cards)?,
    };

    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;

    tracing::info!(
        path = %path.display(),
        format = format.label(),
        cards = cards.len(),
        "exported deck"
    );
    Ok(())
}

/// Every field is quoted, so commas and newlines inside cards survive.
fn csv_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// `Question,Answer` header plus one row per card, joined by `\n`.
pub fn export_csv(cards: &[Flashcard]) -> String {
    let rows: Vec<String> = cards
        .iter()
        .map(|c| format!("{},{}", csv_field(&c.question), csv_field(&c.answer)))
        .collect();
    format!("Question,Answer\n{}", rows.join("\n"))
}

pub fn export_json(cards: &[Flashcard]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(cards)?)
}
