pub mod export;

pub use export::{ExportError, ExportFormat, export_csv, export_deck, export_json};
