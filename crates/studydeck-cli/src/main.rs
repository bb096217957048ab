use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use studydeck_core::config_file::{
    self, ConfigFile, DEFAULT_ENDPOINT, DEFAULT_EXPORT_PATH, DEFAULT_GENERATION_TIMEOUT_SECS,
    DEFAULT_MODEL, DEFAULT_PDF_TIMEOUT_SECS, ExportConfig, GenerationConfig, PdfConfig,
    PdfExecution,
};
use studydeck_core::{FlashcardGenerator, GenerationError, SourceFile};
use studydeck_generate::GeminiClient;
use studydeck_ingest::{Ingestor, PdfSettings, Tracked};
use studydeck_reporting::ExportFormat;

mod output;
mod session;

use output::ColorMode;
use session::StudySession;

/// Study Deck - Turn notes and documents into question/answer flashcards
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of a .txt, .pdf, or .docx file
    Extract {
        /// Path to the document
        file_path: PathBuf,

        /// Declared media type (takes precedence over the file extension)
        #[arg(long)]
        media_type: Option<String>,

        /// Write the text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate flashcards from a document or from text
    Generate(GenerateArgs),

    /// Print the platform config file path
    ConfigPath {
        /// Write a config file with the default settings if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to the document to study
    #[arg(conflicts_with = "text")]
    file_path: Option<PathBuf>,

    /// Study text to use instead of a document
    #[arg(long)]
    text: Option<String>,

    /// Declared media type of the document
    #[arg(long)]
    media_type: Option<String>,

    /// Gemini API key
    #[arg(long)]
    api_key: Option<String>,

    /// Model name (e.g. gemini-2.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Export the deck, optionally to PATH (default: configured export path)
    #[arg(long, value_name = "PATH")]
    export: Option<Option<PathBuf>>,

    /// Export format: csv or json
    #[arg(long)]
    format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            media_type,
            output,
        } => extract(file_path, media_type, output).await,
        Command::Generate(args) => generate(args).await,
        Command::ConfigPath { init } => config_path(init),
    }
}

/// Logs go to stderr so extracted text on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn ingestor_from(config: &ConfigFile) -> Ingestor {
    Ingestor::with_pdf_settings(PdfSettings::from_config(config.pdf.as_ref()))
}

async fn extract(
    file_path: PathBuf,
    media_type: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let ingestor = ingestor_from(&config);
    let file = SourceFile::from_path(&file_path, media_type);

    let text = match ingestor.extract(&file).await {
        Ok(text) => text,
        Err(e) => anyhow::bail!("{}", e.message),
    };

    if let Some(ref output_path) = output {
        std::fs::write(output_path, &text)?;
        eprintln!(
            "Wrote {} characters from {} to {}",
            text.chars().count(),
            file.name(),
            output_path.display()
        );
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let color = ColorMode(!args.no_color);

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let api_key = args
        .api_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .or_else(|| std::env::var("API_KEY").ok());
    let model = args
        .model
        .or_else(|| std::env::var("STUDYDECK_MODEL").ok());

    let mut client = GeminiClient::from_config(config.generation.as_ref(), api_key).map_err(|_| {
        anyhow::anyhow!(
            "No API key configured. Pass --api-key, set GEMINI_API_KEY, or add api_key under [generation] in {}",
            config_file::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ".studydeck.toml".to_string())
        )
    })?;
    if let Some(model) = model {
        client = client.with_model(model);
    }

    // Fail on a bad export format before doing any work
    let export = resolve_export(args.export, args.format.as_deref(), &config)?;

    let mut session = StudySession::new();
    if let Some(ref path) = args.file_path {
        let file = SourceFile::from_path(path, args.media_type);
        let token = session.begin_file(file.name());
        let outcome = ingestor_from(&config).extract_tracked(&file, token).await;
        session.finish_file(outcome);
        if let Some(message) = session.error() {
            anyhow::bail!("{message}");
        }
        output::print_extraction_summary(
            &mut std::io::stderr(),
            session.file_name().unwrap_or(file.name()),
            session.text().chars().count(),
            color,
        )?;
    } else if let Some(text) = args.text {
        session.set_text(text);
    } else {
        anyhow::bail!("Provide a document to read or study text with --text.");
    }

    let token = session.begin_generate().map_err(anyhow::Error::msg)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Generating flashcards with {}...", client.model()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let text = session.submitted_text().unwrap_or_default().to_string();
    let result = tokio::select! {
        result = client.generate(&text) => result,
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
    };
    spinner.finish_and_clear();
    abandon_if_cancelled(&mut session, &result)?;

    session.finish_generate(Tracked::new(token, result));
    if let Some(message) = session.error() {
        anyhow::bail!("{message}");
    }

    let mut stdout = std::io::stdout().lock();
    output::print_deck(&mut stdout, session.cards(), color)?;

    if let Some((path, format)) = export {
        studydeck_reporting::export_deck(session.cards(), format, &path)?;
        writeln!(
            stdout,
            "Exported {} flashcards to {} ({})",
            session.cards().len(),
            path.display(),
            format.label()
        )?;
    }

    Ok(())
}

/// An interrupted run drops its session state and fails, so the exit status is non-zero.
fn abandon_if_cancelled<T>(
    session: &mut StudySession,
    result: &Result<T, GenerationError>,
) -> anyhow::Result<()> {
    if matches!(result, Err(GenerationError::Cancelled)) {
        session.clear_file();
        anyhow::bail!("Cancelled.");
    }
    Ok(())
}

/// Where and how to export, if at all.
///
/// Path: flag > config > default. Format: flag > path extension > config > CSV.
fn resolve_export(
    export: Option<Option<PathBuf>>,
    format: Option<&str>,
    config: &ConfigFile,
) -> anyhow::Result<Option<(PathBuf, ExportFormat)>> {
    let Some(path) = export else {
        return Ok(None);
    };
    let export_config = config.export.as_ref();

    let path = path
        .or_else(|| export_config.and_then(|c| c.path.clone()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));

    let format: ExportFormat = if let Some(f) = format {
        f.parse()?
    } else if let Some(f) = ExportFormat::from_path(&path) {
        f
    } else if let Some(f) = export_config.and_then(|c| c.format.as_deref()) {
        f.parse()?
    } else {
        ExportFormat::default()
    };

    Ok(Some((path, format)))
}

fn config_path(init: bool) -> anyhow::Result<()> {
    let Some(path) = config_file::config_path() else {
        anyhow::bail!("Could not determine the platform config directory");
    };

    if init {
        if path.exists() {
            eprintln!("Config file already exists; leaving it unchanged.");
        } else {
            config_file::save_config(&default_config())?;
            eprintln!("Wrote default settings.");
        }
    }

    println!("{}", path.display());
    Ok(())
}

/// The built-in defaults, spelled out for a fresh config file.
fn default_config() -> ConfigFile {
    ConfigFile {
        generation: Some(GenerationConfig {
            api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            timeout_secs: Some(DEFAULT_GENERATION_TIMEOUT_SECS),
        }),
        pdf: Some(PdfConfig {
            execution: Some(PdfExecution::Blocking),
            timeout_secs: Some(DEFAULT_PDF_TIMEOUT_SECS),
        }),
        export: Some(ExportConfig {
            format: Some(ExportFormat::Csv.extension().to_string()),
            path: Some(DEFAULT_EXPORT_PATH.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studydeck_core::Flashcard;

    fn config_with_export(format: Option<&str>, path: Option<&str>) -> ConfigFile {
        ConfigFile {
            export: Some(ExportConfig {
                format: format.map(String::from),
                path: path.map(String::from),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn no_export_flag_means_no_export() {
        let config = config_with_export(Some("json"), Some("deck.json"));
        assert!(resolve_export(None, Some("csv"), &config).unwrap().is_none());
    }

    #[test]
    fn bare_export_flag_uses_defaults() {
        let (path, format) = resolve_export(Some(None), None, &ConfigFile::default())
            .unwrap()
            .unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_EXPORT_PATH));
        assert_eq!(format, ExportFormat::Csv);
    }

    #[test]
    fn config_fills_in_path_and_format() {
        let config = config_with_export(Some("json"), Some("decks/biology"));
        let (path, format) = resolve_export(Some(None), None, &config).unwrap().unwrap();
        assert_eq!(path, PathBuf::from("decks/biology"));
        assert_eq!(format, ExportFormat::Json);
    }

    #[test]
    fn extension_beats_configured_format() {
        let config = config_with_export(Some("csv"), None);
        let (_, format) = resolve_export(Some(Some("out.json".into())), None, &config)
            .unwrap()
            .unwrap();
        assert_eq!(format, ExportFormat::Json);
    }

    #[test]
    fn format_flag_wins() {
        let export = Some(Some(PathBuf::from("out.json")));
        let (_, format) = resolve_export(export, Some("csv"), &ConfigFile::default())
            .unwrap()
            .unwrap();
        assert_eq!(format, ExportFormat::Csv);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(resolve_export(Some(None), Some("xlsx"), &ConfigFile::default()).is_err());
    }

    #[test]
    fn generate_rejects_file_and_text_together() {
        let parsed = Cli::try_parse_from(["studydeck", "generate", "notes.txt", "--text", "hi"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn generate_parses_optional_export_path() {
        let cli =
            Cli::try_parse_from(["studydeck", "generate", "--text", "hi", "--export"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.export, Some(None));

        let cli = Cli::try_parse_from([
            "studydeck", "generate", "notes.pdf", "--export", "deck.json", "--no-color",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.file_path, Some(PathBuf::from("notes.pdf")));
        assert_eq!(args.export, Some(Some(PathBuf::from("deck.json"))));
        assert!(args.no_color);
    }

    #[test]
    fn cancelled_generation_fails_and_drops_the_session() {
        let mut session = StudySession::new();
        let token = session.begin_file("notes.txt");
        session.finish_file(Tracked::new(token, Ok("cell biology".into())));
        let token = session.begin_generate().unwrap();

        let cancelled: Result<Vec<Flashcard>, _> = Err(GenerationError::Cancelled);
        let err = abandon_if_cancelled(&mut session, &cancelled).unwrap_err();
        assert_eq!(err.to_string(), "Cancelled.");
        assert!(session.file_name().is_none());
        assert!(session.submitted_text().is_none());

        // A result arriving after the interrupt is ignored.
        assert!(!session.finish_generate(Tracked::new(token, Ok(Vec::new()))));
    }

    #[test]
    fn finished_generation_is_not_abandoned() {
        let mut session = StudySession::new();
        session.set_text("notes");
        session.begin_generate().unwrap();
        let done: Result<Vec<Flashcard>, GenerationError> = Ok(Vec::new());
        assert!(abandon_if_cancelled(&mut session, &done).is_ok());
        assert_eq!(session.submitted_text(), Some("notes"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        config_file::save_to_path(&default_config(), &path).unwrap();
        let loaded = config_file::load_from_path(&path).unwrap();
        let generation = loaded.generation.unwrap();
        assert_eq!(generation.model.as_deref(), Some(DEFAULT_MODEL));
        assert!(generation.api_key.is_none());
        assert_eq!(loaded.pdf.unwrap().execution, Some(PdfExecution::Blocking));
    }
}
