use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PDF_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXPORT_PATH: &str = "study-decks.csv";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub generation: Option<GenerationConfig>,
    pub pdf: Option<PdfConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Where the PDF engine runs relative to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfExecution {
    /// On tokio's blocking thread pool.
    #[default]
    Blocking,
    /// On the calling task.
    Inline,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    pub execution: Option<PdfExecution>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// `csv` or `json`.
    pub format: Option<String>,
    pub path: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform config directory path: `<config_dir>/studydeck/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studydeck").join("config.toml"))
}

/// Load config by cascading CWD `.studydeck.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".studydeck.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        generation: Some(GenerationConfig {
            api_key: overlay
                .generation
                .as_ref()
                .and_then(|g| g.api_key.clone())
                .or_else(|| base.generation.as_ref().and_then(|g| g.api_key.clone())),
            model: overlay
                .generation
                .as_ref()
                .and_then(|g| g.model.clone())
                .or_else(|| base.generation.as_ref().and_then(|g| g.model.clone())),
            endpoint: overlay
                .generation
                .as_ref()
                .and_then(|g| g.endpoint.clone())
                .or_else(|| base.generation.as_ref().and_then(|g| g.endpoint.clone())),
            timeout_secs: overlay
                .generation
                .as_ref()
                .and_then(|g| g.timeout_secs)
                .or_else(|| base.generation.as_ref().and_then(|g| g.timeout_secs)),
        }),
        pdf: Some(PdfConfig {
            execution: overlay
                .pdf
                .as_ref()
                .and_then(|p| p.execution)
                .or_else(|| base.pdf.as_ref().and_then(|p| p.execution)),
            timeout_secs: overlay
                .pdf
                .as_ref()
                .and_then(|p| p.timeout_secs)
                .or_else(|| base.pdf.as_ref().and_then(|p| p.timeout_secs)),
        }),
        export: Some(ExportConfig {
            format: overlay
                .export
                .as_ref()
                .and_then(|e| e.format.clone())
                .or_else(|| base.export.as_ref().and_then(|e| e.format.clone())),
            path: overlay
                .export
                .as_ref()
                .and_then(|e| e.path.clone())
                .or_else(|| base.export.as_ref().and_then(|e| e.path.clone())),
        }),
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
