use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoachError;
use crate::export::{zwo::DEFAULT_AUTHOR, ExportFormat, ExportOptions};
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    #[serde(default)]
    pub metadata: ConfigMetadata,

    /// Workout export settings
    #[serde(default)]
    pub export: ExportSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Workout export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Author written into exported workout files
    pub author: String,

    /// Directory exported files are written to
    pub output_dir: PathBuf,

    /// Default export format
    pub format: ExportFormat,

    /// Replace existing files
    pub overwrite: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            author: DEFAULT_AUTHOR.to_string(),
            output_dir: PathBuf::from("./workouts"),
            format: ExportFormat::Zwo,
            overwrite: true,
        }
    }
}

impl ExportSettings {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            overwrite: self.overwrite,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            export: ExportSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Keys accepted by [`AppConfig::get`] and [`AppConfig::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "export.author",
    "export.output_dir",
    "export.format",
    "export.overwrite",
    "logging.level",
    "logging.format",
    "logging.file_path",
    "logging.rotation",
    "logging.include_spans",
];

impl AppConfig {
    /// Default config location: `<config dir>/coach/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coach")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration, creating parent directories as needed
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        self.metadata.updated_at = Utc::now();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    /// Read a dotted key such as `export.author`
    pub fn get(&self, key: &str) -> std::result::Result<String, CoachError> {
        let value = match key {
            "export.author" => self.export.author.clone(),
            "export.output_dir" => self.export.output_dir.display().to_string(),
            "export.format" => self.export.format.extension().to_string(),
            "export.overwrite" => self.export.overwrite.to_string(),
            "logging.level" => self.logging.level.to_filter(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => self
                .logging
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "logging.rotation" => self.logging.rotation.to_string(),
            "logging.include_spans" => self.logging.include_spans.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a dotted key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), CoachError> {
        match key {
            "export.author" => self.export.author = value.to_string(),
            "export.output_dir" => self.export.output_dir = PathBuf::from(value),
            "export.format" => self.export.format = value.parse()?,
            "export.overwrite" => self.export.overwrite = parse_bool(key, value)?,
            "logging.level" => {
                self.logging.level = value.parse().map_err(CoachError::Configuration)?
            }
            "logging.format" => {
                self.logging.format = value.parse().map_err(CoachError::Configuration)?
            }
            "logging.file_path" => {
                self.logging.file_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "logging.rotation" => self.logging.rotation = parse_bool(key, value)?,
            "logging.include_spans" => self.logging.include_spans = parse_bool(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// All keys with their current values
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }
}

fn unknown_key(key: &str) -> CoachError {
    CoachError::Configuration(format!("Unknown configuration key: {}", key))
}

fn parse_bool(key: &str, value: &str) -> std::result::Result<bool, CoachError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CoachError::Configuration(format!(
            "Expected true/false for {}, got {}",
            key, value
        ))),
    }
}
