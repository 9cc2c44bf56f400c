//! Configuration loading for CRUP.
//! Reads crup.toml from the current directory or the path in CRUP_CONFIG.
//! Every field has a default, so a missing file or section is not an error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crup_common::CrupError;
use crup_ingestion::registry::DomainSeed;
use crup_ingestion::IntakeConfig;
use crup_query::{QuerySettings, EXPORT_FILE_NAME};
use crup_web::state::WebSettings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub export: ExportConfig,
    /// Domains present at startup, in display order.
    #[serde(default = "DomainSeed::defaults")]
    pub domains: Vec<DomainSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_bind()          -> String { "0.0.0.0:3000".to_string() }
fn default_static_dir()    -> String { "static".to_string() }
fn default_max_upload_mb() -> usize  { 64 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String { EXPORT_FILE_NAME.to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self { file_name: default_file_name() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            intake: IntakeConfig::default(),
            query: QuerySettings::default(),
            export: ExportConfig::default(),
            domains: DomainSeed::defaults(),
        }
    }
}

impl Config {
    /// Load configuration from file. Falls back to defaults when the file is absent.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CRUP_CONFIG")
            .unwrap_or_else(|_| "crup.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(
                "Config file not found: {} (using defaults; copy crup.example.toml to crup.toml to customise)",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CrupError> {
        let rate = self.intake.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(CrupError::Config(format!(
                "intake.failure_rate must be within 0.0..=1.0, got {rate}"
            )));
        }
        Ok(())
    }

    pub fn web_settings(&self) -> WebSettings {
        WebSettings {
            static_dir: self.server.static_dir.clone(),
            export_file_name: self.export.file_name.clone(),
            max_upload_bytes: self.server.max_upload_mb * 1024 * 1024,
        }
    }
}
