//! Configuration for the two remote services.
//!
//! Sources, later overriding earlier:
//! 1. Defaults embedded in the binary (`config/default.toml`)
//! 2. An optional TOML file passed to [`AppConfig::load`]
//! 3. Environment variables prefixed with `BREED_LENS`, nested with `__`
//!
//! The description service credential has no default and should come from
//! the environment, e.g. `BREED_LENS__DESCRIBER__API_KEY`.

use crate::error::{PipelineError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const DEFAULTS: &str = include_str!("../config/default.toml");
const ENV_PREFIX: &str = "BREED_LENS";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub describer: DescriberConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Base URL of the classification service; `/predict` is appended.
    pub base_url: String,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Clone, Deserialize)]
pub struct DescriberConfig {
    pub endpoint: String,
    pub api_version: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        tracing::debug!(
            classifier = %config.classifier.base_url,
            describer = %config.describer.endpoint,
            model = %config.describer.model,
            "Loaded configuration"
        );
        Ok(config)
    }
}

impl DescriberConfig {
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PipelineError::Config(format!(
                "missing describer API key (set {}__DESCRIBER__API_KEY)",
                ENV_PREFIX
            ))),
        }
    }
}

impl fmt::Debug for DescriberConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriberConfig")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_jpeg_quality() -> u8 {
    crate::services::image_prep::DEFAULT_JPEG_QUALITY
}
