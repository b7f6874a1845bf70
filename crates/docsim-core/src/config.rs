//! Configuration loader and typed settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `DOCSIM_*` env
//! vars (nested keys separated by `__`). Paths accept `~` and `${VAR}`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("DOCSIM_").split("__"));

        Ok(Self { figment })
    }

    /// Wrap an already-assembled figment (tests, embedding applications).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Typed settings with defaults filled in for every missing key.
    pub fn settings(&self) -> crate::error::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub models: ModelSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.models.batch_size == 0 {
            return Err(Error::InvalidConfig("models.batch_size must be at least 1".into()));
        }
        if self.models.fake_dim == 0 {
            return Err(Error::InvalidConfig("models.fake_dim must be at least 1".into()));
        }
        let (lo, hi) = (self.pipeline.char_ngram_min, self.pipeline.char_ngram_max);
        if lo == 0 || lo > hi {
            return Err(Error::InvalidConfig(format!(
                "pipeline.char_ngram_min..=char_ngram_max must be a non-empty range starting at 1 or more, got {lo}..={hi}"
            )));
        }
        match self.models.device.as_str() {
            "auto" | "cpu" | "metal" => Ok(()),
            other => Err(Error::InvalidConfig(format!("models.device must be auto, cpu or metal, got '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    pub dir: String,
    pub use_fake: bool,
    pub fake_dim: usize,
    pub batch_size: usize,
    pub device: String,
}

impl ModelSettings {
    /// Models directory with `~` and environment variables expanded.
    pub fn dir_path(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: "models".to_string(),
            use_fake: false,
            fake_dim: 384,
            batch_size: 16,
            device: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    pub parallel_models: bool,
    pub timeout_secs: Option<u64>,
    pub char_ngram_min: usize,
    pub char_ngram_max: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { parallel_models: true, timeout_secs: None, char_ngram_min: 3, char_ngram_max: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
