//! Shared configuration loader for the hiline tools.
//!
//! `defaults/hiline.default.toml` is embedded into every binary so that the documented
//! defaults and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into [`HilineConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/hiline.default.toml");

/// Top-level configuration consumed by hiline applications.
#[derive(Debug, Clone, Deserialize)]
pub struct HilineConfig {
    pub tokenize: TokenizeConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub syntax: SyntaxConfig,
}

/// Knobs applied while tokenizing.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizeConfig {
    pub coalesce: bool,
    /// 0 disables the limit.
    pub max_tokens_per_line: usize,
}

impl TokenizeConfig {
    pub fn token_limit(&self) -> Option<usize> {
        (self.max_tokens_per_line > 0).then_some(self.max_tokens_per_line)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Simple,
    Json,
    Classes,
}

/// Per-syntax additions to the built-in registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyntaxConfig {
    /// Syntax id to a `|`-separated list of extra extensions.
    #[serde(default)]
    pub extensions: HashMap<String, String>,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<HilineConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<HilineConfig, ConfigError> {
    Loader::new().build()
}
