//! Shared configuration loader for the SECoP transcript lexer tools.
//!
//! `defaults/secop.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`SecopConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use secop_lexer::formats::OutputFormat;
use secop_lexer::LexerOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/secop.default.toml");

/// Top-level configuration consumed by the lexer tools.
#[derive(Debug, Clone, Deserialize)]
pub struct SecopConfig {
    pub highlight: HighlightConfig,
    pub lexer: LexerOptions,
}

/// Which lexer runs and how its output is printed.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub language: String,
    pub format: OutputFormat,
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
    pub fn build(self) -> Result<SecopConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SecopConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.highlight.language, "secop");
        assert_eq!(config.highlight.format, OutputFormat::Simple);
        assert_eq!(config.lexer, LexerOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("highlight.format", "spans")
            .expect("override to apply")
            .set_override("lexer.trailing_payload", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.highlight.format, OutputFormat::Spans);
        assert!(config.lexer.trailing_payload);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[lexer]\nidn_vendors = [\"PSI\", \"ISSE\"]").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.lexer.idn_vendors, vec!["PSI", "ISSE"]);
        assert_eq!(config.highlight.language, "secop");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/secop.toml")
            .build()
            .expect("config to build");
        assert!(!config.lexer.trailing_payload);
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Loader::new()
            .set_override("highlight.format", "html")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
