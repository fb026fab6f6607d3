//! Token stream output formats
//!
//! Renders a token stream as text for the CLI and for tests. These are
//! inspection formats; styling for documentation is left to the host, which
//! can use [TokenKind::style_class](crate::TokenKind::style_class).

use std::fmt::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transcript::Token;

/// Error that can occur when selecting or writing a format
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Format '{0}' not found (available: simple, spans, json, classes)")]
    FormatNotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `Kind "text"`, one token per line
    Simple,
    /// `start..end Kind`, one token per line
    Spans,
    /// Pretty printed JSON array of tokens
    Json,
    /// `class "text"`, one token per line
    Classes,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Simple,
        OutputFormat::Spans,
        OutputFormat::Json,
        OutputFormat::Classes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Spans => "spans",
            OutputFormat::Json => "json",
            OutputFormat::Classes => "classes",
        }
    }

    pub fn render(self, tokens: &[Token<'_>]) -> Result<String, FormatError> {
        match self {
            OutputFormat::Simple => Ok(to_simple_string(tokens)),
            OutputFormat::Spans => Ok(to_spans_string(tokens)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(tokens)?),
            OutputFormat::Classes => Ok(to_classes_string(tokens)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| FormatError::FormatNotFound(s.to_string()))
    }
}

/// Concatenate token texts. For a complete stream this is the input.
pub fn detokenize(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|token| token.text).collect()
}

pub fn to_simple_string(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{token}");
    }
    out
}

pub fn to_spans_string(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{:?} {}", token.span, token.kind);
    }
    out
}

pub fn to_classes_string(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{} {:?}", token.kind.style_class(), token.text);
    }
    out
}
