//! Lexer registry
//!
//! Hosts (documentation builders, the CLI) look lexers up by language name.
//! Each lexer implements [SyntaxLexer] and is registered explicitly with a
//! [LexerRegistry]; nothing registers itself.

use std::collections::HashMap;

use crate::transcript::{
    EmbeddedLexer, GrammarError, JsonLexer, LexerOptions, Token, TokenKind, TranscriptLexer,
    LANGUAGE_NAME,
};

/// Error that can occur when using the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Language '{0}' not found")]
    LanguageNotFound(String),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// A lexer that can be hosted under a language name.
pub trait SyntaxLexer: Send + Sync {
    /// The registry key of this lexer (e.g., "secop", "json")
    fn name(&self) -> &str;

    /// Tokenize a complete document
    fn tokenize<'a>(&'a self, source: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a>;

    /// Optional description of this lexer
    fn description(&self) -> &str {
        ""
    }
}

impl<E: EmbeddedLexer + 'static> SyntaxLexer for TranscriptLexer<E> {
    fn name(&self) -> &str {
        LANGUAGE_NAME
    }

    fn tokenize<'a>(&'a self, source: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a> {
        Box::new(TranscriptLexer::tokenize(self, source))
    }

    fn description(&self) -> &str {
        "SECoP request/reply transcripts"
    }
}

/// The payload tokenizer on its own, for plain JSON documents.
impl SyntaxLexer for JsonLexer {
    fn name(&self) -> &str {
        "json"
    }

    fn tokenize<'a>(&'a self, source: &'a str) -> Box<dyn Iterator<Item = Token<'a>> + 'a> {
        let tokens = self.tokenize_fragment(source);
        Box::new(
            tokens
                .into_iter()
                .map(move |(kind, span)| Token::new(TokenKind::Payload(kind), source, span)),
        )
    }

    fn description(&self) -> &str {
        "JSON documents"
    }
}

/// Registry of lexers keyed by language name.
pub struct LexerRegistry {
    lexers: HashMap<String, Box<dyn SyntaxLexer>>,
}

impl LexerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        LexerRegistry {
            lexers: HashMap::new(),
        }
    }

    /// Register a lexer
    ///
    /// If a lexer with the same name already exists, it will be replaced.
    pub fn register<L: SyntaxLexer + 'static>(&mut self, lexer: L) {
        log::debug!("registering lexer '{}'", lexer.name());
        self.lexers.insert(lexer.name().to_string(), Box::new(lexer));
    }

    /// Get a lexer by name
    pub fn get(&self, name: &str) -> Option<&dyn SyntaxLexer> {
        self.lexers.get(name).map(|lexer| lexer.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.lexers.contains_key(name)
    }

    /// Tokenize `source` with the lexer registered as `language`
    pub fn tokenize<'a>(
        &'a self,
        source: &'a str,
        language: &str,
    ) -> Result<Box<dyn Iterator<Item = Token<'a>> + 'a>, RegistryError> {
        let lexer = self
            .get(language)
            .ok_or_else(|| RegistryError::LanguageNotFound(language.to_string()))?;
        Ok(lexer.tokenize(source))
    }

    /// List all registered language names (sorted)
    pub fn list_languages(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lexers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a registry with the transcript lexer built from `options` and
    /// the standalone JSON lexer
    pub fn with_options(options: &LexerOptions) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        register(&mut registry, TranscriptLexer::new(options)?);
        registry.register(JsonLexer);
        Ok(registry)
    }

    /// Create a registry with default lexers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register(&mut registry, TranscriptLexer::<JsonLexer>::default());
        registry.register(JsonLexer);
        registry
    }
}

impl Default for LexerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Register the transcript lexer with a host registry under [LANGUAGE_NAME].
pub fn register<E: EmbeddedLexer + 'static>(
    registry: &mut LexerRegistry,
    lexer: TranscriptLexer<E>,
) {
    registry.register(lexer);
}
