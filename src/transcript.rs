//! SECoP transcript tokenizer
//!
//!     A transcript is a log of request/reply lines in the SECoP text protocol.
//!     Each line is a record: an optional direction marker (`>` request, `<`
//!     reply), an action keyword, an optional target (`module` or
//!     `module:parameter`) and optional data, usually a JSON value.
//!
//!         > change mod1:target 12.5
//!         < changed mod1:target [12.5, {"t": 1712345678.1}]
//!
//! Tokenizing
//!
//!     [tokenize] and [TranscriptLexer::tokenize] return a lazy [Tokens]
//!     iterator. The stream partitions the input: every byte belongs to exactly
//!     one token, tokens come in source order, and no token is empty. The
//!     lexer never fails; text it cannot classify becomes `Literal`,
//!     `Whitespace` or `Punctuation`.
//!
//! Payloads
//!
//!     A record whose data starts with `{` opens a payload. The payload ends
//!     at the matching `}` and may span several lines. The text between braces
//!     is handed, one line fragment at a time, to an [EmbeddedLexer] (by
//!     default the logos based [JsonLexer]). See [scanner] for how depth is
//!     tracked.
//!
//! Grammar
//!
//!     The line rules are an ordered table, see [grammar].

pub mod grammar;
pub mod payload;
pub mod scanner;
pub mod token;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub use grammar::{Grammar, GrammarError};
pub use payload::{EmbeddedLexer, JsonLexer};
pub use scanner::{ScanState, Tokens};
pub use token::{PayloadKind, Token, TokenKind};

/// Registry key of the transcript lexer.
pub const LANGUAGE_NAME: &str = "secop";

/// Knobs of the transcript lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerOptions {
    /// Prefixes that mark a `< ...` line as the reply to `*IDN?`
    pub idn_vendors: Vec<String>,
    /// Classify trailing record data with the embedded lexer instead of as a
    /// literal, e.g. the `[12.5, {...}]` of a `changed` reply
    pub trailing_payload: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            idn_vendors: vec!["ISSE".to_string()],
            trailing_payload: false,
        }
    }
}

/// A configured transcript lexer.
///
/// Compiling the grammar is the only costly step; a lexer can be shared and
/// reused for any number of inputs.
#[derive(Debug, Clone)]
pub struct TranscriptLexer<E: EmbeddedLexer = JsonLexer> {
    grammar: Grammar,
    options: LexerOptions,
    embedded: E,
}

impl TranscriptLexer<JsonLexer> {
    pub fn new(options: &LexerOptions) -> Result<Self, GrammarError> {
        Self::with_embedded(options, JsonLexer)
    }
}

impl<E: EmbeddedLexer> TranscriptLexer<E> {
    /// Build a lexer that delegates payloads to `embedded`.
    pub fn with_embedded(options: &LexerOptions, embedded: E) -> Result<Self, GrammarError> {
        let grammar = if *options == LexerOptions::default() {
            grammar::DEFAULT_GRAMMAR.clone()
        } else {
            Grammar::new(options)?
        };
        Ok(TranscriptLexer {
            grammar,
            options: options.clone(),
            embedded,
        })
    }

    /// Tokenize `source`. The returned iterator is lazy and single pass.
    pub fn tokenize<'l, 'src>(&'l self, source: &'src str) -> Tokens<'l, 'src, E> {
        Tokens::new(self, source)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    pub fn embedded(&self) -> &E {
        &self.embedded
    }
}

impl Default for TranscriptLexer<JsonLexer> {
    fn default() -> Self {
        TranscriptLexer {
            grammar: grammar::DEFAULT_GRAMMAR.clone(),
            options: LexerOptions::default(),
            embedded: JsonLexer,
        }
    }
}

static DEFAULT_LEXER: Lazy<TranscriptLexer> = Lazy::new(TranscriptLexer::default);

/// Tokenize `source` with the default options.
pub fn tokenize(source: &str) -> Tokens<'static, '_, JsonLexer> {
    DEFAULT_LEXER.tokenize(source)
}
