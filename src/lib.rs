//! # secop-lexer
//!
//! A highlighting lexer for SECoP protocol transcripts.
//!
//! Transcripts are the request/reply logs used as example text in the SECoP
//! documentation:
//!
//!     > describe
//!     < describing . {"modules": {
//!         "mod1": {...}
//!     }}
//!     > read mod1:value
//!     < reply mod1:value [1.5, {"t": 1712345678.1}]
//!
//! The [transcript] module classifies every span of such text into a token
//! category, delegating JSON payloads to an embedded tokenizer. The
//! [registry] module exposes the lexers to a host under a language name, and
//! [formats] turns token streams into text for tools and tests.

pub mod formats;
pub mod registry;
pub mod transcript;

pub use registry::{LexerRegistry, RegistryError, SyntaxLexer};
pub use transcript::{
    tokenize, LexerOptions, PayloadKind, ScanState, Token, TokenKind, Tokens, TranscriptLexer,
    LANGUAGE_NAME,
};
