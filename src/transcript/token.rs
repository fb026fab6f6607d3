//! Token types produced by the transcript lexer
//!
//! A token is a category plus the byte range it covers and the source text of
//! that range. Categories mirror the semantic roles of a transcript line; the
//! `Payload` category carries the sub-classification reported by the embedded
//! JSON tokenizer.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// The category of a transcript token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Direction marker: `>` for requests, `<` for replies
    Prompt,
    Whitespace,
    /// Request or reply action, e.g. `read`, `changed`, `*IDN?`
    Keyword,
    /// Addressed entity, usually a module name
    Identifier,
    /// `:name` suffix on an identifier, usually a parameter or command
    Qualifier,
    /// Text classified by the embedded JSON tokenizer
    Payload(PayloadKind),
    Comment,
    /// `...` standing in for elided transcript lines
    Ellipsis,
    /// Braces delimiting a payload
    Punctuation,
    /// Trailing text of a record that has no structured payload
    Literal,
}

/// Sub-classification of payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PayloadKind {
    /// A string in key position (followed by `:`)
    Key,
    String,
    Number,
    /// `true`, `false` or `null`
    Constant,
    Punctuation,
    Whitespace,
    /// Anything that is not valid JSON
    Invalid,
}

impl TokenKind {
    /// Style class for renderers, using the Pygments short class names.
    pub fn style_class(self) -> &'static str {
        match self {
            TokenKind::Prompt => "gp",
            TokenKind::Whitespace => "w",
            TokenKind::Keyword => "k",
            TokenKind::Identifier => "s",
            TokenKind::Qualifier => "n",
            TokenKind::Payload(kind) => kind.style_class(),
            TokenKind::Comment => "c1",
            TokenKind::Ellipsis => "go",
            TokenKind::Punctuation => "p",
            TokenKind::Literal => "s",
        }
    }

    pub fn is_whitespace(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Payload(PayloadKind::Whitespace)
        )
    }
}

impl PayloadKind {
    pub fn style_class(self) -> &'static str {
        match self {
            PayloadKind::Key => "nt",
            PayloadKind::String => "s2",
            PayloadKind::Number => "m",
            PayloadKind::Constant => "kc",
            PayloadKind::Punctuation => "p",
            PayloadKind::Whitespace => "w",
            PayloadKind::Invalid => "err",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Payload(kind) => write!(f, "Payload.{kind:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// A classified span of transcript text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Byte range in the tokenized source
    pub span: Range<usize>,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    /// Build a token for `span` of `source`.
    ///
    /// The span must lie on char boundaries of `source`.
    pub fn new(kind: TokenKind, source: &'src str, span: Range<usize>) -> Self {
        let text = &source[span.clone()];
        Token { kind, span, text }
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.text)
    }
}
