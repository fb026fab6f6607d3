//! Embedded JSON tokenizer for payload fragments
//!
//! The transcript lexer hands every payload fragment (the text between two
//! braces, or up to the end of a line) to an [EmbeddedLexer]. Fragments are
//! routinely incomplete JSON, so the lexer here is total: anything logos can
//! not match comes back as [PayloadKind::Invalid] instead of an error.

use std::ops::Range;

use logos::Logos;

use super::token::PayloadKind;

/// A tokenizer for the structured data embedded in transcript records.
///
/// Implementations receive a fragment that may be a partial value and should
/// return spans relative to the fragment, in order. The transcript lexer
/// tolerates gaps and overlaps in the result.
pub trait EmbeddedLexer: Send + Sync {
    fn tokenize_fragment(&self, fragment: &str) -> Vec<(PayloadKind, Range<usize>)>;
}

/// Raw JSON tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum JsonToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token("{")]
    #[token("}")]
    #[token("[")]
    #[token("]")]
    #[token(",")]
    #[token(":")]
    Punctuation,

    // Unterminated strings run to the end of the fragment
    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    String,

    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("true")]
    #[token("false")]
    #[token("null")]
    Constant,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

impl JsonToken {
    fn kind(self) -> PayloadKind {
        match self {
            JsonToken::Whitespace => PayloadKind::Whitespace,
            JsonToken::Punctuation => PayloadKind::Punctuation,
            JsonToken::String => PayloadKind::String,
            JsonToken::Number => PayloadKind::Number,
            JsonToken::Constant => PayloadKind::Constant,
            JsonToken::Word => PayloadKind::Invalid,
        }
    }
}

/// The default [EmbeddedLexer], a logos based JSON tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLexer;

impl EmbeddedLexer for JsonLexer {
    fn tokenize_fragment(&self, fragment: &str) -> Vec<(PayloadKind, Range<usize>)> {
        let mut lexer = JsonToken::lexer(fragment);
        let mut tokens: Vec<(PayloadKind, Range<usize>)> = Vec::new();
        let mut covered = 0;

        while let Some(result) = lexer.next() {
            let mut span = lexer.span();
            if result.is_err() {
                // Error spans may end inside a multi-byte character
                while !fragment.is_char_boundary(span.end) {
                    span.end += 1;
                }
                let extra = span.end - lexer.span().end;
                if extra > 0 {
                    lexer.bump(extra);
                }
            }
            if span.start > covered {
                push_invalid(&mut tokens, covered..span.start);
            }
            match result {
                Ok(token) => tokens.push((token.kind(), span.clone())),
                Err(()) => push_invalid(&mut tokens, span.clone()),
            }
            covered = span.end;
        }
        if covered < fragment.len() {
            push_invalid(&mut tokens, covered..fragment.len());
        }

        mark_keys(&mut tokens, fragment);
        tokens
    }
}

/// Consecutive invalid characters are reported as one token.
fn push_invalid(tokens: &mut Vec<(PayloadKind, Range<usize>)>, span: Range<usize>) {
    if let Some((PayloadKind::Invalid, last)) = tokens.last_mut() {
        if last.end == span.start {
            last.end = span.end;
            return;
        }
    }
    tokens.push((PayloadKind::Invalid, span));
}

/// Reclassify strings that are followed by a colon as object keys.
fn mark_keys(tokens: &mut [(PayloadKind, Range<usize>)], fragment: &str) {
    for i in 0..tokens.len() {
        if tokens[i].0 != PayloadKind::String {
            continue;
        }
        let next = tokens[i + 1..]
            .iter()
            .find(|(kind, _)| *kind != PayloadKind::Whitespace);
        if let Some((PayloadKind::Punctuation, span)) = next {
            if &fragment[span.clone()] == ":" {
                tokens[i].0 = PayloadKind::Key;
            }
        }
    }
}
