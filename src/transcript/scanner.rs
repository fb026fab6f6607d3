//! The transcript scanner
//!
//! [Tokens] is a lazy iterator over the tokens of one transcript. Each call to
//! `next` either drains a pending token or runs one scan step:
//!
//! - outside a payload, the first grammar rule matching at the current offset
//!   consumes its span and queues one token per participating capture group;
//! - inside a payload, a brace or newline becomes one token, any other run up
//!   to the next brace or newline is a fragment for the embedded lexer.
//!
//! Brace depth is tracked with a plain counter. Braces inside JSON strings are
//! counted as well, so a payload with an unbalanced brace in a string ends
//! early or late.

use std::collections::VecDeque;
use std::ops::Range;

use super::grammar::{Capture, Rule};
use super::payload::EmbeddedLexer;
use super::token::{PayloadKind, Token, TokenKind};
use super::TranscriptLexer;

/// Position of the scanner in its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Byte offset of the first unscanned character
    pub offset: usize,
    /// Number of unmatched `{` in the current payload, zero outside payloads
    pub depth: usize,
}

impl ScanState {
    pub fn in_payload(&self) -> bool {
        self.depth > 0
    }
}

/// Lazy token stream over one transcript, see [TranscriptLexer::tokenize].
pub struct Tokens<'l, 'src, E: EmbeddedLexer> {
    lexer: &'l TranscriptLexer<E>,
    source: &'src str,
    state: ScanState,
    pending: VecDeque<Token<'src>>,
}

impl<'l, 'src, E: EmbeddedLexer> Tokens<'l, 'src, E> {
    pub(super) fn new(lexer: &'l TranscriptLexer<E>, source: &'src str) -> Self {
        Tokens {
            lexer,
            source,
            state: ScanState::default(),
            pending: VecDeque::new(),
        }
    }

    /// Scan state after the tokens produced so far.
    ///
    /// The offset runs ahead of the last returned token while a scan step
    /// still has pending tokens.
    pub fn state(&self) -> ScanState {
        self.state
    }

    fn scan(&mut self) {
        if self.state.in_payload() {
            self.scan_payload();
        } else {
            self.scan_record();
        }
    }

    fn scan_record(&mut self) {
        let (lexer, source) = (self.lexer, self.source);
        let start = self.state.offset;
        let rest = &source[start..];

        for rule in lexer.grammar().rules() {
            let Some(captures) = rule.regex.captures(rest) else {
                continue;
            };
            let whole = captures.get(0).map_or(0..0, |m| m.range());
            if whole.is_empty() {
                continue;
            }
            log::trace!("rule {} matched {:?} at {}", rule.name, whole, start);

            for (role, group) in rule.captures.iter().zip(captures.iter().skip(1)) {
                let Some(group) = group else { continue };
                let span = shift(group.range(), start);
                self.emit_capture(rule, *role, span);
            }
            self.state.offset = start + whole.end;
            return;
        }

        // The fallback rules cover every character, this only guards progress
        let width = rest.chars().next().map_or(rest.len(), char::len_utf8);
        self.push(TokenKind::Literal, start..start + width);
        self.state.offset = start + width;
    }

    fn emit_capture(&mut self, rule: &Rule, role: Capture, span: Range<usize>) {
        match role {
            Capture::Emit(kind) => self.push(kind, span),
            Capture::OpenPayload => {
                log::debug!("{} opened payload at {}", rule.name, span.start);
                self.push(TokenKind::Punctuation, span);
                self.state.depth = 1;
            }
            Capture::Trailing if self.lexer.options().trailing_payload => {
                self.push_fragment(span);
            }
            Capture::Trailing => self.push(TokenKind::Literal, span),
        }
    }

    fn scan_payload(&mut self) {
        let source = self.source;
        let start = self.state.offset;
        let rest = &source[start..];

        let end = match rest.as_bytes()[0] {
            b'{' => {
                self.state.depth += 1;
                self.push(TokenKind::Punctuation, start..start + 1);
                start + 1
            }
            b'}' => {
                self.state.depth = self.state.depth.saturating_sub(1);
                self.push(TokenKind::Punctuation, start..start + 1);
                if self.state.depth == 0 {
                    log::debug!("payload closed at {}", start + 1);
                }
                start + 1
            }
            b'\n' => {
                self.push(TokenKind::Whitespace, start..start + 1);
                start + 1
            }
            _ => {
                let len = rest
                    .find(|c| matches!(c, '{' | '}' | '\n'))
                    .unwrap_or(rest.len());
                self.push_fragment(start..start + len);
                start + len
            }
        };
        self.state.offset = end;
    }

    /// Queue the embedded lexer's tokens for `span`, filling any gaps it
    /// leaves with invalid payload tokens.
    fn push_fragment(&mut self, span: Range<usize>) {
        let source = self.source;
        let fragment = &source[span.clone()];
        let mut covered = 0;

        for (kind, inner) in self.lexer.embedded().tokenize_fragment(fragment) {
            if inner.start < covered
                || inner.end > fragment.len()
                || inner.is_empty()
                || !fragment.is_char_boundary(inner.start)
                || !fragment.is_char_boundary(inner.end)
            {
                continue;
            }
            if inner.start > covered {
                let gap = shift(covered..inner.start, span.start);
                self.push(TokenKind::Payload(PayloadKind::Invalid), gap);
            }
            covered = inner.end;
            self.push(TokenKind::Payload(kind), shift(inner, span.start));
        }
        if covered < fragment.len() {
            let gap = shift(covered..fragment.len(), span.start);
            self.push(TokenKind::Payload(PayloadKind::Invalid), gap);
        }
    }

    fn push(&mut self, kind: TokenKind, span: Range<usize>) {
        if !span.is_empty() {
            self.pending.push_back(Token::new(kind, self.source, span));
        }
    }
}

impl<'src, E: EmbeddedLexer> Iterator for Tokens<'_, 'src, E> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.state.offset >= self.source.len() {
                return None;
            }
            self.scan();
        }
    }
}

impl<E: EmbeddedLexer> std::iter::FusedIterator for Tokens<'_, '_, E> {}

fn shift(range: Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::LexerOptions;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        crate::transcript::tokenize(source)
            .map(|token| (token.kind, token.text))
            .collect()
    }

    /// An embedded lexer returning overlapping, out of range and partial spans
    struct SloppyLexer;

    impl EmbeddedLexer for SloppyLexer {
        fn tokenize_fragment(&self, fragment: &str) -> Vec<(PayloadKind, Range<usize>)> {
            if fragment.len() < 3 {
                return Vec::new();
            }
            vec![
                (PayloadKind::String, 1..2),
                (PayloadKind::String, 0..2),
                (PayloadKind::Number, 2..fragment.len() + 5),
            ]
        }
    }

    #[test]
    fn test_state_tracks_depth_across_lines() {
        let lexer: TranscriptLexer = TranscriptLexer::default();
        let mut tokens = lexer.tokenize("< reply mod1 {\n\"value\": 1}\n");

        let mut depth_at_newline = None;
        while let Some(token) = tokens.next() {
            if token.text == "\n" && depth_at_newline.is_none() {
                depth_at_newline = Some(tokens.state().depth);
            }
        }
        assert_eq!(depth_at_newline, Some(1));
        assert_eq!(tokens.state().depth, 0);
    }

    #[test]
    fn test_nested_braces() {
        let tokens = lex(r#"{"a": {"b": {}}}"#);
        // not a record, so the outer braces are stray punctuation
        assert_eq!(tokens[0], (TokenKind::Punctuation, "{"));

        let lexer: TranscriptLexer = TranscriptLexer::default();
        let mut stream = lexer.tokenize(r#"< describing . {"a": {"b": {}}} done"#);
        let collected: Vec<_> = stream.by_ref().collect();
        assert_eq!(stream.state().depth, 0);
        let braces = collected
            .iter()
            .filter(|t| t.kind == TokenKind::Punctuation)
            .count();
        assert_eq!(braces, 6);
        assert_eq!(
            collected.last().map(|t| (t.kind, t.text)),
            Some((TokenKind::Keyword, "done"))
        );
    }

    #[test]
    fn test_unterminated_payload_keeps_depth() {
        let lexer: TranscriptLexer = TranscriptLexer::default();
        let mut tokens = lexer.tokenize("< reply mod1 {\"value\": {");
        let last = tokens.by_ref().last();
        assert_eq!(last.map(|t| t.kind), Some(TokenKind::Punctuation));
        assert_eq!(tokens.state().depth, 2);
    }

    #[test]
    fn test_stray_closing_brace_is_punctuation() {
        assert_eq!(
            lex("}\n> read"),
            vec![
                (TokenKind::Punctuation, "}"),
                (TokenKind::Whitespace, "\n"),
                (TokenKind::Prompt, ">"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Keyword, "read"),
            ]
        );
    }

    #[test]
    fn test_braces_in_strings_are_counted() {
        let lexer: TranscriptLexer = TranscriptLexer::default();
        let mut tokens = lexer.tokenize(r#"< reply mod1 {"unit": "{"}"#);
        tokens.by_ref().for_each(drop);
        assert_eq!(tokens.state().depth, 1);
    }

    #[test]
    fn test_trailing_payload_option() {
        let options = LexerOptions {
            trailing_payload: true,
            ..LexerOptions::default()
        };
        let lexer = TranscriptLexer::new(&options).unwrap();
        let tokens: Vec<_> = lexer
            .tokenize("< reply mod1:value [1.5, {}]")
            .map(|t| (t.kind, t.text))
            .collect();
        assert_eq!(
            &tokens[7..10],
            &[
                (TokenKind::Payload(PayloadKind::Punctuation), "["),
                (TokenKind::Payload(PayloadKind::Number), "1.5"),
                (TokenKind::Payload(PayloadKind::Punctuation), ","),
            ]
        );
    }

    #[test]
    fn test_sloppy_embedded_lexer_still_covers_input() {
        let lexer = TranscriptLexer::with_embedded(&LexerOptions::default(), SloppyLexer).unwrap();
        let source = "< reply m {abcd}\n< reply m {xy}";
        let text: String = lexer.tokenize(source).map(|t| t.text).collect();
        assert_eq!(text, source);

        let payload: Vec<_> = lexer
            .tokenize("< reply m {abcd}")
            .filter(|t| matches!(t.kind, TokenKind::Payload(_)))
            .map(|t| (t.kind, t.text))
            .collect();
        assert_eq!(
            payload,
            vec![
                (TokenKind::Payload(PayloadKind::Invalid), "a"),
                (TokenKind::Payload(PayloadKind::String), "b"),
                (TokenKind::Payload(PayloadKind::Invalid), "cd"),
            ]
        );
    }

    #[test]
    fn test_early_drop() {
        let lexer: TranscriptLexer = TranscriptLexer::default();
        let first: Vec<_> = lexer.tokenize("> read mod1:cur\n> *IDN?").take(2).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, TokenKind::Prompt);
    }

    #[test]
    fn test_empty_input() {
        assert!(lex("").is_empty());
    }
}
