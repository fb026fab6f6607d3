//! Property-based tests for the transcript lexer
//!
//! These tests check the stream invariants on arbitrary text and on generated
//! transcripts: the tokens partition the input, brace depth settles back to
//! zero for balanced payloads, and single-line records classify the same in
//! isolation as inside a document.

use proptest::prelude::*;
use secop_lexer::{tokenize, TokenKind};

/// Non-whitespace tokens as (kind, text) pairs
fn significant(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .filter(|t| !t.kind.is_whitespace())
        .map(|t| (t.kind, t.text.to_string()))
        .collect()
}

/// Generate single-line transcript records
fn record_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("> *IDN?".to_string()),
        "< ISSE[A-Za-z0-9,&._-]{0,12}",
        "[<>] (read|change|do|reply|changed|update|ping|pong) [a-z][a-z0-9_]{0,5}(:[a-z]{1,6})?",
        "[<>] (change|changed|update) [a-z]{1,4}:[a-z]{1,4} \\[[0-9.]{1,5}, \\{\\}\\]",
        "< (reply|describing|update) [a-z.]{1,4} \\{\"[a-z]{1,5}\": [0-9]{1,3}\\}",
        "(describe|activate|deactivate)",
        "# [a-z ]{0,12}",
        Just("...".to_string()),
    ]
}

/// Generate brace-balanced payload bodies, possibly spanning lines
fn balanced_body_strategy() -> impl Strategy<Value = String> {
    let leaf = "[a-z0-9\": ,\\n\\[\\]]{0,8}";
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|parts| format!("{{{}}}", parts.join(",")))
    })
}

proptest! {
    #[test]
    fn test_tokens_partition_input(source in any::<String>()) {
        let mut expected_start = 0;
        for token in tokenize(&source) {
            prop_assert_eq!(token.span.start, expected_start);
            prop_assert!(!token.span.is_empty());
            prop_assert_eq!(token.text, &source[token.span.clone()]);
            expected_start = token.span.end;
        }
        prop_assert_eq!(expected_start, source.len());
    }

    #[test]
    fn test_transcript_text_partitions_input(source in "[<>{}\\[\\]\":, a-z0-9.#*?\\n\\t]{0,80}") {
        let rebuilt: String = tokenize(&source).map(|t| t.text).collect();
        prop_assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_tokenizing_is_deterministic(source in "[<>{}\":, a-z0-9.#\\n]{0,60}") {
        let first: Vec<_> = tokenize(&source).collect();
        let second: Vec<_> = tokenize(&source).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_balanced_payload_returns_to_zero_depth(body in balanced_body_strategy()) {
        let source = format!("< describing . {{{body}}}\n> read T");
        let mut tokens = tokenize(&source);
        let last = tokens.by_ref().last();
        prop_assert_eq!(tokens.state().depth, 0);
        prop_assert_eq!(last.map(|t| (t.kind, t.text)), Some((TokenKind::Identifier, "T")));
    }

    #[test]
    fn test_lines_classify_like_documents(
        lines in prop::collection::vec(record_line_strategy(), 1..10)
    ) {
        let document = lines.join("\n");
        let per_line: Vec<_> = lines.iter().flat_map(|line| significant(line)).collect();
        prop_assert_eq!(significant(&document), per_line);
    }
}
