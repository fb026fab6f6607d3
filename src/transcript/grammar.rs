//! Transcript Grammar Rules
//!
//! The transcript grammar is a declarative, ordered table of rules. Each rule
//! is a regex anchored at the current scan offset, plus one role per capture
//! group telling the scanner how to classify that group.
//!
//! # Rule Order
//!
//! Rules are tried in declaration order, the first match wins:
//!
//! 1. idn_query - `> *IDN?`
//! 2. idn_reply - `< ISSE...`, vendor identification reply
//! 3. payload_record - record whose payload opens with `{`, enters payload mode
//! 4. plain_record - record with trailing text (or nothing) up to end of line
//! 5. ellipsis - `...` alone on a line
//! 6. comment - `# ` up to end of line
//! 7. whitespace - any whitespace, newlines included
//! 8. stray_brace - a brace outside of a payload
//! 9. literal - any other non-blank run
//!
//! Rules 7 to 9 together match every character, so the table is total.
//!
//! Record prefix grammar, shared by rules 3 and 4:
//!
//!     (<prompt> <blank>)? <keyword> (<blank> <identifier> <qualifier>?)?
//!
//! Keywords start with a word character, so comments and ellipses never read
//! as records.

use once_cell::sync::Lazy;
use regex::Regex;

use super::token::TokenKind;
use super::LexerOptions;

/// How the scanner handles one capture group of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Emit the group as a single token of this kind
    Emit(TokenKind),
    /// Emit a `{` as punctuation and enter payload mode
    OpenPayload,
    /// Trailing record text, a literal unless trailing payloads are enabled
    Trailing,
}

/// A named grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub regex: Regex,
    /// Role of each capture group, index 0 describes group 1
    pub captures: &'static [Capture],
}

/// Error raised when a grammar fails to compile
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("rule '{rule}' failed to compile: {source}")]
    InvalidRule {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },
}

const PROMPT: &str = r"(?:([<>])([ \t]+))?";
const KEYWORD: &str = r"(\w[^\s{}]*)";
const TARGET: &str = r"(?:([ \t]+)([^\s:{}]+)(:\w+)?)?";
const END_OF_LINE: &str = r"(?mR:$)";

const PREFIX_CAPTURES: [Capture; 6] = [
    Capture::Emit(TokenKind::Prompt),
    Capture::Emit(TokenKind::Whitespace),
    Capture::Emit(TokenKind::Keyword),
    Capture::Emit(TokenKind::Whitespace),
    Capture::Emit(TokenKind::Identifier),
    Capture::Emit(TokenKind::Qualifier),
];

const IDN_QUERY_CAPTURES: &[Capture] = &[
    Capture::Emit(TokenKind::Prompt),
    Capture::Emit(TokenKind::Whitespace),
    Capture::Emit(TokenKind::Keyword),
    Capture::Emit(TokenKind::Whitespace),
];

const IDN_REPLY_CAPTURES: &[Capture] = &[
    Capture::Emit(TokenKind::Prompt),
    Capture::Emit(TokenKind::Whitespace),
    Capture::Emit(TokenKind::Literal),
];

const PAYLOAD_RECORD_CAPTURES: &[Capture] = &[
    PREFIX_CAPTURES[0],
    PREFIX_CAPTURES[1],
    PREFIX_CAPTURES[2],
    PREFIX_CAPTURES[3],
    PREFIX_CAPTURES[4],
    PREFIX_CAPTURES[5],
    Capture::Emit(TokenKind::Whitespace),
    Capture::OpenPayload,
];

const PLAIN_RECORD_CAPTURES: &[Capture] = &[
    PREFIX_CAPTURES[0],
    PREFIX_CAPTURES[1],
    PREFIX_CAPTURES[2],
    PREFIX_CAPTURES[3],
    PREFIX_CAPTURES[4],
    PREFIX_CAPTURES[5],
    Capture::Emit(TokenKind::Whitespace),
    Capture::Trailing,
];

const ELLIPSIS_CAPTURES: &[Capture] = &[
    Capture::Emit(TokenKind::Ellipsis),
    Capture::Emit(TokenKind::Whitespace),
];

const COMMENT_CAPTURES: &[Capture] = &[Capture::Emit(TokenKind::Comment)];
const WHITESPACE_CAPTURES: &[Capture] = &[Capture::Emit(TokenKind::Whitespace)];
const STRAY_BRACE_CAPTURES: &[Capture] = &[Capture::Emit(TokenKind::Punctuation)];
const LITERAL_CAPTURES: &[Capture] = &[Capture::Emit(TokenKind::Literal)];

/// Rules that do not depend on lexer options, as (name, pattern, captures).
///
/// The identification reply rule is built separately because its pattern
/// depends on the configured vendor prefixes.
fn fixed_rules() -> [(&'static str, String, &'static [Capture]); 8] {
    [
        (
            "idn_query",
            format!(r"\A(>)([ \t]+)(\*IDN\?)([ \t]*){END_OF_LINE}"),
            IDN_QUERY_CAPTURES,
        ),
        (
            "payload_record",
            format!(r"\A{PROMPT}{KEYWORD}{TARGET}([ \t]+)(\{{)"),
            PAYLOAD_RECORD_CAPTURES,
        ),
        (
            "plain_record",
            format!(r"\A{PROMPT}{KEYWORD}{TARGET}(?:([ \t]+)([^\r\n]*))?{END_OF_LINE}"),
            PLAIN_RECORD_CAPTURES,
        ),
        (
            "ellipsis",
            format!(r"\A(\.\.\.|…)([ \t]*){END_OF_LINE}"),
            ELLIPSIS_CAPTURES,
        ),
        (
            "comment",
            format!(r"\A(#(?:[ \t][^\r\n]*)?){END_OF_LINE}"),
            COMMENT_CAPTURES,
        ),
        ("whitespace", r"\A(\s+)".to_string(), WHITESPACE_CAPTURES),
        ("stray_brace", r"\A([{}])".to_string(), STRAY_BRACE_CAPTURES),
        ("literal", r"\A([^\s{}]+)".to_string(), LITERAL_CAPTURES),
    ]
}

fn idn_reply_pattern(vendors: &[String]) -> Option<String> {
    let alternatives: Vec<String> = vendors
        .iter()
        .filter(|vendor| !vendor.is_empty())
        .map(|vendor| regex::escape(vendor))
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Some(format!(
        r"\A(<)([ \t]+)((?:{})[^\r\n]*)",
        alternatives.join("|")
    ))
}

fn compile(
    name: &'static str,
    pattern: &str,
    captures: &'static [Capture],
) -> Result<Rule, GrammarError> {
    let regex = Regex::new(pattern).map_err(|source| GrammarError::InvalidRule {
        rule: name,
        source,
    })?;
    debug_assert_eq!(regex.captures_len(), captures.len() + 1, "rule {name}");
    Ok(Rule {
        name,
        regex,
        captures,
    })
}

/// The compiled, ordered rule table.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Compile the rule table for the given options.
    pub fn new(options: &LexerOptions) -> Result<Self, GrammarError> {
        let mut fixed = fixed_rules().into_iter();
        let mut rules = Vec::with_capacity(9);

        // idn_query comes first, idn_reply right after it
        if let Some((name, pattern, captures)) = fixed.next() {
            rules.push(compile(name, &pattern, captures)?);
        }
        if let Some(pattern) = idn_reply_pattern(&options.idn_vendors) {
            rules.push(compile("idn_reply", &pattern, IDN_REPLY_CAPTURES)?);
        }
        for (name, pattern, captures) in fixed {
            rules.push(compile(name, &pattern, captures)?);
        }

        Ok(Grammar { rules })
    }

    /// Rules in match order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
}

/// Grammar for [LexerOptions::default].
pub static DEFAULT_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    Grammar::new(&LexerOptions::default()).expect("default grammar rules are valid")
});
