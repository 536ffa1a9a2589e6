//! DFA lexer mapping source bytes to lexical [`mmd_token::TokenKind`] tokens
//! (spec.md §4.2).
//!
//! Grounded on the grounding repository's `lexer.rs`: a private, Logos-derived
//! `RawKind` enum does the actual scanning (Logos needs its own enum to
//! derive on), and [`to_arena_kind`](RawKind::to_arena_kind) narrows each
//! match down to the shared `mmd_token::TokenKind` the rest of the pipeline
//! speaks. Same lossless guarantee as the grounding repository: every byte of
//! the input appears in exactly one token, so `tokens.iter().map(|t|
//! t.text).collect::<String>() == input` always holds.
//!
//! Two differences from the grounding repository's lexer follow directly
//! from spec.md §4.2:
//!
//! - Runs of a single significant punctuation character (`*`, `_`, `` ` ``,
//!   `~`, `^`, `#`) are lexed as *one* token with `len` equal to the run
//!   length, not one token per character. The ambidextrous resolver and
//!   pairing engine (§4.5, §4.6) need the run length to decide how many
//!   delimiters a token can still contribute after partial consumption, and
//!   reading it off a single token is simpler than counting siblings.
//! - Leading-whitespace runs are split into indent units after the Logos
//!   match: a run of spaces becomes a sequence of 4-space
//!   `WhitespaceIndentSpace` tokens followed by a single
//!   `WhitespaceNonIndent` remainder, and a run of tabs becomes one
//!   `WhitespaceIndentTab` token per tab. This is still lexical (no line or
//!   nesting context is consulted); it just factors the run into the units
//!   spec.md §4.2 names.

use logos::Logos;
use mmd_token::TokenKind;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
enum RawKind {
    #[regex(r"[ ]{2,}\r?\n")]
    Linebreak,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[ ]+")]
    Spaces,

    #[regex(r"\t+")]
    Tabs,

    #[regex(r"[0-9]+")]
    Digits,

    #[regex(r"\*+")]
    Star,

    #[regex(r"_+")]
    Underscore,

    #[regex(r"`+")]
    Backtick,

    #[regex(r"~+")]
    Tilde,

    #[regex(r"\^+")]
    Caret,

    #[regex(r"#+")]
    Hash,

    #[token("\\")]
    Backslash,

    #[regex(r"=+")]
    Equal,

    #[regex(r"-+")]
    Dash,

    #[token(":")]
    Colon,

    #[token("|")]
    Pipe,

    #[token("<!--")]
    CommentOpen,

    #[token("-->")]
    CommentClose,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("[^")]
    FootnoteBracketOpen,

    #[token("[#")]
    CitationBracketOpen,

    #[token("[?")]
    GlossaryBracketOpen,

    #[token("[>")]
    AbbrBracketOpen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("!")]
    Bang,

    #[token("+")]
    Plus,

    #[token("'")]
    Apostrophe,

    #[token("\"")]
    DoubleQuote,

    #[regex(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}\u{2026}]")]
    TypographicMark,

    #[regex(r"\${1,2}")]
    Math,

    /// Anything not matched above, grouped into runs for efficiency. Digits
    /// are excluded so a digit run always lexes as [`RawKind::Digits`]
    /// instead of competing for the same match length as `Text` (ordered
    /// list markers and footnote/citation numbering need the split).
    #[regex(r#"[^\s0-9\*_`~\^#\\=\-:|<>\[\]\(\)\{\}!+'"\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}\u{2026}\$]+"#)]
    Text,
}

impl RawKind {
    /// Narrow a non-run, non-whitespace match straight to its arena kind.
    /// Run-splitting kinds (`Spaces`, `Tabs`) and length-sensitive kinds
    /// (`Math`) are handled by the caller, not here.
    fn to_arena_kind(self, len: usize) -> TokenKind {
        match self {
            RawKind::Linebreak => TokenKind::Linebreak,
            RawKind::Newline => TokenKind::Newline,
            RawKind::Spaces | RawKind::Tabs => {
                unreachable!("whitespace runs are split before arena-kind lookup")
            }
            RawKind::Digits => TokenKind::Digits,
            RawKind::Star => TokenKind::Star,
            RawKind::Underscore => TokenKind::Underscore,
            RawKind::Backtick => TokenKind::Backtick,
            RawKind::Tilde => TokenKind::Tilde,
            RawKind::Caret => TokenKind::Caret,
            RawKind::Hash => TokenKind::Hash,
            RawKind::Backslash => TokenKind::Backslash,
            RawKind::Equal => TokenKind::Equal,
            RawKind::Dash => TokenKind::Dash,
            RawKind::Colon => TokenKind::Colon,
            RawKind::Pipe => TokenKind::Pipe,
            RawKind::CommentOpen => TokenKind::CommentOpen,
            RawKind::CommentClose => TokenKind::CommentClose,
            RawKind::Lt => TokenKind::Lt,
            RawKind::Gt => TokenKind::Gt,
            RawKind::FootnoteBracketOpen => TokenKind::FootnoteBracketOpen,
            RawKind::CitationBracketOpen => TokenKind::CitationBracketOpen,
            RawKind::GlossaryBracketOpen => TokenKind::GlossaryBracketOpen,
            RawKind::AbbrBracketOpen => TokenKind::AbbrBracketOpen,
            RawKind::LBracket => TokenKind::LBracket,
            RawKind::RBracket => TokenKind::RBracket,
            RawKind::LParen => TokenKind::LParen,
            RawKind::RParen => TokenKind::RParen,
            RawKind::LBrace => TokenKind::LBrace,
            RawKind::RBrace => TokenKind::RBrace,
            RawKind::Bang => TokenKind::Bang,
            RawKind::Plus => TokenKind::Plus,
            RawKind::Apostrophe => TokenKind::Apostrophe,
            RawKind::DoubleQuote => TokenKind::DoubleQuote,
            RawKind::TypographicMark => TokenKind::TypographicMark,
            RawKind::Math => {
                if len == 1 { TokenKind::MathOpenSingle } else { TokenKind::MathOpenDouble }
            }
            RawKind::Text => TokenKind::Text,
        }
    }
}

/// A lexed token: its arena kind and the exact source slice it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Split a run of `n` spaces into `n / 4` `WhitespaceIndentSpace(4)` tokens
/// followed by a `WhitespaceNonIndent` remainder (omitted if empty).
fn push_space_run<'a>(out: &mut Vec<Token<'a>>, text: &'a str) {
    let mut rest = text;
    while rest.len() >= 4 {
        let (chunk, tail) = rest.split_at(4);
        out.push(Token { kind: TokenKind::WhitespaceIndentSpace, text: chunk });
        rest = tail;
    }
    if !rest.is_empty() {
        out.push(Token { kind: TokenKind::WhitespaceNonIndent, text: rest });
    }
}

/// Split a run of `n` tabs into `n` individual `WhitespaceIndentTab` tokens
/// (each tab is one indent unit, per spec.md §4.2).
fn push_tab_run<'a>(out: &mut Vec<Token<'a>>, text: &'a str) {
    let mut rest = text;
    while !rest.is_empty() {
        let (chunk, tail) = rest.split_at(1);
        out.push(Token { kind: TokenKind::WhitespaceIndentTab, text: chunk });
        rest = tail;
    }
}

/// Lex `input` into a flat token sequence. Guarantees that concatenating
/// every token's `text` reproduces `input` exactly (spec.md §4.2 "no byte
/// dropped, no byte double-counted").
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = RawKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        match result {
            Ok(RawKind::Spaces) => push_space_run(&mut tokens, text),
            Ok(RawKind::Tabs) => push_tab_run(&mut tokens, text),
            Ok(raw) => tokens.push(Token { kind: raw.to_arena_kind(text.len()), text }),
            // An unrecognized byte (e.g. a stray control character) is folded
            // into plain text rather than dropped, preserving the coverage
            // guarantee.
            Err(()) => tokens.push(Token { kind: TokenKind::Text, text }),
        }
    }

    tokens
}

/// Lex `input`, pairing each token with its absolute byte span.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let tokens = lex(input);
    let mut offset = 0usize;
    tokens
        .into_iter()
        .map(|t| {
            let span = offset..offset + t.text.len();
            offset = span.end;
            (t, span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: TokenKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        assert_eq!(lex("hello"), vec![token(TokenKind::Text, "hello")]);
    }

    #[test]
    fn lex_heading_marker_is_one_run_token() {
        let tokens = lex("### Title");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::Hash, "###"),
                token(TokenKind::WhitespaceNonIndent, " "),
                token(TokenKind::Text, "Title"),
            ]
        );
    }

    #[test]
    fn lex_strong_emphasis_run() {
        let tokens = lex("**bold**");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::Star, "**"),
                token(TokenKind::Text, "bold"),
                token(TokenKind::Star, "**"),
            ]
        );
    }

    #[test]
    fn lex_fence_backtick_run() {
        let tokens = lex("```rust");
        assert_eq!(
            tokens,
            vec![token(TokenKind::Backtick, "```"), token(TokenKind::Text, "rust"),]
        );
    }

    #[test]
    fn lex_four_space_indent_is_one_token() {
        let tokens = lex("    code");
        assert_eq!(
            tokens,
            vec![token(TokenKind::WhitespaceIndentSpace, "    "), token(TokenKind::Text, "code"),]
        );
    }

    #[test]
    fn lex_five_space_indent_splits_remainder() {
        let tokens = lex("     code");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::WhitespaceIndentSpace, "    "),
                token(TokenKind::WhitespaceNonIndent, " "),
                token(TokenKind::Text, "code"),
            ]
        );
    }

    #[test]
    fn lex_two_space_run_is_non_indent() {
        let tokens = lex("a  b");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::Text, "a"),
                token(TokenKind::WhitespaceNonIndent, "  "),
                token(TokenKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn lex_tab_run_is_one_token_per_tab() {
        let tokens = lex("\t\tcode");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::WhitespaceIndentTab, "\t"),
                token(TokenKind::WhitespaceIndentTab, "\t"),
                token(TokenKind::Text, "code"),
            ]
        );
    }

    #[test]
    fn lex_linebreak_consumes_trailing_spaces_and_newline() {
        let tokens = lex("line  \nnext");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::Text, "line"),
                token(TokenKind::Linebreak, "  \n"),
                token(TokenKind::Text, "next"),
            ]
        );
    }

    #[test]
    fn lex_footnote_bracket_outranks_plain_bracket() {
        let tokens = lex("[^note]");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::FootnoteBracketOpen, "[^"),
                token(TokenKind::Text, "note"),
                token(TokenKind::RBracket, "]"),
            ]
        );
    }

    #[test]
    fn lex_html_comment_markers() {
        let tokens = lex("<!--hi-->");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::CommentOpen, "<!--"),
                token(TokenKind::Text, "hi"),
                token(TokenKind::CommentClose, "-->"),
            ]
        );
    }

    #[test]
    fn lex_math_delimiters_by_length() {
        let tokens = lex("$x$ $$y$$");
        assert_eq!(
            tokens,
            vec![
                token(TokenKind::MathOpenSingle, "$"),
                token(TokenKind::Text, "x"),
                token(TokenKind::MathOpenSingle, "$"),
                token(TokenKind::WhitespaceNonIndent, " "),
                token(TokenKind::MathOpenDouble, "$$"),
                token(TokenKind::Text, "y"),
                token(TokenKind::MathOpenDouble, "$$"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "# Heading\n\n> quote *em* **strong**\n\n```rust\ncode\n```\n\n[^1]: note\n";
        let tokens = lex(input);
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn all_bytes_preserved_with_crlf_and_unicode() {
        let input = "line one  \r\nline two\n\u{2014}em dash\u{2026}\n";
        let tokens = lex(input);
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "## Title\ntext";
        let tokens = lex_with_spans(input);
        for (token, span) in &tokens {
            assert_eq!(token.text, &input[span.clone()]);
        }
    }
}
