//! Line classifier (spec.md §4.3).
//!
//! Groups the flat lexical token stream from `mmd-lexer` into physical
//! lines and assigns each line exactly one `Line*` [`TokenKind`]. Carries
//! the two pieces of cross-line state the spec calls out explicitly:
//! `allow_meta` (metadata lines stop being recognized once a non-meta,
//! non-YAML line is seen) and open-fence tracking (to tell a fence's
//! opening line from its closing line). A third piece of state,
//! `prev_kind`, resolves the setext-vs-thematic-break ambiguity: a run of
//! `=`/`-` only becomes a setext underline when the line immediately
//! before it was plain text.

use mmd_lexer::Token as LexToken;
use mmd_token::TokenKind;

/// One token within a classified line, still borrowing from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> From<&LexToken<'a>> for LineToken<'a> {
    fn from(t: &LexToken<'a>) -> Self {
        LineToken { kind: t.kind, text: t.text }
    }
}

/// A classified physical line: its decided kind, its content tokens
/// (leading non-indent whitespace already stripped, markers already
/// rewritten), and the line terminator that followed it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub kind: TokenKind,
    pub tokens: Vec<LineToken<'a>>,
    pub terminator: Option<LineToken<'a>>,
    /// Bytes stripped from the source immediately before this line's first
    /// token that the arena still needs to account for in its running
    /// cursor, even though they produce no tree node (a container's `>` or
    /// list-indent prefix on every line after the first — spec.md §4.4).
    /// Zero for ordinary top-level lines.
    pub gap_before: u32,
}

impl<'a> ClassifiedLine<'a> {
    /// Total byte length of content tokens plus terminator, for cursor
    /// bookkeeping by the block grammar.
    pub fn byte_len(&self) -> usize {
        let content: usize = self.tokens.iter().map(|t| t.text.len()).sum();
        content + self.terminator.as_ref().map_or(0, |t| t.text.len())
    }
}

#[derive(Debug, Clone, Copy)]
struct FenceState {
    ch: TokenKind,
    len: u32,
}

/// Sequential classifier state threaded across lines of one document.
pub struct Classifier {
    allow_meta: bool,
    at_doc_start: bool,
    fence_open: Option<FenceState>,
    prev_kind: Option<TokenKind>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self { allow_meta: true, at_doc_start: true, fence_open: None, prev_kind: None }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify an entire token stream into physical lines.
    pub fn classify<'a>(&mut self, tokens: &[LexToken<'a>]) -> Vec<ClassifiedLine<'a>> {
        let mut out = Vec::new();
        let mut current: Vec<LineToken<'a>> = Vec::new();

        for tok in tokens {
            if matches!(tok.kind, TokenKind::Newline | TokenKind::Linebreak) {
                let line = self.classify_line(std::mem::take(&mut current), Some(tok.into()));
                out.push(line);
            } else {
                current.push(tok.into());
            }
        }
        if !current.is_empty() {
            let line = self.classify_line(current, None);
            out.push(line);
        }
        out
    }

    /// Classify a single already-split line. Exposed (beyond the
    /// whole-document [`Classifier::classify`]) so a container block (a
    /// blockquote, a list item) can strip its prefix tokens and
    /// reclassify the remainder as a nested line without losing the
    /// tokens' original source offsets or re-lexing anything.
    pub fn classify_line<'a>(
        &mut self,
        mut tokens: Vec<LineToken<'a>>,
        terminator: Option<LineToken<'a>>,
    ) -> ClassifiedLine<'a> {
        let is_doc_start = self.at_doc_start;
        self.at_doc_start = false;

        // Leading non-indent space is insignificant and stripped (spec.md §4.3).
        if matches!(tokens.first().map(|t| t.kind), Some(TokenKind::WhitespaceNonIndent)) {
            tokens.remove(0);
        }

        let kind = self.decide_kind(&tokens, is_doc_start);
        rewrite_marker_token(kind, &mut tokens);

        // The metadata window stays open only through meta/YAML-marker
        // lines; any other line (including a blank one) closes it for the
        // rest of the document (spec.md §4.3).
        if !matches!(kind, TokenKind::LineMeta | TokenKind::LineYamlMarker) {
            self.allow_meta = false;
        }

        self.prev_kind = Some(kind);
        ClassifiedLine { kind, tokens, terminator, gap_before: 0 }
    }

    fn decide_kind(&mut self, tokens: &[LineToken<'_>], is_doc_start: bool) -> TokenKind {
        // Indent check happens before emptiness: an indent token followed by
        // nothing is still "empty", not "indented" (spec.md §4.3).
        if let Some(first) = tokens.first() {
            if matches!(
                first.kind,
                TokenKind::WhitespaceIndentSpace | TokenKind::WhitespaceIndentTab
            ) {
                if tokens.len() == 1 {
                    return TokenKind::LineEmpty;
                }
                return if first.kind == TokenKind::WhitespaceIndentSpace {
                    TokenKind::LineIndentedSpace
                } else {
                    TokenKind::LineIndentedTab
                };
            }
        }

        if tokens.is_empty() {
            return TokenKind::LineEmpty;
        }

        if let Some(kind) = self.classify_fence(tokens) {
            return kind;
        }
        if let Some(kind) = classify_atx(tokens) {
            return kind;
        }
        if let Some(kind) = self.classify_rule_or_setext(tokens, is_doc_start) {
            return kind;
        }
        if is_toc_marker(tokens) {
            return TokenKind::LineToc;
        }
        if matches!(tokens.first().map(|t| t.kind), Some(TokenKind::Gt)) {
            return TokenKind::LineBlockquote;
        }
        if is_html_start(tokens) {
            return TokenKind::LineHtml;
        }
        if matches!(tokens.first().map(|t| t.kind), Some(TokenKind::CommentOpen)) {
            return TokenKind::LineStartComment;
        }
        if matches!(tokens.first().map(|t| t.kind), Some(TokenKind::CommentClose)) {
            return TokenKind::LineStopComment;
        }
        if let Some(kind) = classify_bulleted(tokens) {
            return kind;
        }
        if let Some(kind) = classify_enumerated(tokens) {
            return kind;
        }
        if let Some(kind) = classify_reference_definition(tokens) {
            return kind;
        }
        if matches!(tokens.first().map(|t| t.kind), Some(TokenKind::Colon)) {
            return TokenKind::LineDefinition;
        }
        if self.allow_meta && is_meta_line(tokens) {
            return TokenKind::LineMeta;
        }
        if is_table_separator(tokens) {
            return TokenKind::LineTableSeparator;
        }
        if tokens.iter().any(|t| t.kind == TokenKind::Pipe) {
            return TokenKind::LineTable;
        }
        if self.prev_kind.is_some() && self.prev_kind != Some(TokenKind::LineEmpty) {
            return TokenKind::LineContinuation;
        }
        TokenKind::LinePlain
    }

    fn classify_fence(&mut self, tokens: &[LineToken<'_>]) -> Option<TokenKind> {
        let first = tokens.first();
        let run = first.filter(|t| matches!(t.kind, TokenKind::Backtick | TokenKind::Tilde));

        if let Some(state) = self.fence_open {
            // Inside an open fence every line is literal content unless it
            // matches the close: same character family, length >= opener's
            // (spec.md open question: "preserve closer-length >= opener-length").
            if let Some(run) = run {
                let len = run.text.len() as u32;
                if run.kind == state.ch && len >= state.len && tokens.len() == 1 {
                    self.fence_open = None;
                    return Some(TokenKind::LineFenceClose);
                }
            }
            return Some(TokenKind::LinePlain);
        }

        let run = run?;
        let len = run.text.len() as u32;
        if len < 3 {
            return None;
        }
        self.fence_open = Some(FenceState { ch: run.kind, len });
        Some(TokenKind::LineFenceStart)
    }

    fn classify_rule_or_setext(
        &mut self,
        tokens: &[LineToken<'_>],
        is_doc_start: bool,
    ) -> Option<TokenKind> {
        let significant: Vec<&LineToken<'_>> = tokens
            .iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::WhitespaceNonIndent
                        | TokenKind::WhitespaceIndentSpace
                        | TokenKind::WhitespaceIndentTab
                )
            })
            .collect();
        if significant.is_empty() {
            return None;
        }
        let kind = significant[0].kind;
        if !matches!(kind, TokenKind::Dash | TokenKind::Star | TokenKind::Underscore | TokenKind::Equal)
        {
            return None;
        }
        if !significant.iter().all(|t| t.kind == kind) {
            return None;
        }
        let total: usize = significant.iter().map(|t| t.text.len()).sum();

        if kind == TokenKind::Dash && total == 3 && is_doc_start {
            return Some(TokenKind::LineYamlMarker);
        }
        let prev_was_plain = matches!(self.prev_kind, Some(TokenKind::LinePlain));
        match kind {
            TokenKind::Equal if prev_was_plain => Some(TokenKind::LineSetext1),
            TokenKind::Dash if prev_was_plain => Some(TokenKind::LineSetext2),
            TokenKind::Dash | TokenKind::Star | TokenKind::Underscore if total >= 3 => {
                Some(TokenKind::LineHr)
            }
            _ => None,
        }
    }
}

fn classify_atx(tokens: &[LineToken<'_>]) -> Option<TokenKind> {
    let first = tokens.first()?;
    if first.kind != TokenKind::Hash {
        return None;
    }
    let level = first.text.len().clamp(1, 6);
    // A following space, or end of line, confirms an ATX heading rather
    // than a stray `#` run inside plain text.
    let confirmed = tokens.len() == 1
        || matches!(
            tokens[1].kind,
            TokenKind::WhitespaceNonIndent | TokenKind::WhitespaceIndentSpace
        );
    if !confirmed {
        return None;
    }
    Some(match level {
        1 => TokenKind::LineAtx1,
        2 => TokenKind::LineAtx2,
        3 => TokenKind::LineAtx3,
        4 => TokenKind::LineAtx4,
        5 => TokenKind::LineAtx5,
        _ => TokenKind::LineAtx6,
    })
}

fn is_toc_marker(tokens: &[LineToken<'_>]) -> bool {
    if tokens.len() != 3 {
        return false;
    }
    tokens[0].kind == TokenKind::LBracket
        && tokens[1].kind == TokenKind::Text
        && tokens[1].text.eq_ignore_ascii_case("toc")
        && tokens[2].kind == TokenKind::RBracket
}

fn is_html_start(tokens: &[LineToken<'_>]) -> bool {
    let first = match tokens.first() {
        Some(t) => t,
        None => return false,
    };
    if first.kind != TokenKind::Lt {
        return false;
    }
    matches!(
        tokens.get(1).map(|t| t.kind),
        Some(TokenKind::Text | TokenKind::Bang)
    )
}

/// `- `, `* `, `+ ` markers. Rewrites the marker token to
/// `MarkerListBullet` in place.
fn classify_bulleted(tokens: &[LineToken<'_>]) -> Option<TokenKind> {
    let first = tokens.first()?;
    let is_marker_char = matches!(first.kind, TokenKind::Dash | TokenKind::Star | TokenKind::Plus);
    if !is_marker_char || first.text.len() != 1 {
        return None;
    }
    let followed_by_space = matches!(
        tokens.get(1).map(|t| t.kind),
        Some(TokenKind::WhitespaceNonIndent | TokenKind::WhitespaceIndentSpace)
    );
    if !followed_by_space {
        return None;
    }
    Some(TokenKind::LineBulleted)
}

/// `123.` or `123)` followed by whitespace.
fn classify_enumerated(tokens: &[LineToken<'_>]) -> Option<TokenKind> {
    if tokens.first()?.kind != TokenKind::Digits {
        return None;
    }
    let delim = tokens.get(1)?;
    let is_delim = delim.kind == TokenKind::RParen || delim.text == ".";
    if !is_delim {
        return None;
    }
    let followed_by_space = matches!(
        tokens.get(2).map(|t| t.kind),
        Some(TokenKind::WhitespaceNonIndent | TokenKind::WhitespaceIndentSpace) | None
    );
    if !followed_by_space {
        return None;
    }
    Some(TokenKind::LineEnumerated)
}

/// `[label]:`, `[#label]:`, `[^label]:`, `[>label]:`, `[?label]:`.
fn classify_reference_definition(tokens: &[LineToken<'_>]) -> Option<TokenKind> {
    let first = tokens.first()?;
    let kind_for_open = match first.kind {
        TokenKind::LBracket => TokenKind::LineDefLink,
        TokenKind::CitationBracketOpen => TokenKind::LineDefCitation,
        TokenKind::FootnoteBracketOpen => TokenKind::LineDefFootnote,
        TokenKind::AbbrBracketOpen => TokenKind::LineDefAbbreviation,
        TokenKind::GlossaryBracketOpen => TokenKind::LineDefGlossary,
        _ => return None,
    };
    // Require a closing `]` followed by `:` somewhere on the line.
    let mut saw_close_colon = false;
    for i in 1..tokens.len() {
        if tokens[i].kind == TokenKind::RBracket
            && matches!(tokens.get(i + 1).map(|t| t.kind), Some(TokenKind::Colon))
        {
            saw_close_colon = true;
            break;
        }
    }
    if !saw_close_colon {
        return None;
    }
    Some(kind_for_open)
}

/// Rewrite a line's leading marker token in place once its kind confirms
/// what it is, per spec.md §4.3 ("rewrite the marker token as
/// `MARKER_LIST_BULLET`" and the analogous setext rule).
fn rewrite_marker_token(kind: TokenKind, tokens: &mut [LineToken<'_>]) {
    match kind {
        TokenKind::LineBulleted => {
            if let Some(t) = tokens.first_mut() {
                t.kind = TokenKind::MarkerListBullet;
            }
        }
        TokenKind::LineEnumerated => {
            if let Some(t) = tokens.first_mut() {
                t.kind = TokenKind::MarkerListEnumerator;
            }
        }
        TokenKind::LineSetext1 | TokenKind::LineSetext2 => {
            let marker = if kind == TokenKind::LineSetext1 {
                TokenKind::MarkerSetext1
            } else {
                TokenKind::MarkerSetext2
            };
            if let Some(t) = tokens.iter_mut().find(|t| matches!(t.kind, TokenKind::Equal | TokenKind::Dash))
            {
                t.kind = marker;
            }
        }
        _ => {}
    }
}

fn is_meta_line(tokens: &[LineToken<'_>]) -> bool {
    tokens.first().map(|t| t.kind) == Some(TokenKind::Text)
        && tokens.iter().any(|t| t.kind == TokenKind::Colon)
}

fn is_table_separator(tokens: &[LineToken<'_>]) -> bool {
    !tokens.is_empty()
        && tokens.iter().all(|t| {
            matches!(
                t.kind,
                TokenKind::Dash
                    | TokenKind::Colon
                    | TokenKind::Pipe
                    | TokenKind::WhitespaceNonIndent
                    | TokenKind::WhitespaceIndentSpace
            )
        })
        && tokens.iter().any(|t| t.kind == TokenKind::Dash)
        && tokens.iter().any(|t| t.kind == TokenKind::Pipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(src: &str) -> Vec<TokenKind> {
        let toks = mmd_lexer::lex(src);
        Classifier::new().classify(&toks).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(lines("\n"), vec![TokenKind::LineEmpty]);
    }

    #[test]
    fn atx_heading_levels() {
        assert_eq!(lines("# Title\n"), vec![TokenKind::LineAtx1]);
        assert_eq!(lines("### Title\n"), vec![TokenKind::LineAtx3]);
    }

    #[test]
    fn thematic_break_needs_three() {
        assert_eq!(lines("***\n"), vec![TokenKind::LineHr]);
        assert_eq!(lines("---\n"), vec![TokenKind::LineYamlMarker]);
    }

    #[test]
    fn setext_heading_after_plain_line() {
        let toks = mmd_lexer::lex("Title\n===\n");
        let kinds: Vec<_> =
            Classifier::new().classify(&toks).into_iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![TokenKind::LinePlain, TokenKind::LineSetext1]);
    }

    #[test]
    fn bulleted_list_marker() {
        assert_eq!(lines("- item\n"), vec![TokenKind::LineBulleted]);
    }

    #[test]
    fn enumerated_list_marker() {
        assert_eq!(lines("1. item\n"), vec![TokenKind::LineEnumerated]);
    }

    #[test]
    fn blockquote_line() {
        assert_eq!(lines("> quoted\n"), vec![TokenKind::LineBlockquote]);
    }

    #[test]
    fn fence_open_and_close() {
        let toks = mmd_lexer::lex("```\ncode\n```\n");
        let kinds: Vec<_> =
            Classifier::new().classify(&toks).into_iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::LineFenceStart, TokenKind::LinePlain, TokenKind::LineFenceClose]
        );
    }

    #[test]
    fn table_line_detected_by_pipe() {
        assert_eq!(lines("a | b\n"), vec![TokenKind::LineTable]);
    }

    #[test]
    fn table_separator_line() {
        assert_eq!(lines("--- | ---\n"), vec![TokenKind::LineTableSeparator]);
    }

    #[test]
    fn def_footnote_line() {
        assert_eq!(lines("[^1]: text\n"), vec![TokenKind::LineDefFootnote]);
    }

    #[test]
    fn toc_marker_line() {
        assert_eq!(lines("[TOC]\n"), vec![TokenKind::LineToc]);
    }

    #[test]
    fn meta_line_before_content() {
        assert_eq!(lines("Title: My Doc\n"), vec![TokenKind::LineMeta]);
    }

    #[test]
    fn meta_disabled_after_first_content_line() {
        let toks = mmd_lexer::lex("# Heading\nTitle: looks like meta\n");
        let kinds: Vec<_> =
            Classifier::new().classify(&toks).into_iter().map(|l| l.kind).collect();
        assert_eq!(kinds[0], TokenKind::LineAtx1);
        assert_ne!(kinds[1], TokenKind::LineMeta);
    }
}
