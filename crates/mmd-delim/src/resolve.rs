//! Ambidextrous delimiter resolution (spec.md §4.5): decide, per leaf
//! token, whether it is eligible to open a pair, close one, both, or
//! neither — before any pairing is attempted. Grounded on the flanking
//! rules CommonMark-family parsers use for `*`/`_` runs, adapted to this
//! pipeline's single-token-per-run lexer (a run's whole length lives on
//! one token, so flanking only needs to look at the bytes immediately
//! before and after that one token, not at neighbouring sibling tokens).

use mmd_token::{Index, TokenArena, TokenKind};

fn is_ws_or_boundary(b: Option<u8>) -> bool {
    match b {
        None => true,
        Some(b) => b.is_ascii_whitespace(),
    }
}

fn is_punct(b: Option<u8>) -> bool {
    matches!(b, Some(b) if b.is_ascii_punctuation())
}

/// Kinds where the *same* token kind can be either opener or closer
/// depending on context, and therefore need flanking analysis.
fn is_ambidextrous(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Star
            | TokenKind::Underscore
            | TokenKind::Tilde
            | TokenKind::Caret
            | TokenKind::Backtick
            | TokenKind::Apostrophe
            | TokenKind::DoubleQuote
    )
}

/// Kinds whose lexical identity alone decides their role: an opener token
/// always opens, a closer token always closes.
fn fixed_role(kind: TokenKind) -> Option<(bool, bool)> {
    match kind {
        TokenKind::LBracket
        | TokenKind::FootnoteBracketOpen
        | TokenKind::CitationBracketOpen
        | TokenKind::GlossaryBracketOpen
        | TokenKind::AbbrBracketOpen
        | TokenKind::LParen
        | TokenKind::Lt
        | TokenKind::LBrace
        | TokenKind::CommentOpen => Some((true, false)),
        TokenKind::RBracket | TokenKind::RParen | TokenKind::Gt | TokenKind::RBrace | TokenKind::CommentClose => {
            Some((false, true))
        }
        TokenKind::MathOpenSingle | TokenKind::MathOpenDouble => Some((true, true)),
        _ => None,
    }
}

/// Set `can_open`/`can_close` on every leaf in `node`'s subtree, skipping
/// preformatted blocks (spec.md §4.6 "the pairing engine never descends
/// into a fenced or indented code block").
pub fn resolve(arena: &mut TokenArena, source: &str, node: Index) {
    let kind = arena.get(node).kind;
    if kind.is_preformatted_block() {
        return;
    }
    if arena.get(node).first_child.is_none() {
        resolve_leaf(arena, source, node);
        return;
    }
    let children: Vec<Index> = arena.children(node).collect();
    for child in children {
        resolve(arena, source, child);
    }
}

fn resolve_leaf(arena: &mut TokenArena, source: &str, leaf: Index) {
    let (kind, start, end) = {
        let t = arena.get(leaf);
        (t.kind, t.start as usize, t.end() as usize)
    };

    if let Some((open, close)) = fixed_role(kind) {
        let t = arena.get_mut(leaf);
        t.can_open = open;
        t.can_close = close;
        return;
    }

    if !is_ambidextrous(kind) {
        let t = arena.get_mut(leaf);
        t.can_open = false;
        t.can_close = false;
        return;
    }

    let bytes = source.as_bytes();
    let left = if start == 0 { None } else { Some(bytes[start - 1]) };
    let right = bytes.get(end).copied();

    let left_is_ws = is_ws_or_boundary(left);
    let right_is_ws = is_ws_or_boundary(right);
    let left_is_punct = is_punct(left);
    let right_is_punct = is_punct(right);

    let left_flanking = !right_is_ws && (!right_is_punct || left_is_ws || left_is_punct);
    let right_flanking = !left_is_ws && (!left_is_punct || right_is_ws || right_is_punct);

    let (can_open, can_close) = if kind == TokenKind::Underscore {
        // Intraword underscores may not open or close (spec.md §4.5): a
        // flanking side that is *also* flanking the other way only
        // counts if it sits next to punctuation.
        (
            left_flanking && (!right_flanking || left_is_punct),
            right_flanking && (!left_flanking || right_is_punct),
        )
    } else {
        (left_flanking, right_flanking)
    };

    let t = arena.get_mut(leaf);
    t.can_open = can_open;
    t.can_close = can_close;
}
