//! Ambidextrous delimiter resolution, token-pair matching and emphasis
//! coalescing (spec.md §4.5-§4.7), run once over a block tree already
//! built by `mmd-grammar`.
//!
//! Critic-markup is deliberately not one of this crate's pair tables: the
//! base lexer tokenizes `{`, `+`, `+`, `}` as separate single-character
//! tokens rather than dedicated `{++`/`++}` markers, so pairing them here
//! would need multi-token marker recognition this engine doesn't do.
//! `mmd-critic` builds its own dedicated Aho-Corasick pass over the raw
//! buffer instead (spec.md §4.9) and produces the `Critic*Pair` kinds
//! directly from that.

mod coalesce;
mod engine;
mod options;
mod resolve;
mod table;

pub use options::PairOptions;
pub use table::{default_table, PairTable};

use mmd_token::{Index, TokenArena};

/// Resolve flanking, pair every eligible delimiter run, then coalesce
/// adjacent same-family emphasis pairs, over `root`'s whole subtree.
pub fn process(arena: &mut TokenArena, source: &str, root: Index) {
    let table = default_table();
    resolve::resolve(arena, source, root);
    engine::pair_tree(arena, &table, root);
    coalesce::coalesce_tree(arena, root);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_token::TokenKind;
    use pretty_assertions::assert_eq;

    fn build(src: &str) -> (TokenArena, Index, &str) {
        let (arena, root) = mmd_grammar::parse(src);
        (arena, root, src)
    }

    fn find_kind(arena: &TokenArena, node: Index, kind: TokenKind) -> Option<Index> {
        if arena.get(node).kind == kind {
            return Some(node);
        }
        for child in arena.children(node) {
            if let Some(found) = find_kind(arena, child, kind) {
                return Some(found);
            }
        }
        None
    }

    fn text_of(arena: &TokenArena, idx: Index, src: &str) -> String {
        let t = arena.get(idx);
        src[t.start as usize..t.end() as usize].to_string()
    }

    #[test]
    fn simple_emphasis_pairs() {
        let (mut arena, root, src) = build("a *b* c\n");
        process(&mut arena, src, root);
        let pair = find_kind(&arena, root, TokenKind::EmphasisPair).expect("emphasis pair");
        assert_eq!(text_of(&arena, pair, src), "*b*");
    }

    #[test]
    fn double_star_is_strong() {
        let (mut arena, root, src) = build("a **b** c\n");
        process(&mut arena, src, root);
        assert!(find_kind(&arena, root, TokenKind::StrongPair).is_some());
        assert!(find_kind(&arena, root, TokenKind::EmphasisPair).is_none());
    }

    #[test]
    fn trailing_open_only_star_stays_unmatched() {
        // "**foo**bar" - the run right after the closing "**" is itself
        // flanked on both sides, but the stack only has one opener to
        // offer, so it is consumed and nothing is left to pair "bar".
        let (mut arena, root, src) = build("**foo**bar\n");
        process(&mut arena, src, root);
        let strong = find_kind(&arena, root, TokenKind::StrongPair).expect("strong pair");
        assert_eq!(text_of(&arena, strong, src), "**foo**");
    }

    #[test]
    fn triple_star_nests_strong_of_emphasis() {
        let (mut arena, root, src) = build("a ***b*** c\n");
        process(&mut arena, src, root);
        let strong = find_kind(&arena, root, TokenKind::StrongPair).expect("strong pair");
        assert_eq!(text_of(&arena, strong, src), "***b***");
        let emph = arena
            .children(strong)
            .find(|c| arena.get(*c).kind == TokenKind::EmphasisPair)
            .expect("nested emphasis pair");
        assert_eq!(text_of(&arena, emph, src), "*b*");
    }

    #[test]
    fn triple_underscore_nests_strong_of_emphasis() {
        let (mut arena, root, src) = build("a ___b___ c\n");
        process(&mut arena, src, root);
        let strong = find_kind(&arena, root, TokenKind::StrongUnderscorePair).expect("strong pair");
        assert_eq!(text_of(&arena, strong, src), "___b___");
        let emph = arena
            .children(strong)
            .find(|c| arena.get(*c).kind == TokenKind::EmphasisUnderscorePair)
            .expect("nested emphasis pair");
        assert_eq!(text_of(&arena, emph, src), "_b_");
    }

    #[test]
    fn mismatched_length_does_not_pair() {
        let (mut arena, root, src) = build("***foo**\n");
        process(&mut arena, src, root);
        assert!(find_kind(&arena, root, TokenKind::StrongPair).is_none());
        assert!(find_kind(&arena, root, TokenKind::EmphasisPair).is_none());
    }

    #[test]
    fn brackets_pair_as_link() {
        let (mut arena, root, src) = build("[text](url)\n");
        process(&mut arena, src, root);
        let link = find_kind(&arena, root, TokenKind::LinkBracketPair).expect("link bracket pair");
        assert_eq!(text_of(&arena, link, src), "[text]");
        let paren = find_kind(&arena, root, TokenKind::ParenPair).expect("paren pair");
        assert_eq!(text_of(&arena, paren, src), "(url)");
    }

    #[test]
    fn code_span_backticks_require_matching_run_length() {
        let (mut arena, root, src) = build("``a ` b``\n");
        process(&mut arena, src, root);
        let span = find_kind(&arena, root, TokenKind::CodeSpanPair).expect("code span pair");
        assert_eq!(text_of(&arena, span, src), "``a ` b``");
    }

    #[test]
    fn adjacent_emphasis_pairs_coalesce_into_strong() {
        // Exercise the coalescer directly: two already-matched
        // `EmphasisPair` nodes touching with no gap between them should
        // fuse into one `StrongPair` spanning both, independent of
        // whatever upstream stage produced them.
        let mut arena = TokenArena::new();
        let root = arena.alloc(TokenKind::Paragraph, 0, 6);
        let a = arena.alloc(TokenKind::EmphasisPair, 0, 3); // "*a*"
        let b = arena.alloc(TokenKind::EmphasisPair, 3, 3); // "*b*"
        arena.append_child(root, a);
        arena.append_child(root, b);

        coalesce::coalesce_tree(&mut arena, root);

        let children: Vec<_> = arena.children(root).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(arena.get(children[0]).kind, TokenKind::StrongPair);
        assert_eq!(arena.get(children[0]).start, 0);
        assert_eq!(arena.get(children[0]).len, 6);
        let grandchildren: Vec<_> = arena.children(children[0]).collect();
        assert_eq!(grandchildren, vec![a, b]);
    }

    #[test]
    fn preformatted_blocks_are_never_paired() {
        let (mut arena, root, src) = build("```\n*not emphasis*\n```\n");
        process(&mut arena, src, root);
        assert!(find_kind(&arena, root, TokenKind::EmphasisPair).is_none());
    }
}
