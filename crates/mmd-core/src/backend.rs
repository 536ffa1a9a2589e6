//! The traversal contract a backend emitter would implement (spec.md's
//! Non-goals exclude the emitters themselves — HTML, LaTeX, OPML, ODF —
//! but the engine still owes a caller a stable way to walk the finished
//! tree, so that contract lives here).

use mmd_token::{Index, TokenArena};

/// Depth-first visitor over a parsed document. A real emitter
/// implementation lives outside this crate; `mmd-core` only guarantees
/// the walk order and the enter/leave pairing.
pub trait Backend {
    fn enter(&mut self, arena: &TokenArena, node: Index, source: &str);
    fn leave(&mut self, arena: &TokenArena, node: Index, source: &str);
}

/// Walk `root`'s subtree depth-first, calling `enter` before descending
/// into a node's children and `leave` after.
pub fn walk(backend: &mut dyn Backend, arena: &TokenArena, source: &str, root: Index) {
    backend.enter(arena, root, source);
    for child in arena.children(root) {
        walk(backend, arena, source, child);
    }
    backend.leave(arena, root, source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_token::TokenKind;
    use pretty_assertions::assert_eq;

    struct Recorder(Vec<TokenKind>);
    impl Backend for Recorder {
        fn enter(&mut self, arena: &TokenArena, node: Index, _source: &str) {
            self.0.push(arena.get(node).kind);
        }
        fn leave(&mut self, _arena: &TokenArena, _node: Index, _source: &str) {}
    }

    #[test]
    fn walk_visits_every_node_depth_first() {
        let (arena, root) = mmd_grammar::parse("# Title\n\nBody text\n");
        let mut rec = Recorder(Vec::new());
        walk(&mut rec, &arena, "# Title\n\nBody text\n", root);
        assert_eq!(rec.0[0], TokenKind::Root);
        assert!(rec.0.contains(&TokenKind::Heading1));
        assert!(rec.0.contains(&TokenKind::Paragraph));
    }
}
