//! Emphasis coalescing (spec.md §4.7): two sibling emphasis pairs of the
//! same delimiter family that touch with no text between them (`*a**b*`
//! producing adjacent `*a*` and `*b*` pairs back to back) collapse into a
//! single strong pair wrapping both pairs' content, matching the
//! grounding the original implementation gives this step in `mmd.c`'s
//! post-pairing cleanup.

use mmd_token::{Index, TokenArena, TokenKind};

fn family_and_strong(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::EmphasisPair => Some(TokenKind::StrongPair),
        TokenKind::EmphasisUnderscorePair => Some(TokenKind::StrongUnderscorePair),
        _ => None,
    }
}

pub fn coalesce_tree(arena: &mut TokenArena, node: Index) {
    if arena.get(node).kind.is_preformatted_block() {
        return;
    }
    let children: Vec<Index> = arena.children(node).collect();
    for child in &children {
        if arena.get(*child).first_child.is_some() {
            coalesce_tree(arena, *child);
        }
    }
    coalesce_siblings(arena, node);
}

fn coalesce_siblings(arena: &mut TokenArena, parent: Index) {
    loop {
        let children: Vec<Index> = arena.children(parent).collect();
        let mut merge: Option<(Index, Index, TokenKind)> = None;
        for pair in children.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ka, kb) = (arena.get(a).kind, arena.get(b).kind);
            if ka != kb {
                continue;
            }
            let Some(strong_kind) = family_and_strong(ka) else { continue };
            if arena.get(a).end() != arena.get(b).start {
                continue;
            }
            merge = Some((a, b, strong_kind));
            break;
        }
        let Some((a, b, strong_kind)) = merge else { break };
        merge_pair(arena, parent, a, b, strong_kind);
    }
}

fn merge_pair(arena: &mut TokenArena, parent: Index, a: Index, b: Index, strong_kind: TokenKind) {
    let anchor = arena.get(b).next;
    let start = arena.get(a).start;
    let end = arena.get(b).end();

    let prev = arena.get(a).prev;
    let next = arena.get(b).next;
    match prev {
        Some(p) => arena.get_mut(p).next = next,
        None => arena.get_mut(parent).first_child = next,
    }
    match next {
        Some(n) => arena.get_mut(n).prev = prev,
        None => arena.get_mut(parent).tail = prev,
    }
    arena.get_mut(a).prev = None;
    arena.get_mut(b).next = None;

    let new_node = arena.alloc(strong_kind, start, end - start);
    arena.adopt_chain(new_node, a, b);

    match anchor {
        Some(anc) => arena.insert_before(anc, new_node),
        None => arena.append_child(parent, new_node),
    }
}
