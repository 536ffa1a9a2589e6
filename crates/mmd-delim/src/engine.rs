//! The pairing engine (spec.md §4.6): a stack-based scan that matches
//! ambidextrous delimiter tokens into pair nodes, one block's worth of
//! siblings at a time, recursing depth-first so inner pairs are pruned
//! into their own nodes before an enclosing pair's span is collected.
//!
//! Grounded on the original implementation's `token_pairs.c`, whose
//! `pair_tokens_in_chain` function walks one sibling chain with an
//! explicit stack rather than recursive descent over a tree that doesn't
//! exist yet; here the tree already exists (built by `mmd-grammar`), so
//! the engine walks it post-order instead of needing its own line-based
//! chunking.

use mmd_token::{Index, TokenArena, TokenKind};

use crate::options::PairOptions;
use crate::table::{self, PairRule, PairTable};

/// Pair every eligible run in `node`'s subtree, skipping preformatted
/// blocks entirely (spec.md §4.6).
pub fn pair_tree(arena: &mut TokenArena, table: &PairTable, node: Index) {
    if arena.get(node).kind.is_preformatted_block() {
        return;
    }
    let children: Vec<Index> = arena.children(node).collect();
    for child in &children {
        if arena.get(*child).first_child.is_some() {
            pair_tree(arena, table, *child);
        }
    }
    scan_and_pair(arena, table, node);
}

struct Candidate {
    open: Index,
    close: Index,
    rule: PairRule,
    span: u32,
}

fn scan_and_pair(arena: &mut TokenArena, table: &PairTable, parent: Index) {
    let children: Vec<Index> = arena.children(parent).collect();
    let mut stack: Vec<Index> = Vec::new();
    let mut found: Vec<Candidate> = Vec::new();

    'candidates: for &cand in &children {
        let cand_kind = arena.get(cand).kind;
        if arena.get(cand).can_close {
            for si in (0..stack.len()).rev() {
                let opener = stack[si];
                let opener_kind = arena.get(opener).kind;
                let Some(rule) = table.lookup(opener_kind, cand_kind) else { continue };
                if rule.options.contains(PairOptions::MATCH_LENGTH)
                    && arena.get(opener).len != arena.get(cand).len
                {
                    continue;
                }
                let is_empty = arena.get(opener).next == Some(cand);
                if is_empty && !rule.options.contains(PairOptions::ALLOW_EMPTY) {
                    continue;
                }
                let span = arena.get(cand).end() - arena.get(opener).start;
                stack.truncate(si);
                found.push(Candidate { open: opener, close: cand, rule, span });
                continue 'candidates;
            }
        }
        if arena.get(cand).can_open {
            stack.push(cand);
        }
    }

    // Apply the smallest (innermost) spans first so an enclosing pair's
    // detach-and-reparent step picks up already-pruned inner pair nodes
    // rather than their raw leaf contents.
    found.sort_by_key(|c| c.span);
    for c in found {
        apply_match(arena, parent, c.open, c.close, c.rule);
    }
}

fn refine_kind(arena: &TokenArena, open: Index, rule_kind: TokenKind) -> TokenKind {
    if arena.get(open).len >= 2 {
        table::strong_variant(rule_kind).unwrap_or(rule_kind)
    } else {
        rule_kind
    }
}

/// Detach the sibling run `[first, last]` from `parent`'s child chain in
/// one step, preserving the internal `next`/`prev` links between `first`
/// and `last` so the caller can immediately re-parent the whole run under
/// a new node with [`TokenArena::adopt_chain`].
fn detach_span(arena: &mut TokenArena, parent: Index, first: Index, last: Index) {
    let prev = arena.get(first).prev;
    let next = arena.get(last).next;
    match prev {
        Some(p) => arena.get_mut(p).next = next,
        None => arena.get_mut(parent).first_child = next,
    }
    match next {
        Some(n) => arena.get_mut(n).prev = prev,
        None => arena.get_mut(parent).tail = prev,
    }
    arena.get_mut(first).prev = None;
    arena.get_mut(last).next = None;
}

fn apply_match(arena: &mut TokenArena, parent: Index, open: Index, close: Index, rule: PairRule) {
    arena.mate(open, close);
    if !rule.options.contains(PairOptions::PRUNE_MATCH) {
        return;
    }

    if is_triple_run(arena, open, rule.kind) {
        apply_triple_match(arena, parent, open, close, rule.kind);
        return;
    }

    let anchor = arena.get(close).next;
    let start = arena.get(open).start;
    let end = arena.get(close).end();
    let kind = refine_kind(arena, open, rule.kind);

    detach_span(arena, parent, open, close);
    let new_node = arena.alloc(kind, start, end - start);
    arena.adopt_chain(new_node, open, close);

    match anchor {
        Some(a) => arena.insert_before(a, new_node),
        None => arena.append_child(parent, new_node),
    }
}

/// True for a same-length-3 run of `*` or `_` matched against itself — the
/// case spec.md §4.7 singles out for deterministic strong-of-emph nesting
/// rather than the flat strong collapse a length-2 run gets.
fn is_triple_run(arena: &TokenArena, open: Index, rule_kind: TokenKind) -> bool {
    matches!(rule_kind, TokenKind::EmphasisPair | TokenKind::EmphasisUnderscorePair) && arena.get(open).len == 3
}

fn link(arena: &mut TokenArena, a: Index, b: Index) {
    arena.get_mut(a).next = Some(b);
    arena.get_mut(b).prev = Some(a);
}

/// `***x***` pairs one length-3 run against another. Rather than collapsing
/// straight to a flat strong pair and discarding a delimiter's worth of
/// meaning, split each run 2+1 and nest an emphasis pair inside a strong
/// pair: `**` (outer) wraps `*x*` (inner), matching spec.md §4.7's rule for
/// triple-star/triple-underscore patterns.
fn apply_triple_match(arena: &mut TokenArena, parent: Index, open: Index, close: Index, rule_kind: TokenKind) {
    let anchor = arena.get(close).next;
    let open_start = arena.get(open).start;
    let close_start = arena.get(close).start;
    let leaf_kind = arena.get(open).kind;
    let strong_kind = table::strong_variant(rule_kind).unwrap_or(rule_kind);

    // The pairing engine never matches an adjacent open/close pair in this
    // family (no ALLOW_EMPTY), so there is always at least one node between
    // `open` and `close`.
    let middle_first = arena.get(open).next.expect("*** never pairs an empty run");
    let middle_last = arena.get(close).prev.expect("*** never pairs an empty run");

    detach_span(arena, parent, open, close);

    let open_strong = arena.alloc(leaf_kind, open_start, 2);
    let open_emph = arena.alloc(leaf_kind, open_start + 2, 1);
    let close_emph = arena.alloc(leaf_kind, close_start, 1);
    let close_strong = arena.alloc(leaf_kind, close_start + 1, 2);

    link(arena, open_emph, middle_first);
    link(arena, middle_last, close_emph);
    let emph = arena.alloc(rule_kind, open_start + 2, close_start - open_start - 1);
    arena.adopt_chain(emph, open_emph, close_emph);

    link(arena, open_strong, emph);
    link(arena, emph, close_strong);
    let strong = arena.alloc(strong_kind, open_start, close_start + 3 - open_start);
    arena.adopt_chain(strong, open_strong, close_strong);

    match anchor {
        Some(a) => arena.insert_before(a, strong),
        None => arena.append_child(parent, strong),
    }
}
