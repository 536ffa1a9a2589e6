//! Builds an [`mmd_token::TokenArena`] from a grammar's event stream
//! (spec.md §4.4). Grounded on the grounding repository's `Sink`, which
//! walks events resolving `forward_parent` chains outermost-first and
//! pairs `Token` events back up with raw lexer tokens — here targeting the
//! arena instead of a `rowan::GreenNodeBuilder`.
//!
//! A node's own `start`/`len` aren't known until its children have all
//! been appended, so each composite node is allocated as an empty
//! placeholder when its `Start` event is processed and its span is
//! back-filled from its first/last child when the matching `Finish`
//! arrives.

use mmd_token::{Index, TokenArena, TokenKind};

use crate::event::Event;
use crate::parser::FlatToken;

pub fn build(mut events: Vec<Event>, flat: Vec<FlatToken<'_>>, base_offset: u32) -> (TokenArena, Index) {
    let mut arena = TokenArena::new();
    let root = arena.alloc(TokenKind::Root, base_offset, 0);
    let mut stack = vec![root];
    let mut cursor = base_offset;
    let mut tok_idx = 0usize;

    for i in 0..events.len() {
        match std::mem::replace(&mut events[i], Event::Placeholder) {
            Event::Start { kind, forward_parent } => {
                let mut chain = vec![kind];
                let mut fp = forward_parent;
                while let Some(parent_idx) = fp {
                    match std::mem::replace(&mut events[parent_idx], Event::Placeholder) {
                        Event::Start { kind, forward_parent } => {
                            chain.push(kind);
                            fp = forward_parent;
                        }
                        _ => unreachable!("forward_parent must point at a Start event"),
                    }
                }
                for kind in chain.into_iter().rev() {
                    let node = arena.alloc(kind, cursor, 0);
                    let parent = *stack.last().unwrap();
                    arena.append_child(parent, node);
                    stack.push(node);
                }
            }
            Event::Token { kind, n_raw_tokens } => {
                let parent = *stack.last().unwrap();
                for _ in 0..n_raw_tokens {
                    let Some(t) = flat.get(tok_idx) else { break };
                    let len = t.text.len() as u32;
                    let leaf = arena.alloc(kind, cursor, len);
                    arena.append_child(parent, leaf);
                    cursor += len;
                    tok_idx += 1;
                }
            }
            Event::Skip(n) => {
                for _ in 0..n {
                    let Some(t) = flat.get(tok_idx) else { break };
                    cursor += t.text.len() as u32;
                    tok_idx += 1;
                }
            }
            Event::Gap(n) => {
                cursor += n;
            }
            Event::Graft(sub, sub_root) => {
                let parent = *stack.last().unwrap();
                crate::splice_root_children(&mut arena, parent, sub, sub_root);
            }
            Event::Finish => {
                let node = stack.pop().expect("Finish without matching Start");
                let (start, end) = span_of_children(&arena, node, cursor);
                let n = arena.get_mut(node);
                n.start = start;
                n.len = end - start;
            }
            Event::Placeholder => {}
        }
    }

    let (start, end) = span_of_children(&arena, root, cursor);
    let n = arena.get_mut(root);
    n.start = start;
    n.len = end - start;

    (arena, root)
}

fn span_of_children(arena: &TokenArena, node: Index, fallback: u32) -> (u32, u32) {
    let mut children = arena.children(node);
    let Some(first) = children.next() else {
        return (fallback, fallback);
    };
    let start = arena.get(first).start;
    let mut end = arena.get(first).end();
    for c in children {
        end = arena.get(c).end();
    }
    (start, end)
}
