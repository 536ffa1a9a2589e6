//! Flat event stream emitted by grammar rules, resolved into an arena tree
//! by [`crate::sink::Sink`] (spec.md §4.4). Grounded on the same
//! Start/Token/Finish/Placeholder protocol the grounding repository's
//! `parser::event` uses for its rowan tree, minus the rowan dependency.

use mmd_token::{Index, TokenArena, TokenKind};

#[derive(Debug)]
pub enum Event {
    /// Begin a composite node. `forward_parent`, when set, points at
    /// another `Start` event that should become this node's parent (the
    /// "precede" pattern, used to wrap an already-emitted paragraph in a
    /// `Heading` once a setext underline is seen).
    Start { kind: TokenKind, forward_parent: Option<usize> },
    /// Consume `n_raw_tokens` consecutive leaf tokens from the flattened
    /// token stream, attaching them to the currently open node.
    Token { kind: TokenKind, n_raw_tokens: u32 },
    /// Advance past `n` leaf tokens without attaching them to any node —
    /// their bytes are accounted for by a matching [`Event::Graft`]
    /// instead. Used when a container (blockquote, list item) strips its
    /// prefix and recursively re-parses the remainder into its own arena.
    Skip(u32),
    /// Advance the running cursor by `n` bytes that correspond to no token
    /// at all in this event stream's own flat array (a container prefix
    /// stripped before a *nested* re-parse even began — see
    /// [`mmd_classify::ClassifiedLine::gap_before`]).
    Gap(u32),
    /// Splice an independently-built subtree into the currently open
    /// node, discarding the subtree's own `Root` wrapper.
    Graft(TokenArena, Index),
    /// Close the most recently opened node.
    Finish,
    /// Reserved slot for a marker not yet completed or abandoned.
    Placeholder,
}

impl Event {
    pub fn start(kind: TokenKind) -> Self {
        Event::Start { kind, forward_parent: None }
    }

    pub fn token(kind: TokenKind) -> Self {
        Event::Token { kind, n_raw_tokens: 1 }
    }
}
