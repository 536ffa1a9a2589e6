//! Token kind universe and arena-indexed parse tree shared by every stage
//! of the MultiMarkdown parse pipeline (spec.md §3).

mod arena;
mod kind;

pub use arena::{ChildIter, Index, Token, TokenArena};
pub use kind::TokenKind;
