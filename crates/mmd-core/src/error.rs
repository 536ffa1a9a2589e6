//! Error surface (spec.md §7): three kinds of failure the engine can
//! report. Allocation failure and recursion-limit truncation mirror the
//! original implementation's own error categories even though Rust's
//! allocator and this pipeline's silent-truncation-on-depth-cap design
//! mean they are rarely, if ever, actually constructed; they are kept as
//! first-class variants so a caller's `match` stays exhaustive if either
//! ever becomes reachable (a custom global allocator, a future eager
//! depth check). The third kind — failure to read an external resource,
//! e.g. a transclusion target — is never an [`EngineError`] at all: it is
//! logged via `tracing` and the engine carries on (see `mmd-transclude`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("substring range {start}..{end} is out of bounds for a buffer of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("parse recursion exceeded the depth limit and was truncated")]
    RecursionLimitExceeded,

    #[error("memory allocation failed while building the parse tree")]
    Allocation,
}
