//! Reference tables and asset paths (spec.md §4.8).
//!
//! Grounded on the original implementation's reference-table handling:
//! one label-keyed table per definition family (link, footnote, citation,
//! glossary, abbreviation) plus a metadata table, all keyed by a
//! normalized form of the label so lookups are case- and
//! whitespace-insensitive. Asset paths for extracted non-textual content
//! reuse the same UUIDv4 scheme as `uuid.c`.

mod asset;
mod label;
mod tables;

pub use asset::new_asset_path;
pub use label::normalize_label;
pub use tables::{LinkDefinition, NoteDefinition, ReferenceTables};
