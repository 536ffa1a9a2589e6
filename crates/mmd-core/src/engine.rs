//! The engine facade (spec.md §3, §6): owns one document's source,
//! arena-indexed parse tree and reference tables, and exposes the
//! create/parse/reset lifecycle a caller drives.
//!
//! Transclusion runs before critic-markup resolution (spec.md §9 open
//! question, resolved here: "transclude first, then critic" — an
//! included file may itself contain critic-markup spans, and those
//! should be visible to a caller asking for them after the include has
//! already happened, not frozen at include time).

use std::path::Path;

use mmd_config::Config;
use mmd_critic::CriticSpan;
use mmd_refs::ReferenceTables;
use mmd_token::{Index, TokenArena};

use crate::error::EngineError;

pub struct Engine {
    config: Config,
    source: String,
    arena: TokenArena,
    root: Option<Index>,
    refs: ReferenceTables,
}

impl Engine {
    pub fn create(config: Config) -> Self {
        Self { config, source: String::new(), arena: TokenArena::new(), root: None, refs: ReferenceTables::default() }
    }

    /// Parse `source`, first resolving every `{{path}}` transclusion
    /// relative to `base_dir` (spec.md §4.10), then building the block
    /// tree, the pair tree and the reference tables over the result.
    pub fn parse(&mut self, source: &str, base_dir: &Path) {
        let transcluded = mmd_transclude::transclude(source, base_dir, self.config.format);
        if !transcluded.manifest.is_empty() {
            tracing::debug!(files = transcluded.manifest.len(), "transclusion expanded document");
        }
        self.load(transcluded.output);
    }

    /// Parse `source` as-is, with no transclusion pass — for callers who
    /// already resolved includes themselves, or who are parsing a
    /// substring extracted from a larger document.
    pub fn parse_literal(&mut self, source: &str) {
        self.load(source.to_string());
    }

    /// Parse only `source[start..start+len]`, keeping every token's
    /// `start` offset relative to the full buffer it was sliced from —
    /// used by incremental re-parse callers that re-lex a changed region
    /// without reprocessing the whole document (spec.md §6).
    pub fn parse_substring(&mut self, source: &str, start: usize, len: usize) -> Result<(), EngineError> {
        let end = start.checked_add(len).ok_or(EngineError::InvalidRange { start, end: start, len: source.len() })?;
        let slice = source
            .get(start..end)
            .ok_or(EngineError::InvalidRange { start, end, len: source.len() })?;
        self.load(slice.to_string());
        Ok(())
    }

    fn load(&mut self, source: String) {
        let (arena, root) = mmd_grammar::parse(&source);
        let mut arena = arena;
        mmd_delim::process(&mut arena, &source, root);
        let refs = ReferenceTables::build(&arena, root, &source);
        self.arena = arena;
        self.root = Some(root);
        self.refs = refs;
        self.source = source;
    }

    /// Drop the current document, returning the engine to a freshly
    /// created state (spec.md §3 "reset" — cheaper than `create`ing a
    /// new engine when a caller is about to parse another document).
    pub fn reset(&mut self) {
        self.source.clear();
        self.arena = TokenArena::new();
        self.root = None;
        self.refs = ReferenceTables::default();
    }

    /// Explicit end-of-lifecycle call mirroring the original API's
    /// `create`/`free` pairing; in Rust this is just `drop`, spelled out
    /// for callers porting code that expects to call it.
    pub fn free(self) {}

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn arena(&self) -> &TokenArena {
        &self.arena
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn has_metadata(&self, key: &str) -> bool {
        self.refs.metadata.contains_key(&mmd_refs::normalize_label(key))
    }

    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.refs.metadata.keys().map(String::as_str)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.refs.metadata.get(&mmd_refs::normalize_label(key)).map(String::as_str)
    }

    /// Insert or overwrite a metadata value after parsing (e.g. a caller
    /// filling in a computed `date` or `version` field). Unlike parsing,
    /// where the first occurrence wins, an explicit update always wins.
    pub fn update_metadata(&mut self, key: &str, value: String) {
        self.refs.metadata.insert(mmd_refs::normalize_label(key), value);
    }

    pub fn references(&self) -> &ReferenceTables {
        &self.refs
    }

    /// Critic-markup spans found in the current source, for a caller that
    /// wants to offer an accept/reject UI separately from the normal
    /// parse tree (spec.md §4.9; see the crate root docs for why this
    /// lives outside the pair tree).
    pub fn critic_spans(&self) -> Vec<CriticSpan> {
        mmd_critic::scan(&self.source)
    }

    pub fn resolve_critic(&self, mode: mmd_critic::EditMode) -> String {
        let spans = self.critic_spans();
        mmd_critic::apply_edits(&self.source, &spans, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmd_token::TokenKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_literal_builds_a_tree() {
        let mut engine = Engine::create(Config::default());
        engine.parse_literal("# Title\n\nBody\n");
        let root = engine.root().unwrap();
        let kinds: Vec<_> = engine.arena().children(root).map(|c| engine.arena().get(c).kind).collect();
        assert_eq!(kinds, vec![TokenKind::Heading1, TokenKind::Paragraph]);
    }

    #[test]
    fn metadata_first_occurrence_wins_and_update_overrides() {
        let mut engine = Engine::create(Config::default());
        engine.parse_literal("Title: First\nTitle: Second\n\nBody\n");
        assert_eq!(engine.metadata_value("title"), Some("First"));
        engine.update_metadata("title", "Forced".to_string());
        assert_eq!(engine.metadata_value("title"), Some("Forced"));
    }

    #[test]
    fn reset_clears_the_document() {
        let mut engine = Engine::create(Config::default());
        engine.parse_literal("Body\n");
        assert!(engine.root().is_some());
        engine.reset();
        assert!(engine.root().is_none());
        assert_eq!(engine.source(), "");
    }

    #[test]
    fn parse_substring_rejects_out_of_bounds_ranges() {
        let mut engine = Engine::create(Config::default());
        let err = engine.parse_substring("short", 0, 1000).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange { .. }));
    }

    #[test]
    fn parse_substring_keeps_only_the_requested_slice() {
        let mut engine = Engine::create(Config::default());
        let src = "one\ntwo\n";
        engine.parse_substring(src, 4, 4).unwrap();
        assert_eq!(engine.source(), "two\n");
    }
}
