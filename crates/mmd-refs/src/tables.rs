//! Reference table construction (spec.md §4.8): walk the top-level
//! definition-entry and metadata blocks `mmd-grammar` produced and
//! populate one label-keyed table per kind.

use std::collections::HashMap;

use mmd_token::{Index, TokenArena, TokenKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::label::normalize_label;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDefinition {
    pub label: String,
    pub url: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDefinition {
    pub label: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct ReferenceTables {
    pub links: HashMap<String, LinkDefinition>,
    pub footnotes: HashMap<String, NoteDefinition>,
    pub citations: HashMap<String, NoteDefinition>,
    pub glossary: HashMap<String, NoteDefinition>,
    pub abbreviations: HashMap<String, NoteDefinition>,
    /// Metadata keys are also normalized, but the *first* occurrence wins
    /// (spec.md §8 "metadata shadowing"): a later `Title: ...` line never
    /// overwrites an earlier one.
    pub metadata: HashMap<String, String>,
    /// Remote URLs found as an image or link target, each assigned a
    /// UUIDv4-derived local path the first time it's seen (spec.md §4.8).
    pub assets: HashMap<String, String>,
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\[([^\]]+)\]:\s*(\S+)(?:\s+["“]([^"”]*)["”])?"#).unwrap()
    })
}

fn note_re(sigil: char) -> Regex {
    Regex::new(&format!(r"^\[\{sigil}([^\]]+)\]:\s*(.*)$")).unwrap()
}

impl ReferenceTables {
    pub fn build(arena: &TokenArena, root: Index, source: &str) -> Self {
        let mut tables = Self::default();
        for child in arena.children(root) {
            tables.visit(arena, child, source);
        }
        tables.populate_assets(arena, root, source);
        tables
    }

    /// Walk the whole tree (not just the container kinds `visit` descends
    /// into — image/link targets can sit inside a paragraph, table cell or
    /// definition description) looking for a `[...]` immediately followed
    /// by a `(...)`, and assign a remote target a local asset path the
    /// first time it's seen (spec.md §4.8).
    fn populate_assets(&mut self, arena: &TokenArena, node: Index, source: &str) {
        let children: Vec<Index> = arena.children(node).collect();
        for pair in children.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if arena.get(a).kind == TokenKind::LinkBracketPair
                && arena.get(b).kind == TokenKind::ParenPair
                && arena.get(a).end() == arena.get(b).start
            {
                self.record_asset_if_remote(arena, b, source);
            }
        }
        for child in children {
            self.populate_assets(arena, child, source);
        }
    }

    fn record_asset_if_remote(&mut self, arena: &TokenArena, paren: Index, source: &str) {
        let t = arena.get(paren);
        let text = &source[t.start as usize..t.end() as usize];
        let url = text.trim_start_matches('(').trim_end_matches(')').trim();
        if url.is_empty() || self.assets.contains_key(url) {
            return;
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            let extension = url
                .rsplit('.')
                .next()
                .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .unwrap_or("");
            self.assets.insert(url.to_string(), crate::asset::new_asset_path(extension));
        }
    }

    fn visit(&mut self, arena: &TokenArena, node: Index, source: &str) {
        let t = arena.get(node);
        let text = &source[t.start as usize..t.end() as usize];
        match t.kind {
            TokenKind::DefLinkEntry => self.add_link(text),
            TokenKind::DefFootnoteEntry => self.add_note(text, '^', |s| &mut s.footnotes),
            TokenKind::DefCitationEntry => self.add_note(text, '#', |s| &mut s.citations),
            TokenKind::DefGlossaryEntry => self.add_note(text, '?', |s| &mut s.glossary),
            TokenKind::DefAbbreviationEntry => self.add_note(text, '>', |s| &mut s.abbreviations),
            TokenKind::MetaBlock => {
                for pair in arena.children(node) {
                    self.add_meta_pair(arena, pair, source);
                }
            }
            TokenKind::BlockQuote
            | TokenKind::ListBullet
            | TokenKind::ListEnumerated
            | TokenKind::ListBulletLoose
            | TokenKind::ListEnumeratedLoose
            | TokenKind::ListItem => {
                for child in arena.children(node) {
                    self.visit(arena, child, source);
                }
            }
            _ => {}
        }
    }

    fn add_link(&mut self, text: &str) {
        let Some(caps) = link_re().captures(text.trim_end()) else { return };
        let label = normalize_label(&caps[1]);
        let url = caps[2].to_string();
        let title = caps.get(3).map(|m| m.as_str().to_string());
        self.links.insert(label.clone(), LinkDefinition { label, url, title });
    }

    fn add_note(&mut self, text: &str, sigil: char, table: impl Fn(&mut Self) -> &mut HashMap<String, NoteDefinition>) {
        let re = note_re(sigil);
        let Some(caps) = re.captures(text.trim_end()) else { return };
        let label = normalize_label(&caps[1]);
        let body = caps[2].to_string();
        table(self).insert(label.clone(), NoteDefinition { label, body });
    }

    fn add_meta_pair(&mut self, arena: &TokenArena, pair: Index, source: &str) {
        let t = arena.get(pair);
        let text = &source[t.start as usize..t.end() as usize];
        let Some((key, value)) = text.split_once(':') else { return };
        let key = normalize_label(key);
        if self.metadata.contains_key(&key) {
            return; // first occurrence wins
        }
        self.metadata.insert(key, value.trim().to_string());
    }
}
