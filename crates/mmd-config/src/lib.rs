//! Pipeline configuration: which syntax extensions are active, which
//! output format transclusion should resolve `.*` against, and which
//! language smart-typography rules should follow.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional syntax families a document can opt into. Mirrors the
    /// grounding repository's own extension-flag enum in spirit, widened
    /// to the full set this pipeline's grammar recognizes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Extensions: u32 {
        const NOTES          = 1 << 0; // footnotes, citations
        const CRITIC_MARKUP  = 1 << 1;
        const TABLES         = 1 << 2;
        const TOC            = 1 << 3;
        const SMART_QUOTES   = 1 << 4;
        const TRANSCLUSION   = 1 << 5;
        const GLOSSARY       = 1 << 6;
        const ABBREVIATIONS  = 1 << 7;
        const YAML_METADATA  = 1 << 8;

        const ALL = Self::NOTES.bits()
            | Self::CRITIC_MARKUP.bits()
            | Self::TABLES.bits()
            | Self::TOC.bits()
            | Self::SMART_QUOTES.bits()
            | Self::TRANSCLUSION.bits()
            | Self::GLOSSARY.bits()
            | Self::ABBREVIATIONS.bits()
            | Self::YAML_METADATA.bits();
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions::ALL
    }
}

/// Output format identifier. Only used to resolve `.*` wildcard
/// extensions in transclusion targets (spec.md §4.10) — this pipeline
/// has no backend emitters of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    Markdown,
    Html,
    Latex,
    Opml,
    OpenDocument,
}

impl Format {
    /// The file extension a `.*` transclusion target should resolve to
    /// for this format.
    pub fn wildcard_extension(self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Html => "html",
            Format::Latex => "tex",
            Format::Opml => "opml",
            Format::OpenDocument => "fodt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
    Swedish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub extensions: Extensions,
    pub format: Format,
    pub language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self { extensions: Extensions::default(), format: Format::Html, language: Language::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_enables_every_extension() {
        assert!(Extensions::default().contains(Extensions::CRITIC_MARKUP));
        assert!(Extensions::default().contains(Extensions::TRANSCLUSION));
    }

    #[test]
    fn wildcard_extension_matches_format() {
        assert_eq!(Format::Latex.wildcard_extension(), "tex");
        assert_eq!(Format::Html.wildcard_extension(), "html");
    }
}
