//! The token-pair table (spec.md §4.6): a dense `[open][close]` matrix
//! keyed by `TokenKind as usize`, grounded on the original implementation's
//! `token_pairs.c`, which looks a candidate pair up in a fixed-size C array
//! rather than a hash map. Four logical tables are folded into one matrix
//! here (HTML comments, the bracket/paren/angle/brace/math family, and the
//! emphasis/code-span family); critic-markup pairing is deliberately absent
//! — see the crate root docs for why.

use mmd_token::TokenKind;

use crate::options::PairOptions;

/// Large enough to index every `TokenKind` discriminant directly; the enum
/// currently tops out well under this.
const TABLE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct PairRule {
    pub kind: TokenKind,
    pub options: PairOptions,
}

pub struct PairTable {
    rules: Vec<Vec<Option<PairRule>>>,
}

impl PairTable {
    fn empty() -> Self {
        Self { rules: vec![vec![None; TABLE_SIZE]; TABLE_SIZE] }
    }

    fn register(&mut self, open: TokenKind, close: TokenKind, kind: TokenKind, options: PairOptions) {
        self.rules[open as usize][close as usize] = Some(PairRule { kind, options });
    }

    pub fn lookup(&self, open: TokenKind, close: TokenKind) -> Option<PairRule> {
        self.rules[open as usize][close as usize]
    }
}

/// Build the default table used by the main pipeline.
pub fn default_table() -> PairTable {
    let mut t = PairTable::empty();
    let empty = PairOptions::ALLOW_EMPTY | PairOptions::PRUNE_MATCH;
    let len = PairOptions::MATCH_LENGTH | PairOptions::PRUNE_MATCH;
    let none = PairOptions::PRUNE_MATCH;

    // Bracket / paren / angle / brace / math family.
    t.register(TokenKind::LBracket, TokenKind::RBracket, TokenKind::LinkBracketPair, empty);
    t.register(TokenKind::FootnoteBracketOpen, TokenKind::RBracket, TokenKind::FootnoteBracketPair, empty);
    t.register(TokenKind::CitationBracketOpen, TokenKind::RBracket, TokenKind::CitationBracketPair, empty);
    t.register(TokenKind::GlossaryBracketOpen, TokenKind::RBracket, TokenKind::GlossaryBracketPair, empty);
    t.register(TokenKind::AbbrBracketOpen, TokenKind::RBracket, TokenKind::AbbrBracketPair, empty);
    t.register(TokenKind::LParen, TokenKind::RParen, TokenKind::ParenPair, empty);
    t.register(TokenKind::Lt, TokenKind::Gt, TokenKind::AngleBracketPair, none);
    t.register(TokenKind::LBrace, TokenKind::RBrace, TokenKind::DoubleBracePair, empty);
    t.register(TokenKind::MathOpenSingle, TokenKind::MathOpenSingle, TokenKind::MathPairSingle, none);
    t.register(TokenKind::MathOpenDouble, TokenKind::MathOpenDouble, TokenKind::MathPairDouble, none);

    // HTML comments.
    t.register(TokenKind::CommentOpen, TokenKind::CommentClose, TokenKind::HtmlCommentPair, none);

    // Emphasis / code-span family: same kind opens and closes, run length
    // must match exactly (a run of two stars never closes a run of one).
    t.register(TokenKind::Backtick, TokenKind::Backtick, TokenKind::CodeSpanPair, len);
    t.register(TokenKind::Star, TokenKind::Star, TokenKind::EmphasisPair, len);
    t.register(TokenKind::Underscore, TokenKind::Underscore, TokenKind::EmphasisUnderscorePair, len);
    t.register(TokenKind::Tilde, TokenKind::Tilde, TokenKind::SubscriptPair, len);
    t.register(TokenKind::Caret, TokenKind::Caret, TokenKind::SuperscriptPair, len);
    t.register(TokenKind::Apostrophe, TokenKind::Apostrophe, TokenKind::TypographicQuotePair, none);
    t.register(TokenKind::DoubleQuote, TokenKind::DoubleQuote, TokenKind::TypographicQuotePair, none);

    t
}

/// The run-length-2 variant of a family that also has a run-length-1
/// entry in the table (`**` closes as [`TokenKind::StrongPair`], `*`
/// closes as [`TokenKind::EmphasisPair`]). The table only stores one rule
/// per `(open, close)` kind pair, so the engine asks for this refinement
/// once a same-length match on `Star`/`Underscore` is confirmed.
pub fn strong_variant(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::EmphasisPair => Some(TokenKind::StrongPair),
        TokenKind::EmphasisUnderscorePair => Some(TokenKind::StrongUnderscorePair),
        _ => None,
    }
}
