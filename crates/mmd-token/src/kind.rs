//! The token/node kind universe.
//!
//! Following the grounding repository's `SyntaxKind` design (one enum for
//! both lexer tokens and parser-built composite nodes), every stage of the
//! pipeline narrows down to a single flat `TokenKind`. The enum is split
//! into five logical regions, documented in order: lexical tokens, line
//! kinds, block kinds, pair kinds and marker kinds. Unlike the grounding
//! repository we don't hand the discriminant to an FFI tree library, so
//! there's no requirement that the regions be numerically contiguous or
//! that conversion be done with `transmute`.

/// The full kind universe for a token in the parse tree.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum TokenKind {
    // === Lexical tokens (§4.2) ===
    //
    // `Star`, `Underscore`, `Backtick`, `Tilde`, `Caret` and `Hash` are each
    // lexed as one token per maximal run of the character (`len` carries the
    // run length rather than the lexer splitting "***" into three tokens).
    // Downstream stages read run length off the token instead of counting
    // siblings: the ambidextrous resolver and pairing engine compare delimiter
    // run lengths directly (spec.md §4.5/§4.6), and fence/heading detection
    // reads a backtick/tilde/hash run's length straight from one token.
    Text,
    Digits,
    Newline,
    Linebreak,
    WhitespaceNonIndent,
    WhitespaceIndentSpace,
    WhitespaceIndentTab,
    Star,
    Underscore,
    Backtick,
    Tilde,
    Caret,
    Hash,
    Backslash,
    Equal,
    Dash,
    Colon,
    Pipe,
    Lt,
    Gt,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Bang,
    Plus,
    Apostrophe,
    DoubleQuote,
    TypographicMark,
    FootnoteBracketOpen, // `[^`
    CitationBracketOpen, // `[#`
    GlossaryBracketOpen, // `[?`
    AbbrBracketOpen,     // `[>`
    CommentOpen,         // `<!--`
    CommentClose,        // `-->`
    MathOpenSingle,      // `$`
    MathOpenDouble,      // `$$`
    Eof,

    // === Line kinds (§4.3) ===
    LineEmpty,
    LinePlain,
    LineAtx1,
    LineAtx2,
    LineAtx3,
    LineAtx4,
    LineAtx5,
    LineAtx6,
    LineSetext1,
    LineSetext2,
    LineHr,
    LineToc,
    LineYamlMarker,
    LineBlockquote,
    LineHtml,
    LineBulleted,
    LineEnumerated,
    LineDefLink,
    LineDefFootnote,
    LineDefCitation,
    LineDefGlossary,
    LineDefAbbreviation,
    LineDefinition,
    LineMeta,
    LineTable,
    LineTableSeparator,
    LineFenceStart,
    LineFenceClose,
    LineStartComment,
    LineStopComment,
    LineIndentedTab,
    LineIndentedSpace,
    LineContinuation,
    LineFallback,

    // === Block kinds (§4.4) ===
    Root,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    ThematicBreak,
    Toc,
    YamlBlock,
    BlockQuote,
    DefLinkEntry,
    DefFootnoteEntry,
    DefCitationEntry,
    DefGlossaryEntry,
    DefAbbreviationEntry,
    DefinitionBlock,
    DefinitionTerm,
    DefinitionDescription,
    FencedBlock,
    IndentedCode,
    ListBullet,
    ListEnumerated,
    /// A list where at least one item is separated from its neighbor by a
    /// blank line, or itself contains more than one paragraph (spec.md
    /// §4.4 "a list becomes loose when any item contains a paragraph").
    ListBulletLoose,
    ListEnumeratedLoose,
    ListItem,
    MetaBlock,
    MetaPair,
    Paragraph,
    Table,
    TableRow,
    TableCell,
    HtmlBlock,
    HtmlComment,
    Inline,

    // === Pair kinds (§4.6, §4.9) ===
    CriticAddPair,
    CriticDelPair,
    CriticSubPair,
    CriticHighlightPair,
    CriticCommentPair,
    HtmlCommentPair,
    LinkBracketPair,
    FootnoteBracketPair,
    CitationBracketPair,
    GlossaryBracketPair,
    AbbrBracketPair,
    ParenPair,
    AngleBracketPair,
    DoubleBracePair,
    MathPairSingle,
    MathPairDouble,
    StrongPair,
    EmphasisPair,
    StrongUnderscorePair,
    EmphasisUnderscorePair,
    CodeSpanPair,
    TypographicQuotePair,
    SuperscriptPair,
    SubscriptPair,
    RawFilterPair,

    // === Marker kinds (§4.3 rewrite targets, §4.4) ===
    MarkerListBullet,
    MarkerListEnumerator,
    MarkerSetext1,
    MarkerSetext2,
    ApostropheMark, // possessive / elided apostrophe, demoted from quote
    EnDash,
}

impl TokenKind {
    pub fn is_lexical(self) -> bool {
        (Self::Text as u16..=Self::Eof as u16).contains(&(self as u16))
    }

    pub fn is_line(self) -> bool {
        (Self::LineEmpty as u16..=Self::LineFallback as u16).contains(&(self as u16))
    }

    pub fn is_block(self) -> bool {
        (Self::Root as u16..=Self::Inline as u16).contains(&(self as u16))
    }

    pub fn is_pair(self) -> bool {
        (Self::CriticAddPair as u16..=Self::RawFilterPair as u16).contains(&(self as u16))
    }

    /// True for block kinds whose content is preformatted and therefore
    /// skipped entirely by the pairing engine (§4.6).
    pub fn is_preformatted_block(self) -> bool {
        matches!(self, Self::FencedBlock | Self::IndentedCode | Self::HtmlBlock)
    }
}
