//! Block-level grammar (spec.md §4.4): dispatches on a classified line's
//! kind and assembles the block tree one `Start`/`Token`/`Finish` event at
//! a time. Grounded on the grounding repository's `grammar::block`, which
//! drives the same kind of line-kind dispatch loop over its own
//! `LineBreak`-delimited chunks; container nesting (blockquotes, list
//! items) is new here because spec.md requires genuine recursive
//! re-parsing rather than the grounding repository's flat block list.

use mmd_classify::Classifier;
use mmd_token::TokenKind;

use crate::parser::Parser;
use crate::MAX_DEPTH;

/// Parse every line of the document (or of a re-parsed container chunk)
/// into top-level blocks.
pub fn root(p: &mut Parser, depth: u32) {
    let m = p.start();
    while !p.at_end() {
        p.consume_line_gap();
        block(p, depth);
    }
    m.complete(p, TokenKind::Root);
}

fn block(p: &mut Parser, depth: u32) {
    match p.current_line_kind() {
        TokenKind::LineEmpty => p.skip_line(),
        TokenKind::LineAtx1
        | TokenKind::LineAtx2
        | TokenKind::LineAtx3
        | TokenKind::LineAtx4
        | TokenKind::LineAtx5
        | TokenKind::LineAtx6 => heading_atx(p),
        TokenKind::LineHr => thematic_break(p),
        TokenKind::LineToc => toc(p),
        TokenKind::LineYamlMarker => yaml_block(p),
        TokenKind::LineBlockquote => blockquote(p, depth),
        TokenKind::LineBulleted => list(p, depth, TokenKind::LineBulleted, TokenKind::ListBullet),
        TokenKind::LineEnumerated => {
            list(p, depth, TokenKind::LineEnumerated, TokenKind::ListEnumerated)
        }
        TokenKind::LineDefLink => def_entry(p, TokenKind::DefLinkEntry),
        TokenKind::LineDefFootnote => def_entry(p, TokenKind::DefFootnoteEntry),
        TokenKind::LineDefCitation => def_entry(p, TokenKind::DefCitationEntry),
        TokenKind::LineDefGlossary => def_entry(p, TokenKind::DefGlossaryEntry),
        TokenKind::LineDefAbbreviation => def_entry(p, TokenKind::DefAbbreviationEntry),
        TokenKind::LineMeta => meta_block(p),
        TokenKind::LineTable | TokenKind::LineTableSeparator => table(p),
        TokenKind::LineHtml => html_block(p),
        TokenKind::LineStartComment => html_comment(p),
        TokenKind::LineFenceStart => fenced_block(p),
        TokenKind::LineIndentedSpace | TokenKind::LineIndentedTab => indented_code(p),
        _ => paragraph(p),
    }
}

fn heading_atx(p: &mut Parser) {
    let kind = match p.current_line_kind() {
        TokenKind::LineAtx1 => TokenKind::Heading1,
        TokenKind::LineAtx2 => TokenKind::Heading2,
        TokenKind::LineAtx3 => TokenKind::Heading3,
        TokenKind::LineAtx4 => TokenKind::Heading4,
        TokenKind::LineAtx5 => TokenKind::Heading5,
        _ => TokenKind::Heading6,
    };
    let m = p.start();
    p.bump_rest_of_line();
    m.complete(p, kind);
}

fn thematic_break(p: &mut Parser) {
    let m = p.start();
    p.bump_rest_of_line();
    m.complete(p, TokenKind::ThematicBreak);
}

fn toc(p: &mut Parser) {
    let m = p.start();
    p.bump_rest_of_line();
    m.complete(p, TokenKind::Toc);
}

/// A leading `---` marker line starts a YAML metadata block; every
/// subsequent line up to (and including) a closing `---`/`...` marker is
/// absorbed literally — front matter isn't re-parsed as Markdown.
fn yaml_block(p: &mut Parser) {
    let m = p.start();
    p.bump_rest_of_line();
    while !p.at_end() {
        let was_marker = p.current_line_kind() == TokenKind::LineYamlMarker;
        p.bump_rest_of_line();
        if was_marker {
            break;
        }
    }
    m.complete(p, TokenKind::YamlBlock);
}

/// Strip one leading `>` (plus an optional single following whitespace
/// token) from every contiguous blockquote line, reclassify what remains,
/// and recursively parse it into its own arena (spec.md §4.4 "strip
/// markers recursively, re-parse"). The sub-arena is grafted under this
/// node rather than rebuilding a fresh `rowan`-style string.
fn blockquote(p: &mut Parser, depth: u32) {
    let m = p.start();

    if depth + 1 >= MAX_DEPTH {
        while p.current_line_kind() == TokenKind::LineBlockquote {
            p.bump_rest_of_line();
        }
        m.complete(p, TokenKind::BlockQuote);
        return;
    }

    let mut classifier = Classifier::new();
    let mut stripped = Vec::new();
    let mut base_offset: Option<u32> = None;

    while p.current_line_kind() == TokenKind::LineBlockquote {
        let line_start_cursor = p.cursor() as u32;
        let (mut tokens, terminator) = p.take_current_line_tokens();
        let mut gap: u32 = if !tokens.is_empty() {
            tokens.remove(0).text.len() as u32 // the `>` marker
        } else {
            0
        };
        if matches!(
            tokens.first().map(|t| t.kind),
            Some(TokenKind::WhitespaceNonIndent | TokenKind::WhitespaceIndentSpace)
        ) {
            gap += tokens.remove(0).text.len() as u32;
        }

        let is_first_line = base_offset.is_none();
        if is_first_line {
            base_offset = Some(line_start_cursor + gap);
        }
        let mut line = classifier.classify_line(tokens, terminator);
        if !is_first_line {
            line.gap_before = gap;
        }
        stripped.push(line);
    }

    let base_offset = base_offset.unwrap_or(0);
    let (sub_arena, sub_root) = crate::parse_lines(&stripped, base_offset, depth + 1);
    p.graft(sub_arena, sub_root);

    m.complete(p, TokenKind::BlockQuote);
}

/// A run of contiguous list lines of the same marker family becomes one
/// list; each line becomes one item whose marker is reattached as its
/// first child and whose remaining content (indent stripped) is
/// recursively re-parsed, per spec.md §4.4's list rule.
///
/// A blank line (or run of blank lines) between two items of the same
/// marker family does not split the list in two: it is absorbed as a
/// gap and the list is promoted to "loose" instead (spec.md §4.4, §8
/// scenario #2: `"* a\n* b\n\n* c\n"` is one loose list of three items).
/// A list is also loose when any one of its items itself contains more
/// than one paragraph.
fn list(p: &mut Parser, depth: u32, line_kind: TokenKind, list_kind: TokenKind) {
    let m = p.start();
    let mut loose = false;
    loop {
        if p.current_line_kind() != line_kind {
            break;
        }
        loose |= list_item(p, depth);

        if p.current_line_kind() != TokenKind::LineEmpty {
            continue;
        }
        let mut blank_run = 0usize;
        while p.nth_line_kind(blank_run) == TokenKind::LineEmpty {
            blank_run += 1;
        }
        if p.nth_line_kind(blank_run) != line_kind {
            break;
        }
        loose = true;
        for _ in 0..blank_run {
            p.skip_line();
        }
    }
    m.complete(p, if loose { loose_variant(list_kind) } else { list_kind });
}

fn loose_variant(list_kind: TokenKind) -> TokenKind {
    match list_kind {
        TokenKind::ListBullet => TokenKind::ListBulletLoose,
        TokenKind::ListEnumerated => TokenKind::ListEnumeratedLoose,
        other => other,
    }
}

/// Parse one item starting at the current (marker) line, absorbing every
/// contiguous indented-continuation line that follows into the same
/// item's re-parsed chunk (spec.md §4.4 "reparse the item's chunk with
/// one indent level removed"). Returns whether this item itself spans
/// more than one paragraph, which forces the enclosing list loose.
fn list_item(p: &mut Parser, depth: u32) -> bool {
    let m = p.start();

    if depth + 1 >= MAX_DEPTH {
        p.bump_rest_of_line();
        m.complete(p, TokenKind::ListItem);
        return false;
    }

    // The marker (`MarkerListBullet`/`MarkerListEnumerator`, already
    // rewritten by the classifier) is reattached as the item's first
    // child, per spec.md §4.4; one run of indent whitespace after it
    // belongs to the marker's own column and is discarded silently.
    p.bump_token();
    if matches!(
        p.current_token().map(|t| t.kind),
        Some(TokenKind::WhitespaceNonIndent | TokenKind::WhitespaceIndentSpace)
    ) {
        p.skip_token();
    }

    let base_offset = p.cursor() as u32;
    let mut classifier = Classifier::new();
    let mut stripped = Vec::new();
    let mut multi_paragraph = false;

    let (tokens, terminator) = p.take_current_line_tokens();
    stripped.push(classifier.classify_line(tokens, terminator));

    loop {
        match p.current_line_kind() {
            TokenKind::LineIndentedSpace | TokenKind::LineIndentedTab | TokenKind::LineContinuation => {
                let (mut tokens, terminator) = p.take_current_line_tokens();
                let gap = if matches!(
                    tokens.first().map(|t| t.kind),
                    Some(TokenKind::WhitespaceIndentSpace | TokenKind::WhitespaceIndentTab)
                ) {
                    tokens.remove(0).text.len() as u32
                } else {
                    0
                };
                let mut line = classifier.classify_line(tokens, terminator);
                line.gap_before = gap;
                stripped.push(line);
            }
            TokenKind::LineEmpty => {
                // A blank line continues the item only if more indented
                // content follows it; otherwise it ends the item. A blank
                // run inside an item means the item holds more than one
                // paragraph, which makes the enclosing list loose.
                let mut blank_run = 0usize;
                while p.nth_line_kind(blank_run) == TokenKind::LineEmpty {
                    blank_run += 1;
                }
                if !matches!(
                    p.nth_line_kind(blank_run),
                    TokenKind::LineIndentedSpace | TokenKind::LineIndentedTab | TokenKind::LineContinuation
                ) {
                    break;
                }
                for _ in 0..blank_run {
                    let (tokens, terminator) = p.take_current_line_tokens();
                    stripped.push(classifier.classify_line(tokens, terminator));
                }
                multi_paragraph = true;
            }
            _ => break,
        }
    }

    let (sub_arena, sub_root) = crate::parse_lines(&stripped, base_offset, depth + 1);
    p.graft(sub_arena, sub_root);

    m.complete(p, TokenKind::ListItem);
    multi_paragraph
}

fn def_entry(p: &mut Parser, kind: TokenKind) {
    let m = p.start();
    p.bump_rest_of_line();
    m.complete(p, kind);
}

/// Metadata key/value lines at the top of a document, one `MetaPair` per
/// contiguous `LineMeta` line.
fn meta_block(p: &mut Parser) {
    let m = p.start();
    while p.current_line_kind() == TokenKind::LineMeta {
        let pm = p.start();
        p.bump_rest_of_line();
        pm.complete(p, TokenKind::MetaPair);
    }
    m.complete(p, TokenKind::MetaBlock);
}

/// A table's cells are split out of each row later, after block assembly
/// (spec.md §4.4: "split each row on unescaped `|`"); here we only group
/// contiguous table/separator lines into `TableRow`s under one `Table`.
fn table(p: &mut Parser) {
    let m = p.start();
    while matches!(p.current_line_kind(), TokenKind::LineTable | TokenKind::LineTableSeparator) {
        let rm = p.start();
        p.bump_rest_of_line();
        rm.complete(p, TokenKind::TableRow);
    }
    m.complete(p, TokenKind::Table);
}

/// Raw HTML absorbs lines until a blank line, matching the grounding
/// repository's block-level tolerance for untouched HTML.
fn html_block(p: &mut Parser) {
    let m = p.start();
    while !p.at_end() && p.current_line_kind() != TokenKind::LineEmpty {
        p.bump_rest_of_line();
    }
    m.complete(p, TokenKind::HtmlBlock);
}

fn html_comment(p: &mut Parser) {
    let m = p.start();
    p.bump_rest_of_line();
    while !p.at_end() && p.current_line_kind() != TokenKind::LineStopComment {
        p.bump_rest_of_line();
    }
    if p.current_line_kind() == TokenKind::LineStopComment {
        p.bump_rest_of_line();
    }
    m.complete(p, TokenKind::HtmlComment);
}

/// Everything between a `LineFenceStart` and its matching `LineFenceClose`
/// (or end of input) is preformatted content, consumed literally — the
/// classifier already confirmed the fence lengths match (spec.md §4.4).
fn fenced_block(p: &mut Parser) {
    let m = p.start();
    p.bump_rest_of_line();
    while !p.at_end() && p.current_line_kind() != TokenKind::LineFenceClose {
        p.bump_rest_of_line();
    }
    if p.current_line_kind() == TokenKind::LineFenceClose {
        p.bump_rest_of_line();
    }
    m.complete(p, TokenKind::FencedBlock);
}

fn indented_code(p: &mut Parser) {
    let m = p.start();
    while matches!(
        p.current_line_kind(),
        TokenKind::LineIndentedSpace | TokenKind::LineIndentedTab | TokenKind::LineEmpty
    ) {
        p.bump_rest_of_line();
    }
    m.complete(p, TokenKind::IndentedCode);
}

/// Plain-text lines accumulate into one paragraph until a blank line, a
/// line that starts a different block, or — retroactively — a setext
/// underline confirms the whole paragraph was a heading (spec.md §4.4).
/// `LineDefinition` lines directly following a one-line paragraph turn it
/// into a `DefinitionBlock` instead (the preceding line is the term).
fn paragraph(p: &mut Parser) {
    let m = p.start();
    let mut line_count = 0;
    loop {
        match p.current_line_kind() {
            TokenKind::LinePlain | TokenKind::LineContinuation | TokenKind::LineFallback => {
                p.bump_rest_of_line();
                line_count += 1;
            }
            _ => break,
        }
    }

    match p.current_line_kind() {
        TokenKind::LineSetext1 | TokenKind::LineSetext2 if line_count > 0 => {
            let setext_is_1 = p.current_line_kind() == TokenKind::LineSetext1;
            let para = m.complete(p, TokenKind::Paragraph);
            p.bump_rest_of_line();
            let heading_kind = if setext_is_1 { TokenKind::Heading1 } else { TokenKind::Heading2 };
            para.precede(p).complete(p, heading_kind);
        }
        TokenKind::LineDefinition if line_count > 0 => {
            // The paragraph just closed is really this definition's term;
            // wrap it (and the descriptions that follow) in a
            // `DefinitionBlock` via the same precede pattern setext
            // headings use.
            let term = m.complete(p, TokenKind::DefinitionTerm);
            let wrap = term.precede(p);
            while p.current_line_kind() == TokenKind::LineDefinition {
                let dm = p.start();
                p.bump_rest_of_line();
                dm.complete(p, TokenKind::DefinitionDescription);
            }
            wrap.complete(p, TokenKind::DefinitionBlock);
        }
        _ => {
            m.complete(p, TokenKind::Paragraph);
        }
    }
}
