//! Parser state machine (spec.md §4.4), grounded on the grounding
//! repository's marker/event parser: grammar functions drive a cursor over
//! a flat token stream and describe tree structure with `Start`/`Token`/
//! `Finish` events instead of building nodes directly, so deep Markdown
//! nesting never recurses the Rust call stack.
//!
//! Unlike the grounding repository, which indexes a flat lexer token
//! stream, this parser indexes a flattened *line* stream: each
//! `mmd_classify::ClassifiedLine` contributes its content tokens plus its
//! terminator, and the parser additionally tracks line boundaries so
//! grammar rules can dispatch on `current_line_kind()` without re-deriving
//! it from the first token every time.

use mmd_classify::{ClassifiedLine, LineToken};
use mmd_token::{Index, TokenArena, TokenKind};

use crate::event::Event;

/// One leaf token in the flattened stream, still borrowing source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

fn flatten<'a>(
    lines: &[ClassifiedLine<'a>],
) -> (Vec<FlatToken<'a>>, Vec<usize>, Vec<TokenKind>, Vec<u32>) {
    let mut flat = Vec::new();
    let mut line_starts = Vec::with_capacity(lines.len() + 1);
    let mut line_kinds = Vec::with_capacity(lines.len());
    let mut line_gaps = Vec::with_capacity(lines.len());

    for line in lines {
        line_starts.push(flat.len());
        line_kinds.push(line.kind);
        line_gaps.push(line.gap_before);
        for t in &line.tokens {
            flat.push(FlatToken { kind: t.kind, text: t.text });
        }
        if let Some(term) = &line.terminator {
            flat.push(FlatToken { kind: term.kind, text: term.text });
        }
    }
    line_starts.push(flat.len());
    (flat, line_starts, line_kinds, line_gaps)
}

pub struct Parser<'input> {
    flat: Vec<FlatToken<'input>>,
    line_starts: Vec<usize>,
    line_kinds: Vec<TokenKind>,
    /// Parallel to `line_kinds`: bytes stripped before each line that a
    /// nested re-parse still needs to add to its cursor (see
    /// [`mmd_classify::ClassifiedLine::gap_before`]). All zero for a
    /// top-level document parse.
    line_gaps: Vec<u32>,
    cursor: usize,
    line: usize,
    events: Vec<Event>,
}

impl<'input> Parser<'input> {
    pub fn new<'a>(lines: &'a [ClassifiedLine<'input>]) -> Self {
        let (flat, line_starts, line_kinds, line_gaps) = flatten(lines);
        Self { flat, line_starts, line_kinds, line_gaps, cursor: 0, line: 0, events: Vec::new() }
    }

    pub fn into_events_and_tokens(self) -> (Vec<Event>, Vec<FlatToken<'input>>) {
        (self.events, self.flat)
    }

    pub fn at_end(&self) -> bool {
        self.line >= self.line_kinds.len()
    }

    pub fn current_line_kind(&self) -> TokenKind {
        self.line_kinds.get(self.line).copied().unwrap_or(TokenKind::Eof)
    }

    pub fn nth_line_kind(&self, n: usize) -> TokenKind {
        self.line_kinds.get(self.line + n).copied().unwrap_or(TokenKind::Eof)
    }

    /// First content token of the current line (skipping nothing; the
    /// classifier already stripped insignificant leading whitespace).
    pub fn current_token(&self) -> Option<FlatToken<'input>> {
        let start = *self.line_starts.get(self.line)?;
        if self.cursor < start {
            return self.flat.get(start).copied();
        }
        self.flat.get(self.cursor).copied()
    }

    fn line_end(&self, line: usize) -> usize {
        self.line_starts[line + 1]
    }

    /// The running byte cursor, for callers that need to know the true
    /// source offset a stripped remainder starts at (container re-parse).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Emit this line's pending gap (if any) as an `Event::Gap` and clear
    /// it, so it is never double-counted. Called once per line by
    /// [`crate::grammar::root`] before dispatching on the line's kind.
    pub fn consume_line_gap(&mut self) {
        if let Some(gap) = self.line_gaps.get(self.line).copied() {
            if gap > 0 {
                self.events.push(Event::Gap(gap));
                self.line_gaps[self.line] = 0;
            }
        }
    }

    /// Advance past one token without emitting a node for it (the single
    /// optional whitespace token after a stripped marker).
    pub fn skip_token(&mut self) {
        if self.flat.get(self.cursor).is_some() {
            self.events.push(Event::Skip(1));
            self.cursor += 1;
        }
    }

    /// Consume one leaf token as its own `Token` event.
    pub fn bump_token(&mut self) {
        if let Some(t) = self.flat.get(self.cursor) {
            self.events.push(Event::token(t.kind));
            self.cursor += 1;
        }
    }

    /// Consume one leaf token, but emit it under `kind` instead of its
    /// lexical kind (used for marker rewrites: a line's leading `-`
    /// becoming `MarkerListBullet`, a setext underline run becoming
    /// `MarkerSetext1`/`MarkerSetext2`).
    pub fn bump_token_as(&mut self, kind: TokenKind) {
        if self.flat.get(self.cursor).is_some() {
            self.events.push(Event::token(kind));
            self.cursor += 1;
        }
    }

    /// Consume every remaining token of the current line (content plus
    /// terminator) and advance to the next line.
    ///
    /// Calls [`Self::consume_line_gap`] first: a grammar rule that loops
    /// over several lines itself (a multi-line paragraph, a fenced block,
    /// a table) never returns to `root()` between them, so `root()`'s own
    /// per-line gap call only ever fires for the first line of such a
    /// run. Consuming it here too means every line gets its gap applied
    /// regardless of which loop is advancing past it; it is a no-op for a
    /// line whose gap already fired.
    pub fn bump_rest_of_line(&mut self) {
        self.consume_line_gap();
        let end = self.line_end(self.line);
        while self.cursor < end {
            self.bump_token();
        }
        self.line += 1;
    }

    /// Skip the current line without emitting any events for it (used for
    /// blank lines acting as block separators — the bytes are accounted
    /// for by `Event::Skip` so later siblings still get correct offsets).
    pub fn skip_line(&mut self) {
        self.consume_line_gap();
        let start = self.cursor.max(self.line_starts[self.line]);
        let end = self.line_end(self.line);
        self.events.push(Event::Skip((end - start) as u32));
        self.cursor = end;
        self.line += 1;
    }

    /// Take ownership of the current line's content tokens and terminator
    /// (as [`LineToken`]s, ready for [`mmd_classify::Classifier::classify_line`]),
    /// advancing past it with an `Event::Skip` rather than emitting leaves —
    /// the caller is responsible for re-parsing and grafting the content
    /// back in (spec.md §4.4 "strip markers recursively, re-parse").
    pub fn take_current_line_tokens(&mut self) -> (Vec<LineToken<'input>>, Option<LineToken<'input>>) {
        self.consume_line_gap();
        let start = self.cursor.max(self.line_starts[self.line]);
        let end = self.line_end(self.line);
        let slice = &self.flat[start..end];
        let (content, term) = match slice.last() {
            Some(t) if matches!(t.kind, TokenKind::Newline | TokenKind::Linebreak) => {
                (&slice[..slice.len() - 1], Some(*t))
            }
            _ => (slice, None),
        };
        let tokens = content.iter().map(|t| LineToken { kind: t.kind, text: t.text }).collect();
        let terminator = term.map(|t| LineToken { kind: t.kind, text: t.text });
        self.events.push(Event::Skip((end - start) as u32));
        self.cursor = end;
        self.line += 1;
        (tokens, terminator)
    }

    /// Splice an independently-parsed subtree into the node currently
    /// being built (spec.md §4.4 container re-parse).
    pub fn graft(&mut self, sub: TokenArena, sub_root: Index) {
        self.events.push(Event::Graft(sub, sub_root));
    }

    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker { pos, completed: false }
    }
}

#[must_use = "markers must be completed or abandoned"]
pub struct Marker {
    pos: usize,
    completed: bool,
}

impl Marker {
    pub fn complete(mut self, p: &mut Parser<'_>, kind: TokenKind) -> CompletedMarker {
        self.completed = true;
        let slot = &mut p.events[self.pos];
        assert!(matches!(slot, Event::Placeholder));
        *slot = Event::Start { kind, forward_parent: None };
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    pub fn abandon(mut self, p: &mut Parser<'_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Wrap the already-completed node in a new parent, started
    /// retroactively before it (the "precede" pattern — used to turn an
    /// in-progress `Paragraph` into a `Heading` once a setext underline
    /// confirms it).
    pub fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);
        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }
        Marker { pos: new_pos, completed: false }
    }
}
