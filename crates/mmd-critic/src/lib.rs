//! Critic-markup sub-parser (spec.md §4.9), grounded on the original
//! implementation's `critic_markup.c`: a fixed literal marker set is
//! matched over the raw buffer with the generic Aho-Corasick engine from
//! `mmd-aho`, leftmost-longest and non-overlapping, then reduced to a
//! stack of open/mid/close markers forming `{ add, del, sub, highlight,
//! comment }` spans. A caller can then rewrite the buffer to either its
//! "accept all" or "reject all" form.
//!
//! This is a separate pass from `mmd-delim`'s generic token-pair engine:
//! the base lexer tokenizes `{`, `+`, `+`, `}` as independent
//! single-character tokens, so recognizing the multi-character markers
//! `{++`/`++}`/etc. as units happens here, directly over source bytes,
//! rather than through the tree the grammar already built.

use mmd_aho::AhoCorasick;
use std::sync::OnceLock;

/// Which critic-markup construct a matched span represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticKind {
    Add,
    Del,
    Sub,
    Highlight,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerRole {
    Open(CriticKind),
    Mid,
    Close(CriticKind),
}

const MARKERS: &[&str] = &["{++", "++}", "{--", "--}", "{~~", "~>", "~~}", "{==", "==}", "{>>", "<<}"];

fn marker_role(pattern: u32) -> MarkerRole {
    use CriticKind::*;
    use MarkerRole::*;
    match pattern {
        0 => Open(Add),
        1 => Close(Add),
        2 => Open(Del),
        3 => Close(Del),
        4 => Open(Sub),
        5 => Mid,
        6 => Close(Sub),
        7 => Open(Highlight),
        8 => Close(Highlight),
        9 => Open(Comment),
        10 => Close(Comment),
        _ => unreachable!("mmd-aho reported a pattern index outside MARKERS"),
    }
}

fn trie() -> &'static AhoCorasick {
    static TRIE: OnceLock<AhoCorasick> = OnceLock::new();
    TRIE.get_or_init(|| AhoCorasick::new(MARKERS.iter().copied()))
}

/// One fully matched critic-markup construct, with byte offsets into the
/// original source for each marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticSpan {
    pub kind: CriticKind,
    pub open_start: usize,
    pub open_end: usize,
    /// Present only for `Sub`: the `~>` separator between old and new text.
    pub mid: Option<(usize, usize)>,
    pub close_start: usize,
    pub close_end: usize,
}

struct OpenFrame {
    kind: CriticKind,
    start: usize,
    open_end: usize,
    mid: Option<(usize, usize)>,
}

/// Find every critic-markup span in `source`, skipping markers that are
/// backslash-escaped.
pub fn scan(source: &str) -> Vec<CriticSpan> {
    let bytes = source.as_bytes();
    let matches = trie().find_leftmost_longest(bytes);

    let mut stack: Vec<OpenFrame> = Vec::new();
    let mut spans = Vec::new();

    for m in matches {
        if m.start > 0 && bytes[m.start - 1] == b'\\' {
            continue; // escaped marker: literal text, not structural
        }
        match marker_role(m.pattern) {
            MarkerRole::Open(kind) => {
                stack.push(OpenFrame { kind, start: m.start, open_end: m.start + m.len, mid: None });
            }
            MarkerRole::Mid => {
                if let Some(top) = stack.last_mut() {
                    if top.kind == CriticKind::Sub && top.mid.is_none() {
                        top.mid = Some((m.start, m.start + m.len));
                    }
                }
            }
            MarkerRole::Close(kind) => {
                let Some(top) = stack.last() else { continue };
                if top.kind != kind {
                    continue; // stray/mismatched closer: ignore, leave as text
                }
                let frame = stack.pop().unwrap();
                spans.push(CriticSpan {
                    kind: frame.kind,
                    open_start: frame.start,
                    open_end: frame.open_end,
                    mid: frame.mid,
                    close_start: m.start,
                    close_end: m.start + m.len,
                });
            }
        }
    }

    spans.sort_by_key(|s| s.open_start);
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Accept,
    Reject,
}

/// Rewrite `source` by resolving every critic-markup span per `mode`
/// (spec.md §8 "accept/reject duality"). Highlights carry no edit
/// decision and keep their inner text either way; comments carry no
/// visible content and are dropped either way.
pub fn apply_edits(source: &str, spans: &[CriticSpan], mode: EditMode) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0usize;
    for span in spans {
        out.push_str(&source[last..span.open_start]);
        out.push_str(&resolve(source, span, mode));
        last = span.close_end;
    }
    out.push_str(&source[last..]);
    out
}

fn resolve(source: &str, span: &CriticSpan, mode: EditMode) -> String {
    match span.kind {
        CriticKind::Add => match mode {
            EditMode::Accept => source[span.open_end..span.close_start].to_string(),
            EditMode::Reject => String::new(),
        },
        CriticKind::Del => match mode {
            EditMode::Accept => String::new(),
            EditMode::Reject => source[span.open_end..span.close_start].to_string(),
        },
        CriticKind::Sub => {
            let (mid_start, mid_end) = span.mid.unwrap_or((span.close_start, span.close_start));
            match mode {
                EditMode::Accept => source[mid_end..span.close_start].to_string(),
                EditMode::Reject => source[span.open_end..mid_start].to_string(),
            }
        }
        CriticKind::Highlight => source[span.open_end..span.close_start].to_string(),
        CriticKind::Comment => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scans_addition() {
        let spans = scan("a {++new++} b");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, CriticKind::Add);
    }

    #[test]
    fn accepts_and_rejects_addition() {
        let spans = scan("a {++new++} b");
        assert_eq!(apply_edits("a {++new++} b", &spans, EditMode::Accept), "a new b");
        assert_eq!(apply_edits("a {++new++} b", &spans, EditMode::Reject), "a  b");
    }

    #[test]
    fn accepts_and_rejects_deletion() {
        let src = "a {--old--} b";
        let spans = scan(src);
        assert_eq!(apply_edits(src, &spans, EditMode::Accept), "a  b");
        assert_eq!(apply_edits(src, &spans, EditMode::Reject), "a old b");
    }

    #[test]
    fn substitution_picks_old_or_new() {
        let src = "a {~~old~>new~~} b";
        let spans = scan(src);
        assert_eq!(spans[0].kind, CriticKind::Sub);
        assert_eq!(apply_edits(src, &spans, EditMode::Accept), "a new b");
        assert_eq!(apply_edits(src, &spans, EditMode::Reject), "a old b");
    }

    #[test]
    fn highlight_keeps_text_either_way() {
        let src = "a {==marked==} b";
        let spans = scan(src);
        assert_eq!(apply_edits(src, &spans, EditMode::Accept), "a marked b");
        assert_eq!(apply_edits(src, &spans, EditMode::Reject), "a marked b");
    }

    #[test]
    fn comment_is_dropped_either_way() {
        let src = "a {>>note<<} b";
        let spans = scan(src);
        assert_eq!(apply_edits(src, &spans, EditMode::Accept), "a  b");
        assert_eq!(apply_edits(src, &spans, EditMode::Reject), "a  b");
    }

    #[test]
    fn escaped_marker_is_ignored() {
        let spans = scan(r"a \{++not critic++} b");
        assert!(spans.is_empty());
    }

    #[test]
    fn multiple_spans_rewrite_independently() {
        let src = "{++a++} and {--b--}";
        let spans = scan(src);
        assert_eq!(spans.len(), 2);
        assert_eq!(apply_edits(src, &spans, EditMode::Accept), "a and ");
        assert_eq!(apply_edits(src, &spans, EditMode::Reject), " and b");
    }
}
