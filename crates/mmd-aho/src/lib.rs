//! Generic multi-pattern Aho-Corasick matcher (spec.md §4.9, generic part).
//!
//! Grounded on the original implementation's `aho-corasick.c`: a flat,
//! index-addressed node table with a fixed 256-wide fan-out per node and a
//! failure-link back-pointer, rather than the bitmap-compressed trie the
//! `aho-corasick` crate uses for high-throughput search. That tradeoff is
//! deliberate here — the only caller (`mmd-critic`) matches a small, fixed
//! set of short literals, not an arbitrary large pattern set, so a plain
//! `[Option<u32>; 256]` table per node is simpler and fast enough.

use std::collections::VecDeque;

const ROOT: u32 = 0;

#[derive(Debug, Clone)]
struct TrieNode {
    children: [Option<u32>; 256],
    fail: u32,
    /// Index into the pattern table if a pattern ends at this node, plus
    /// every pattern ending here that is a suffix of a longer one already
    /// recorded (so a match at this node also reports its shorter
    /// suffixes, matching classic Aho-Corasick output).
    matches: Vec<u32>,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: [None; 256], fail: ROOT, matches: Vec::new() }
    }
}

/// A single non-overlapping hit: `pattern` indexes the slice originally
/// passed to [`AhoCorasick::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub len: usize,
    pub pattern: u32,
}

/// A built trie, ready to search any number of haystacks.
pub struct AhoCorasick {
    nodes: Vec<TrieNode>,
    pattern_lens: Vec<usize>,
}

impl AhoCorasick {
    /// Build a trie over `patterns`. Patterns must be non-empty; duplicate
    /// patterns are both kept (caller sees both indices on a match,
    /// `mmd-critic` uses this to distinguish escaped vs. unescaped forms
    /// that happen to share text).
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut nodes = vec![TrieNode::new()];
        let mut pattern_lens = Vec::new();

        for (idx, pattern) in patterns.into_iter().enumerate() {
            let pattern = pattern.as_ref();
            pattern_lens.push(pattern.len());
            let mut cur = ROOT;
            for &byte in pattern {
                cur = match nodes[cur as usize].children[byte as usize] {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::new());
                        let next = (nodes.len() - 1) as u32;
                        nodes[cur as usize].children[byte as usize] = Some(next);
                        next
                    }
                };
            }
            nodes[cur as usize].matches.push(idx as u32);
        }

        let mut trie = Self { nodes, pattern_lens };
        trie.build_failure_links();
        trie
    }

    /// BFS over the trie computing `fail` links and merging each node's
    /// match set with its failure target's (so a match at a deep node
    /// also reports any pattern that is a suffix of the path to it).
    fn build_failure_links(&mut self) {
        let mut queue = VecDeque::new();

        for byte in 0..256 {
            if let Some(child) = self.nodes[ROOT as usize].children[byte] {
                self.nodes[child as usize].fail = ROOT;
                queue.push_back(child);
            }
        }

        while let Some(node) = queue.pop_front() {
            for byte in 0..256 {
                let Some(child) = self.nodes[node as usize].children[byte] else { continue };
                let mut fail = self.nodes[node as usize].fail;
                let via = loop {
                    if let Some(next) = self.nodes[fail as usize].children[byte] {
                        break next;
                    }
                    if fail == ROOT {
                        break ROOT;
                    }
                    fail = self.nodes[fail as usize].fail;
                };
                let via = if via == child { ROOT } else { via };
                self.nodes[child as usize].fail = via;
                let suffix_matches = self.nodes[via as usize].matches.clone();
                self.nodes[child as usize].matches.extend(suffix_matches);
                queue.push_back(child);
            }
        }
    }

    /// Every match in `haystack`, including overlapping ones, in the
    /// order their end position is discovered (left to right).
    pub fn find_all_overlapping(&self, haystack: &[u8]) -> Vec<Match> {
        let mut out = Vec::new();
        let mut state = ROOT;
        for (i, &byte) in haystack.iter().enumerate() {
            loop {
                if let Some(next) = self.nodes[state as usize].children[byte as usize] {
                    state = next;
                    break;
                }
                if state == ROOT {
                    break;
                }
                state = self.nodes[state as usize].fail;
            }
            for &pat in &self.nodes[state as usize].matches {
                let len = self.pattern_lens[pat as usize];
                out.push(Match { start: i + 1 - len, len, pattern: pat });
            }
        }
        out
    }

    /// Leftmost-longest, non-overlapping matches (spec.md §4.9 / §8): among
    /// matches starting at the same or overlapping positions, keep the one
    /// that starts earliest, and among those, the longest; drop anything
    /// that overlaps a match already kept.
    pub fn find_leftmost_longest(&self, haystack: &[u8]) -> Vec<Match> {
        let mut all = self.find_all_overlapping(haystack);
        all.sort_by(|a, b| a.start.cmp(&b.start).then(b.len.cmp(&a.len)));

        let mut out = Vec::new();
        let mut next_free = 0usize;
        for m in all {
            if m.start < next_free {
                continue;
            }
            next_free = m.start + m.len;
            out.push(m);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_single_pattern() {
        let ac = AhoCorasick::new(["he"]);
        let hits = ac.find_leftmost_longest(b"she said he left");
        assert_eq!(hits, vec![Match { start: 2, len: 2, pattern: 0 }, Match { start: 9, len: 2, pattern: 0 }]);
    }

    #[test]
    fn leftmost_longest_prefers_longer_overlapping_match() {
        let ac = AhoCorasick::new(["he", "hers", "his", "she"]);
        let hits = ac.find_leftmost_longest(b"ushers");
        // "she" at 2 and "hers" at 2 overlap; "he" at 3 is subsumed too.
        assert_eq!(hits, vec![Match { start: 2, len: 4, pattern: 1 }]);
    }

    #[test]
    fn drops_matches_that_start_inside_a_kept_match() {
        let ac = AhoCorasick::new(["aa", "aaa"]);
        let hits = ac.find_leftmost_longest(b"aaaa");
        assert_eq!(hits, vec![Match { start: 0, len: 3, pattern: 1 }]);
    }

    #[test]
    fn no_match_returns_empty() {
        let ac = AhoCorasick::new(["xyz"]);
        assert!(ac.find_leftmost_longest(b"abcdef").is_empty());
    }

    #[test]
    fn critic_markup_literal_set() {
        let patterns = ["{++", "++}", "{--", "--}", "{~~", "~>", "~~}", "{==", "==}", "{>>", "<<}"];
        let ac = AhoCorasick::new(patterns);
        let hits = ac.find_leftmost_longest(b"{++ins++} and {--del--}");
        let slices: Vec<&str> = hits
            .iter()
            .map(|m| std::str::from_utf8(&b"{++ins++} and {--del--}"[m.start..m.start + m.len]).unwrap())
            .collect();
        assert_eq!(slices, vec!["{++", "++}", "{--", "--}"]);
    }
}
