//! Growable byte buffer (spec.md §4.1).
//!
//! Grounded on `d_string.c` from the original implementation: append,
//! prepend, insert, erase, substring-copy, and a replace-within-range that
//! reports the net length delta so callers (the critic-markup rewriter,
//! the transcluder) can keep other offsets valid without rescanning.
//!
//! Growth is geometric (doubling) up to [`GEOMETRIC_GROWTH_CAP`], then
//! linear in [`LINEAR_GROWTH_STEP`]-byte chunks, matching the "grows
//! geometrically ... then linearly" contract in spec.md §4.1. `Vec<u8>`'s
//! default growth is geometric forever, so capacity management is done
//! explicitly here rather than delegated to `Vec::push`.

use std::ops::Range;

/// Capacity (bytes) above which growth switches from doubling to linear.
pub const GEOMETRIC_GROWTH_CAP: usize = 1 << 20; // 1 MiB
/// Chunk size used for linear growth once past the geometric cap.
pub const LINEAR_GROWTH_STEP: usize = 1 << 18; // 256 KiB

/// A growable, append/insert/erase-capable byte buffer addressed by
/// absolute byte offsets.
///
/// Once tokenization begins the buffer is not mutated except by the
/// critic-markup rewriter and the transcluder (spec.md §3 "Source
/// buffer" invariant) -- this type doesn't enforce that itself; callers
/// (mmd-core) are responsible for sequencing.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { data: bytes }
    }

    pub fn from_str(s: &str) -> Self {
        Self { data: s.as_bytes().to_vec() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_str(&self) -> &str {
        // The buffer is UTF-8 for the lifetime of this crate's use: source
        // text enters as `&str` and all mutations go through this type's
        // own byte-range-respecting methods.
        std::str::from_utf8(&self.data).unwrap_or("")
    }

    fn grow_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed <= self.data.capacity() {
            return;
        }
        let target = if self.data.capacity() < GEOMETRIC_GROWTH_CAP {
            (self.data.capacity() * 2).max(needed).max(64)
        } else {
            let mut cap = self.data.capacity();
            while cap < needed {
                cap += LINEAR_GROWTH_STEP;
            }
            cap
        };
        self.data.reserve(target - self.data.len());
    }

    /// Append raw bytes to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append a `&str` (formatted text already rendered by the caller).
    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Prepend bytes to the start of the buffer.
    pub fn prepend(&mut self, bytes: &[u8]) {
        self.insert(0, bytes);
    }

    /// Insert bytes at an absolute offset. `offset > len()` clamps to the
    /// end, mirroring the original's tolerant bounds handling.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) {
        let offset = offset.min(self.data.len());
        self.grow_for(bytes.len());
        self.data.splice(offset..offset, bytes.iter().copied());
    }

    /// Erase `range` from the buffer. Out-of-bounds ranges are clamped;
    /// an empty or inverted range is a no-op.
    pub fn erase(&mut self, range: Range<usize>) {
        let start = range.start.min(self.data.len());
        let end = range.end.min(self.data.len());
        if start >= end {
            return;
        }
        self.data.drain(start..end);
    }

    /// Copy out the substring at `range` as an owned `String`. Invalid
    /// UTF-8 boundaries fall back to a lossy conversion rather than
    /// panicking, since erase/insert can in principle straddle a
    /// multi-byte sequence if a caller passes a bad range.
    pub fn substring(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.data.len());
        let end = range.end.min(self.data.len()).max(start);
        String::from_utf8_lossy(&self.data[start..end]).into_owned()
    }

    /// Replace the bytes in `range` with `replacement`, returning the net
    /// length delta (`replacement.len() as isize - range.len() as isize`).
    ///
    /// A replace whose `range` falls entirely outside `window` is a no-op
    /// and returns `0`, per spec.md §4.1 "A replace operation that targets
    /// text outside the caller-specified window is a no-op."
    pub fn replace_in_window(
        &mut self,
        range: Range<usize>,
        replacement: &[u8],
        window: Range<usize>,
    ) -> isize {
        if range.start < window.start || range.end > window.end {
            return 0;
        }
        let start = range.start.min(self.data.len());
        let end = range.end.min(self.data.len()).max(start);
        let old_len = end - start;
        self.grow_for(replacement.len().saturating_sub(old_len));
        self.data.splice(start..end, replacement.iter().copied());
        replacement.len() as isize - old_len as isize
    }

    /// Replace with no windowing restriction (used internally, e.g. by
    /// the critic-markup rewriter which always operates within known
    /// match bounds).
    pub fn replace(&mut self, range: Range<usize>, replacement: &[u8]) -> isize {
        let len = self.data.len();
        self.replace_in_window(range, replacement, 0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_and_read_back() {
        let mut b = Buffer::new();
        b.append_str("hello");
        b.append_str(" world");
        assert_eq!(b.as_str(), "hello world");
    }

    #[test]
    fn insert_in_middle() {
        let mut b = Buffer::from_str("helloworld");
        b.insert(5, b", ");
        assert_eq!(b.as_str(), "hello, world");
    }

    #[test]
    fn erase_range() {
        let mut b = Buffer::from_str("hello, world");
        b.erase(5..7);
        assert_eq!(b.as_str(), "helloworld");
    }

    #[test]
    fn erase_out_of_bounds_clamps() {
        let mut b = Buffer::from_str("abc");
        b.erase(1..100);
        assert_eq!(b.as_str(), "a");
    }

    #[test]
    fn replace_reports_delta() {
        let mut b = Buffer::from_str("foo bar baz");
        let delta = b.replace(4..7, b"quux");
        assert_eq!(b.as_str(), "foo quux baz");
        assert_eq!(delta, 1);
    }

    #[test]
    fn replace_outside_window_is_noop() {
        let mut b = Buffer::from_str("foo bar baz");
        let delta = b.replace_in_window(8..11, b"x", 0..4);
        assert_eq!(b.as_str(), "foo bar baz");
        assert_eq!(delta, 0);
    }

    #[test]
    fn substring_extracts_range() {
        let b = Buffer::from_str("abcdef");
        assert_eq!(b.substring(2..4), "cd");
    }

    #[test]
    fn prepend_shifts_content() {
        let mut b = Buffer::from_str("world");
        b.prepend(b"hello ");
        assert_eq!(b.as_str(), "hello world");
    }
}
