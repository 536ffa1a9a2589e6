use bitflags::bitflags;

bitflags! {
    /// Per-pair behaviour flags (spec.md §4.6), grounded on the original
    /// implementation's `token_pairs.c` option bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PairOptions: u8 {
        /// An opener immediately followed by its own closer (`**` `**`
        /// back to back) is still a valid, empty pair.
        const ALLOW_EMPTY = 0b001;
        /// Reject a candidate match whose opener and closer run lengths
        /// differ (emphasis/code-span families: `**` never closes `*`).
        const MATCH_LENGTH = 0b010;
        /// Once matched, re-parent the span's child chain under the new
        /// pair node instead of leaving it flat under the pair's parent.
        const PRUNE_MATCH = 0b100;
    }
}
