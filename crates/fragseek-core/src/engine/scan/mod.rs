//! The three candidate scanners, one file per query mode.
//!
//! All modes share the same two-phase strategy: cheap structural-continuity
//! and squared-distance filters prune the search space before any
//! superposition is attempted. Candidates that fail a filter are skipped
//! silently; only accepted matches survive into the result set.
//!
//! Scanners advance one start index at a time, including after a
//! continuity failure. (The historical implementation of the variable-gap
//! mode jumped past the whole failing window, which also skipped windows
//! that would have passed; that pruning is deliberately not reproduced.)

pub(crate) mod linear;
pub(crate) mod spot;
pub(crate) mod stems;

use super::database::FragmentDatabase;

/// Whether stepping from index `from` to `to` stays inside one contiguous
/// chain run: same segment, same chain, and a residue-numbering difference
/// no larger than the index distance.
pub(super) fn contiguous_step(
    db: &FragmentDatabase,
    from: usize,
    to: usize,
    max_numbering_gap: isize,
) -> bool {
    db.same_segment(from, to)
        && db.same_chain(from, to)
        && db.numbering_gap(from, to).abs() <= max_numbering_gap
}
