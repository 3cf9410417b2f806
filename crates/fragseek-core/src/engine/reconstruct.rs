use super::results::FragmentAtom;

/// External backbone-reconstruction service for Cα-only fragments.
///
/// Implementations fill in missing N/C/O backbone atoms of a Cα trace
/// (e.g. from a binned quadrilateral lookup table). The engine consults
/// this only in the Cα-only variant of the variable-gap search, and only
/// when no full-atom source directory is configured.
pub trait BackboneReconstructor: Sync {
    /// Adds missing backbone atoms to `fragment` in place.
    ///
    /// # Return
    ///
    /// The number of positions that could not be resolved. Any non-zero
    /// count causes the engine to reject the match.
    fn fill_missing_backbone_atoms(&self, fragment: &mut Vec<FragmentAtom>) -> usize;
}
