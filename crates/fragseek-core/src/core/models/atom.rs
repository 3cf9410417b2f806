use super::ids::ResidueId;
use nalgebra::Point3;

/// Classifies an atom by its structural role within a residue.
///
/// The fragment-search engine only cares about the backbone/side-chain
/// distinction: stem comparisons use backbone atoms (N, CA, C) while
/// accepted matches may carry the full residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain atom (N, CA, C, O and their hydrogens).
    Backbone,
    /// Side-group atom attached to the backbone.
    Sidechain,
    /// Unknown or unclassified atom.
    #[default]
    Other,
}

/// An atom in a molecular structure.
///
/// Atoms are owned by a [`MolecularSystem`](super::system::MolecularSystem)
/// and referenced by [`AtomId`](super::ids::AtomId); the parent residue is
/// recorded so metadata lookups never require a reverse scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name as read from the source file (e.g. "CA", "N").
    pub name: String,
    /// The ID of the parent residue.
    pub residue_id: ResidueId,
    /// Structural role of the atom.
    pub role: AtomRole,
    /// Coordinates in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            role: AtomRole::default(),
            position,
        }
    }

    pub fn with_role(mut self, role: AtomRole) -> Self {
        self.role = role;
        self
    }
}
