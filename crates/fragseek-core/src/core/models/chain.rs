use super::ids::ResidueId;

/// A polypeptide chain: a single-character identifier plus the ordered
/// residues belonging to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Chain identifier (e.g. 'A', 'B').
    pub id: char,
    pub(crate) residues: Vec<ResidueId>,
}

impl Chain {
    pub(crate) fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    /// Residue IDs in source-file order.
    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }
}
