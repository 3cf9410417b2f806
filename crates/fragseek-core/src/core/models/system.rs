use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use slotmap::SlotMap;
use std::collections::HashMap;

/// A parsed molecular structure: atoms, residues, and chains.
///
/// This is the central data structure the search engine reads from. It is
/// the sole owner of all coordinate storage; every other component refers
/// to its contents through [`AtomId`]/[`ResidueId`]/[`ChainId`] handles or
/// takes immutable copies when a match is promoted into an output
/// fragment.
///
/// Residues additionally keep a global insertion order (`ordered_residues`)
/// so that consumers can reason about source-file adjacency across chain
/// boundaries, which is how the fragment database is built.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    atoms: SlotMap<AtomId, Atom>,
    residues: SlotMap<ResidueId, Residue>,
    chains: SlotMap<ChainId, Chain>,
    /// All residues in source-file order, across chains.
    ordered_residues: Vec<ResidueId>,
    /// Lookup by (chain, residue number, insertion code).
    residue_id_map: HashMap<(ChainId, isize, Option<char>), ResidueId>,
    chain_id_map: HashMap<char, ChainId>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    /// Residue IDs in source-file order, across chain boundaries.
    pub fn ordered_residues(&self) -> &[ResidueId] {
        &self.ordered_residues
    }

    /// The index of a residue in source-file order.
    pub fn residue_position_index(&self, id: ResidueId) -> Option<usize> {
        self.ordered_residues.iter().position(|&r| r == id)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue_count(&self) -> usize {
        self.ordered_residues.len()
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue by chain character, sequence number, and insertion code.
    pub fn find_residue(
        &self,
        chain: char,
        residue_number: isize,
        insertion_code: Option<char>,
    ) -> Option<ResidueId> {
        let chain_id = self.find_chain_by_id(chain)?;
        self.residue_id_map
            .get(&(chain_id, residue_number, insertion_code))
            .copied()
    }

    /// Looks up an atom by name within a residue.
    pub fn find_atom_in_residue(&self, residue_id: ResidueId, name: &str) -> Option<AtomId> {
        self.residues.get(residue_id)?.get_atom_id_by_name(name)
    }

    /// Adds a chain or returns the existing one with the same identifier.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        *self
            .chain_id_map
            .entry(id)
            .or_insert_with(|| self.chains.insert(Chain::new(id)))
    }

    /// Adds a residue to a chain, or returns the existing one with the same
    /// (chain, number, insertion code) key.
    ///
    /// # Return
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number, insertion_code);

        if let Some(&existing) = self.residue_id_map.get(&key) {
            return Some(existing);
        }

        let residue = Residue::new(residue_number, insertion_code, name, chain_id);
        let residue_id = self.residues.insert(residue);
        self.residue_id_map.insert(key, residue_id);
        chain.residues.push(residue_id);
        self.ordered_residues.push(residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a residue.
    ///
    /// # Return
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        self.residues
            .get_mut(residue_id)
            .expect("residue checked above")
            .add_atom(&name, atom_id);
        Some(atom_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn build_two_residue_system() -> (MolecularSystem, ResidueId, ResidueId) {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A');
        let res1 = system.add_residue(chain_id, 1, None, "GLY").unwrap();
        let res2 = system.add_residue(chain_id, 2, None, "ALA").unwrap();
        system.add_atom_to_residue(res1, Atom::new("CA", res1, Point3::new(0.0, 0.0, 0.0)));
        system.add_atom_to_residue(res2, Atom::new("CA", res2, Point3::new(3.8, 0.0, 0.0)));
        (system, res1, res2)
    }

    #[test]
    fn add_chain_is_idempotent() {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A');
        let b = system.add_chain('A');
        assert_eq!(a, b);
        assert_ne!(system.add_chain('B'), a);
    }

    #[test]
    fn residues_keep_source_file_order() {
        let (system, res1, res2) = build_two_residue_system();
        assert_eq!(system.ordered_residues(), &[res1, res2]);
        assert_eq!(system.residue_position_index(res2), Some(1));
    }

    #[test]
    fn find_residue_distinguishes_insertion_codes() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A');
        let plain = system.add_residue(chain_id, 52, None, "SER").unwrap();
        let inserted = system.add_residue(chain_id, 52, Some('A'), "THR").unwrap();
        assert_ne!(plain, inserted);
        assert_eq!(system.find_residue('A', 52, None), Some(plain));
        assert_eq!(system.find_residue('A', 52, Some('A')), Some(inserted));
        assert_eq!(system.find_residue('A', 53, None), None);
    }

    #[test]
    fn find_atom_in_residue_by_name() {
        let (system, res1, _) = build_two_residue_system();
        let atom_id = system.find_atom_in_residue(res1, "CA").unwrap();
        assert_eq!(system.atom(atom_id).unwrap().name, "CA");
        assert!(system.find_atom_in_residue(res1, "CB").is_none());
    }

    #[test]
    fn duplicate_residue_key_returns_existing_id() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A');
        let first = system.add_residue(chain_id, 7, None, "LEU").unwrap();
        let second = system.add_residue(chain_id, 7, None, "LEU").unwrap();
        assert_eq!(first, second);
        assert_eq!(system.residue_count(), 1);
    }
}
