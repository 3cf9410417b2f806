use super::error::EngineError;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry;
use nalgebra::Point3;
use tracing::{debug, warn};

/// One database residue: identity plus coordinates.
///
/// Records are immutable once loaded and owned exclusively by
/// [`FragmentDatabase`]; scanners refer to them by index and copies are
/// made only when a match is promoted into an output fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    /// Identifier of the source structure this residue came from.
    pub segment_id: String,
    /// Chain identifier within the source structure.
    pub chain_id: char,
    /// Residue sequence number.
    pub residue_number: isize,
    /// PDB insertion code, if any.
    pub insertion_code: Option<char>,
    /// Three-letter residue name.
    pub residue_name: String,
    /// Alpha-carbon position, in Angstroms.
    pub ca: Point3<f64>,
    /// Backbone nitrogen position, when the source provides it.
    pub n: Option<Point3<f64>>,
    /// Backbone carbonyl-carbon position, when the source provides it.
    pub c: Option<Point3<f64>>,
}

/// An ordered sequence of residue records drawn from one or more source
/// structures, in source-file order.
///
/// Adjacency in the sequence does not imply chain continuity: chain and
/// segment boundaries are encoded per record, so every consumer must check
/// [`same_segment`](Self::same_segment), [`same_chain`](Self::same_chain),
/// and [`numbering_gap`](Self::numbering_gap) before treating two indices
/// as geometrically contiguous.
#[derive(Debug, Clone, Default)]
pub struct FragmentDatabase {
    records: Vec<ResidueRecord>,
}

impl FragmentDatabase {
    /// Builds a database from parsed structures in iteration order.
    ///
    /// Residues without a Cα atom are skipped with a warning. A fragment
    /// search is meaningless over fewer than 5 records, so a smaller
    /// result is a fatal precondition failure.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DatabaseTooSmall`] when fewer than 5 records
    /// survive ingestion.
    pub fn from_systems<'a, I>(sources: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (&'a str, &'a MolecularSystem)>,
    {
        let mut database = Self::default();
        for (segment_id, system) in sources {
            database.ingest(segment_id, system);
        }
        if database.len() < 5 {
            return Err(EngineError::DatabaseTooSmall {
                size: database.len(),
            });
        }
        Ok(database)
    }

    fn ingest(&mut self, segment_id: &str, system: &MolecularSystem) {
        let before = self.records.len();
        for &residue_id in system.ordered_residues() {
            let residue = system.residue(residue_id).expect("ordered residue exists");
            let chain = system.chain(residue.chain_id).expect("residue has chain");

            let Some(ca_id) = residue.get_atom_id_by_name("CA") else {
                warn!(
                    segment = segment_id,
                    chain = %chain.id,
                    residue = residue.number,
                    "Residue has no CA atom; skipping"
                );
                continue;
            };
            let ca = system.atom(ca_id).expect("atom id from residue").position;
            let n = residue
                .get_atom_id_by_name("N")
                .map(|id| system.atom(id).expect("atom id from residue").position);
            let c = residue
                .get_atom_id_by_name("C")
                .map(|id| system.atom(id).expect("atom id from residue").position);

            self.records.push(ResidueRecord {
                segment_id: segment_id.to_string(),
                chain_id: chain.id,
                residue_number: residue.number,
                insertion_code: residue.insertion_code,
                residue_name: residue.name.clone(),
                ca,
                n,
                c,
            });
        }
        debug!(
            segment = segment_id,
            added = self.records.len() - before,
            total = self.records.len(),
            "Ingested segment into fragment database"
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResidueRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ResidueRecord] {
        &self.records
    }

    /// Whether two indices come from the same source structure.
    pub fn same_segment(&self, i: usize, j: usize) -> bool {
        self.records[i].segment_id == self.records[j].segment_id
    }

    /// Whether two indices belong to the same chain.
    pub fn same_chain(&self, i: usize, j: usize) -> bool {
        self.records[i].chain_id == self.records[j].chain_id
    }

    /// Signed residue-number difference between two indices.
    pub fn numbering_gap(&self, i: usize, j: usize) -> isize {
        self.records[j].residue_number - self.records[i].residue_number
    }

    /// Squared Cα-Cα distance between two indices.
    pub fn distance_sq(&self, i: usize, j: usize) -> f64 {
        geometry::distance_squared(&self.records[i].ca, &self.records[j].ca)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::io::pdb::PdbFile;
    use crate::core::io::traits::MolecularFile;
    use std::io::BufReader;

    const TWO_CHAIN_PDB: &str = "\
ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  CA  GLY A   1       1.458   0.000   0.000  1.00  0.00           C
ATOM      3  C   GLY A   1       2.009   1.420   0.000  1.00  0.00           C
ATOM      4  CA  ALA A   2       3.988   2.839   0.000  1.00  0.00           C
ATOM      5  CA  SER A   4       7.500   3.000   0.000  1.00  0.00           C
ATOM      6  CA  LEU B   1      20.000   0.000   0.000  1.00  0.00           C
ATOM      7  CB  VAL B   2      24.000   0.000   0.000  1.00  0.00           C
END
";

    fn two_chain_system() -> MolecularSystem {
        let mut reader = BufReader::new(TWO_CHAIN_PDB.as_bytes());
        PdbFile::read_from(&mut reader).unwrap().0
    }

    #[test]
    fn ingestion_keeps_file_order_and_skips_ca_less_residues() {
        let system = two_chain_system();
        let mut database = FragmentDatabase::default();
        database.ingest("1abc", &system);

        // VAL B2 has no CA and is dropped.
        assert_eq!(database.len(), 4);
        assert_eq!(database.get(0).unwrap().residue_name, "GLY");
        assert_eq!(database.get(3).unwrap().chain_id, 'B');
        assert!(database.get(0).unwrap().n.is_some());
        assert!(database.get(1).unwrap().n.is_none());
    }

    #[test]
    fn adjacency_predicates_report_boundaries() {
        let system = two_chain_system();
        let mut database = FragmentDatabase::default();
        database.ingest("1abc", &system);

        assert!(database.same_segment(0, 3));
        assert!(database.same_chain(0, 1));
        assert!(!database.same_chain(2, 3));
        assert_eq!(database.numbering_gap(0, 1), 1);
        assert_eq!(database.numbering_gap(1, 2), 2); // numbering jump 2 -> 4
    }

    #[test]
    fn segments_are_distinguished_across_sources() {
        let system = two_chain_system();
        let database =
            FragmentDatabase::from_systems([("1abc", &system), ("2xyz", &system)]).unwrap();
        assert_eq!(database.len(), 8);
        assert!(database.same_segment(0, 3));
        assert!(!database.same_segment(0, 4));
    }

    #[test]
    fn too_small_database_is_a_fatal_precondition() {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A');
        for number in 1..=4 {
            let residue_id = system.add_residue(chain_id, number, None, "GLY").unwrap();
            system.add_atom_to_residue(
                residue_id,
                crate::core::models::atom::Atom::new(
                    "CA",
                    residue_id,
                    Point3::new(number as f64, 0.0, 0.0),
                ),
            );
        }
        let err = FragmentDatabase::from_systems([("tiny", &system)]).unwrap_err();
        assert!(matches!(err, EngineError::DatabaseTooSmall { size: 4 }));
    }

    #[test]
    fn straight_line_helper_spaces_residues_evenly() {
        let database = database_from_records(straight_line_records("db", 'A', 1, 10));
        assert_eq!(database.len(), 10);
        assert!((database.distance_sq(0, 1) - 3.8 * 3.8).abs() < 1e-9);
        assert_eq!(database.numbering_gap(0, 9), 9);
    }
}
