use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::fmt;

/// An immutable copy of one output atom.
///
/// Accepted matches carry value copies of their atoms; the fragment
/// database and the query structure remain the owners of all backing
/// coordinate storage.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentAtom {
    pub name: String,
    pub chain_id: char,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
    pub residue_name: String,
    pub position: Point3<f64>,
}

/// A chain/residue/insertion-code location inside a source structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueLocus {
    pub chain_id: char,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
}

impl fmt::Display for ResidueLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:04}", self.chain_id, self.residue_number)?;
        if let Some(icode) = self.insertion_code {
            write!(f, "{}", icode)?;
        }
        Ok(())
    }
}

/// A match accepted by a scan, before its search-order index is known.
///
/// Scans evaluate start indices independently (possibly in parallel), so
/// index assignment is deferred until all candidates are collected; this
/// keeps provenance keys deterministic regardless of evaluation order.
#[derive(Debug, Clone)]
pub(crate) struct PendingMatch {
    pub segment_id: String,
    pub start: ResidueLocus,
    pub end: ResidueLocus,
    pub sequence: String,
    pub rmsd: f64,
    pub backbone_rmsd: Option<f64>,
    pub atoms: Vec<FragmentAtom>,
}

/// One accepted match: provenance key, matched sequence, scores, and the
/// aligned atom set.
#[derive(Debug, Clone)]
pub struct Match {
    /// Formatted provenance key:
    /// `<index:06>-<segment>-<chain>_<resnum:04><icode>-<chain>_<resnum:04><icode>`.
    pub key: String,
    /// Source structure the fragment came from.
    pub segment_id: String,
    /// First matched residue.
    pub start: ResidueLocus,
    /// Last matched residue.
    pub end: ResidueLocus,
    /// One-letter sequence of the matched residue run.
    pub sequence: String,
    /// Stem RMSD after optimal superposition, in Angstroms.
    pub rmsd: f64,
    /// Backbone RMSD from fine verification, when it was performed.
    pub backbone_rmsd: Option<f64>,
    /// Aligned output atoms (matched span or full source structure).
    pub atoms: Vec<FragmentAtom>,
}

impl Match {
    /// Builds a standalone structure from the match's atoms, e.g. for
    /// writing out as PDB.
    pub fn to_system(&self) -> MolecularSystem {
        let mut system = MolecularSystem::new();
        for atom in &self.atoms {
            let chain_id = system.add_chain(atom.chain_id);
            let residue_id = system
                .add_residue(
                    chain_id,
                    atom.residue_number,
                    atom.insertion_code,
                    &atom.residue_name,
                )
                .expect("chain inserted above");
            system.add_atom_to_residue(
                residue_id,
                Atom::new(&atom.name, residue_id, atom.position),
            );
        }
        system
    }
}

/// The ordered results of one search call.
///
/// Each search returns a fresh report; nothing is carried over between
/// calls and overlapping matches are not deduplicated.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    matches: Vec<Match>,
}

impl SearchReport {
    /// Assigns search-order indices and provenance keys to the collected
    /// candidates. Indices are 1-based, in database scan order.
    pub(crate) fn from_pending(pending: Vec<PendingMatch>) -> Self {
        let matches = pending
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let key = format!("{:06}-{}-{}-{}", i + 1, p.segment_id, p.start, p.end);
                Match {
                    key,
                    segment_id: p.segment_id,
                    start: p.start,
                    end: p.end,
                    sequence: p.sequence,
                    rmsd: p.rmsd,
                    backbone_rmsd: p.backbone_rmsd,
                    atoms: p.atoms,
                }
            })
            .collect();
        Self { matches }
    }

    /// Number of accepted matches.
    pub fn num_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Accepted matches in search order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// The provenance-key to one-letter-sequence mapping.
    pub fn matched_sequences(&self) -> impl Iterator<Item = (&str, &str)> {
        self.matches
            .iter()
            .map(|m| (m.key.as_str(), m.sequence.as_str()))
    }
}
