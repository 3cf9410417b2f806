use super::config::SearchConfig;
use super::database::{FragmentDatabase, ResidueRecord};
use super::results::{FragmentAtom, ResidueLocus};
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::MolecularFile;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::superposition::{RigidTransform, superpose};
use crate::core::utils::{codes, geometry};
use nalgebra::Point3;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

pub(crate) fn locus(record: &ResidueRecord) -> ResidueLocus {
    ResidueLocus {
        chain_id: record.chain_id,
        residue_number: record.residue_number,
        insertion_code: record.insertion_code,
    }
}

/// One-letter sequence of a database index range.
pub(crate) fn sequence_of(db: &FragmentDatabase, range: RangeInclusive<usize>) -> String {
    db.records()[*range.start()..=*range.end()]
        .iter()
        .map(|r| codes::one_letter_code(&r.residue_name))
        .collect()
}

/// Copies the Cα atoms of a database index range, mapped through the
/// superposition found on the stems.
pub(crate) fn ca_fragment_atoms(
    db: &FragmentDatabase,
    range: RangeInclusive<usize>,
    transform: &RigidTransform,
) -> Vec<FragmentAtom> {
    db.records()[*range.start()..=*range.end()]
        .iter()
        .map(|record| FragmentAtom {
            name: "CA".to_string(),
            chain_id: record.chain_id,
            residue_number: record.residue_number,
            insertion_code: record.insertion_code,
            residue_name: record.residue_name.clone(),
            position: transform.apply(&record.ca),
        })
        .collect()
}

pub(crate) struct FineOutcome {
    pub backbone_rmsd: Option<f64>,
    pub atoms: Vec<FragmentAtom>,
}

fn collect_span_ca(
    system: &MolecularSystem,
    chain: char,
    residue_range: RangeInclusive<isize>,
) -> Vec<Point3<f64>> {
    let mut positions = Vec::new();
    for &residue_id in system.ordered_residues() {
        let residue = system.residue(residue_id).expect("ordered residue exists");
        let chain_rec = system.chain(residue.chain_id).expect("residue has chain");
        if chain_rec.id != chain || !residue_range.contains(&residue.number) {
            continue;
        }
        if let Some(atom_id) = residue.get_atom_id_by_name("CA") {
            positions.push(system.atom(atom_id).expect("atom id from residue").position);
        }
    }
    positions
}

fn collect_output_atoms(
    system: &MolecularSystem,
    transform: &RigidTransform,
    selection: Option<(char, RangeInclusive<isize>)>,
) -> Vec<FragmentAtom> {
    let mut atoms = Vec::new();
    for &residue_id in system.ordered_residues() {
        let residue = system.residue(residue_id).expect("ordered residue exists");
        let chain_rec = system.chain(residue.chain_id).expect("residue has chain");
        if let Some((chain, ref range)) = selection {
            if chain_rec.id != chain || !range.contains(&residue.number) {
                continue;
            }
        }
        for &atom_id in residue.atoms() {
            let atom = system.atom(atom_id).expect("residue atom exists");
            atoms.push(FragmentAtom {
                name: atom.name.clone(),
                chain_id: chain_rec.id,
                residue_number: residue.number,
                insertion_code: residue.insertion_code,
                residue_name: residue.name.clone(),
                position: transform.apply(&atom.position),
            });
        }
    }
    atoms
}

/// Full-atom fine verification of an accepted Cα-trace match.
///
/// Loads `<source_dir>/<segment>.pdb`, superposes its matching Cα span
/// onto the already-aligned match trace, optionally checks the
/// stem-equivalent backbone atoms against the query stems at `ceiling`,
/// and materializes the output atoms. Every failure here is recoverable:
/// the candidate is dropped with a warning and the scan continues.
#[allow(clippy::too_many_arguments)]
pub(crate) fn fine_verify(
    config: &SearchConfig,
    segment_id: &str,
    chain: char,
    residue_range: RangeInclusive<isize>,
    matched_trace: &[Point3<f64>],
    stem_loci: &[ResidueLocus],
    query_stem_backbone: &[Point3<f64>],
    ceiling: Option<f64>,
) -> Option<FineOutcome> {
    let source_dir = config.source_dir.as_ref()?;
    let path = source_dir.join(format!("{segment_id}.pdb"));

    let (system, _) = match PdbFile::read_from_path(&path) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(path = %path.display(), %error, "Failed to load full-atom source; dropping match");
            return None;
        }
    };

    let source_ca = collect_span_ca(&system, chain, residue_range.clone());
    if source_ca.len() != matched_trace.len() {
        warn!(
            path = %path.display(),
            selected = source_ca.len(),
            expected = matched_trace.len(),
            "Problem aligning all atoms using the C-alpha trace; dropping match"
        );
        return None;
    }

    let sup = match superpose(&source_ca, matched_trace) {
        Ok(sup) => sup,
        Err(error) => {
            warn!(path = %path.display(), %error, "Full-atom superposition failed; dropping match");
            return None;
        }
    };

    let backbone_rmsd = if let Some(ceiling) = ceiling {
        let mut stem_backbone = Vec::with_capacity(stem_loci.len() * 3);
        for stem in stem_loci {
            let Some(residue_id) =
                system.find_residue(stem.chain_id, stem.residue_number, stem.insertion_code)
            else {
                warn!(%stem, path = %path.display(), "Stem-equivalent residue missing in source; dropping match");
                return None;
            };
            for name in ["N", "CA", "C"] {
                let Some(atom_id) = system.find_atom_in_residue(residue_id, name) else {
                    warn!(%stem, atom = name, "Stem-equivalent backbone atom missing; dropping match");
                    return None;
                };
                let position = system.atom(atom_id).expect("atom id from residue").position;
                stem_backbone.push(sup.transform.apply(&position));
            }
        }

        let rmsd = geometry::calculate_rmsd(&stem_backbone, query_stem_backbone)?;
        if rmsd > ceiling {
            debug!(backbone_rmsd = rmsd, ceiling, "Backbone RMSD above ceiling; dropping match");
            return None;
        }
        Some(rmsd)
    } else {
        None
    };

    let selection = if config.include_full_source {
        None
    } else {
        Some((chain, residue_range))
    };
    let atoms = collect_output_atoms(&system, &sup.transform, selection);

    Some(FineOutcome {
        backbone_rmsd,
        atoms,
    })
}
