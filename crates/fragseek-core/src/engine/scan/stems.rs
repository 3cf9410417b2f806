//! Variable-gap search: two stem groups bracketing a fixed number of
//! database residues.

use crate::core::utils::superposition::{RigidTransform, superpose};
use crate::engine::config::{FragmentKind, SearchConfig};
use crate::engine::database::FragmentDatabase;
use crate::engine::evaluator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::query::StemGroupQuery;
use crate::engine::reconstruct::BackboneReconstructor;
use crate::engine::results::{FragmentAtom, PendingMatch};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use regex::Regex;
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument, warn};

/// Acceptance ceiling on the stem-equivalent backbone RMSD of the
/// full-atom fine check, in Angstroms.
const BACKBONE_RMSD_CEILING: f64 = 1.51;

#[instrument(skip_all, name = "stems_scan", fields(db_size = db.len(), gap = query.gap, window = query.window_len()))]
pub(crate) fn run(
    db: &FragmentDatabase,
    query: &StemGroupQuery,
    config: &SearchConfig,
    sequence_filter: Option<&Regex>,
    reconstructor: Option<&dyn BackboneReconstructor>,
    reporter: &ProgressReporter,
) -> Vec<PendingMatch> {
    let window = query.window_len();
    let Some(limit) = db.len().checked_sub(window).map(|last| last + 1) else {
        warn!(
            db_size = db.len(),
            window, "Database smaller than the candidate window"
        );
        return Vec::new();
    };

    reporter.report(Progress::ScanStart {
        total_steps: limit as u64,
    });
    let indices: Vec<usize> = (0..limit).collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = indices.iter();
    #[cfg(feature = "parallel")]
    let iterator = indices.par_iter();

    let matches: Vec<PendingMatch> = iterator
        .filter_map(|&start| {
            let found = evaluate_start(db, query, config, sequence_filter, reconstructor, start);
            reporter.report(Progress::ScanIncrement);
            found
        })
        .collect();

    reporter.report(Progress::ScanFinish);
    info!(
        candidates = limit,
        matches = matches.len(),
        "Variable-gap scan complete"
    );
    matches
}

fn evaluate_start(
    db: &FragmentDatabase,
    query: &StemGroupQuery,
    config: &SearchConfig,
    sequence_filter: Option<&Regex>,
    reconstructor: Option<&dyn BackboneReconstructor>,
    start: usize,
) -> Option<PendingMatch> {
    let s1 = query.stem1_ca.len();
    let s2 = query.stem2_ca.len();
    let c_last = start + s1 - 1;
    let n_first = start + s1 + query.gap;
    let n_last = n_first + s2 - 1;

    // The whole window must come from one structure and chain.
    if !db.same_segment(start, n_last) || !db.same_chain(start, n_last) {
        return None;
    }
    // Structures have numbering gaps; the inner stems must be separated
    // by exactly the requested residue count.
    if db.numbering_gap(c_last, n_first).abs() != (query.gap + 1) as isize {
        return None;
    }

    // Cheap cross-group distance filter before any alignment.
    let mut index = 0;
    for c in start..=c_last {
        for n in n_first..=n_last {
            if (query.stem_distance_sq[index] - db.distance_sq(c, n)).abs()
                > config.distance_tolerance_sq
            {
                return None;
            }
            index += 1;
        }
    }

    let window_stem_ca: Vec<_> = (start..=c_last)
        .chain(n_first..=n_last)
        .map(|i| db.records()[i].ca)
        .collect();
    let query_stem_ca: Vec<_> = query
        .stem1_ca
        .iter()
        .chain(query.stem2_ca.iter())
        .copied()
        .collect();
    let sup = match superpose(&window_stem_ca, &query_stem_ca) {
        Ok(sup) => sup,
        Err(error) => {
            warn!(start, %error, "Stem-group superposition failed; dropping candidate");
            return None;
        }
    };
    if sup.rmsd > config.rmsd_tolerance {
        return None;
    }

    let sequence = evaluator::sequence_of(db, start..=n_last);
    if let Some(filter) = sequence_filter {
        if !filter.is_match(&sequence) {
            debug!(start, %sequence, "Sequence filter rejected window");
            return None;
        }
    }

    let record_first = &db.records()[start];
    let record_last = &db.records()[n_last];

    let (backbone_rmsd, atoms) = if config.fragment_kind == FragmentKind::CaOnly
        && config.source_dir.is_some()
    {
        let matched_trace: Vec<_> = db.records()[start..=n_last]
            .iter()
            .map(|r| sup.transform.apply(&r.ca))
            .collect();
        let stem_loci = [evaluator::locus(record_first), evaluator::locus(record_last)];
        let outcome = evaluator::fine_verify(
            config,
            &record_first.segment_id,
            record_first.chain_id,
            record_first.residue_number..=record_last.residue_number,
            &matched_trace,
            &stem_loci,
            &query.terminal_backbone,
            Some(BACKBONE_RMSD_CEILING),
        )?;
        (outcome.backbone_rmsd, outcome.atoms)
    } else if let (FragmentKind::CaOnly, Some(reconstructor)) =
        (config.fragment_kind, reconstructor)
    {
        let mut atoms = evaluator::ca_fragment_atoms(db, start..=n_last, &sup.transform);
        let unresolved = reconstructor.fill_missing_backbone_atoms(&mut atoms);
        if unresolved > 0 {
            warn!(
                start,
                unresolved, "Backbone reconstruction left unresolved positions; dropping match"
            );
            return None;
        }
        (None, atoms)
    } else {
        let atoms = match config.fragment_kind {
            FragmentKind::AllAtom => backbone_fragment_atoms(db, start..=n_last, &sup.transform),
            FragmentKind::CaOnly => {
                evaluator::ca_fragment_atoms(db, start..=n_last, &sup.transform)
            }
        };
        (None, atoms)
    };

    debug!(start, end = n_last, rmsd = sup.rmsd, "Variable-gap match accepted");
    Some(PendingMatch {
        segment_id: record_first.segment_id.clone(),
        start: evaluator::locus(record_first),
        end: evaluator::locus(record_last),
        sequence,
        rmsd: sup.rmsd,
        backbone_rmsd,
        atoms,
    })
}

/// Copies every stored backbone atom of an index range, mapped through
/// the stem superposition.
fn backbone_fragment_atoms(
    db: &FragmentDatabase,
    range: RangeInclusive<usize>,
    transform: &RigidTransform,
) -> Vec<FragmentAtom> {
    let mut atoms = Vec::new();
    for record in &db.records()[*range.start()..=*range.end()] {
        for (name, position) in [
            ("N", record.n),
            ("CA", Some(record.ca)),
            ("C", record.c),
        ] {
            let Some(position) = position else { continue };
            atoms.push(FragmentAtom {
                name: name.to_string(),
                chain_id: record.chain_id,
                residue_number: record.residue_number,
                insertion_code: record.insertion_code,
                residue_name: record.residue_name.clone(),
                position: transform.apply(&position),
            });
        }
    }
    atoms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::database::test_support::*;
    use itertools::Itertools;
    use nalgebra::Point3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stem groups [1,2] and [8,9] of a straight 3.8-Angstrom line,
    /// bracketing five residues.
    fn straight_line_query() -> StemGroupQuery {
        let at = |i: f64| Point3::new(3.8 * i, 0.0, 0.0);
        let stem1_ca = vec![at(0.0), at(1.0)];
        let stem2_ca = vec![at(7.0), at(8.0)];
        let stem_distance_sq = stem1_ca
            .iter()
            .cartesian_product(stem2_ca.iter())
            .map(|(c, n)| (c - n).norm_squared())
            .collect();
        StemGroupQuery {
            stem1_ca,
            stem2_ca,
            stem_distance_sq,
            terminal_backbone: Vec::new(),
            gap: 5,
        }
    }

    struct CountingReconstructor {
        calls: AtomicUsize,
        unresolved: usize,
    }

    impl BackboneReconstructor for CountingReconstructor {
        fn fill_missing_backbone_atoms(&self, fragment: &mut Vec<FragmentAtom>) -> usize {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let template = fragment[0].clone();
            fragment.push(FragmentAtom {
                name: "N".to_string(),
                ..template
            });
            self.unresolved
        }
    }

    #[test]
    fn uninterrupted_chain_matches_every_window_including_the_last() {
        let db = database_from_records(straight_line_records("line", 'A', 1, 10));
        let matches = run(
            &db,
            &straight_line_query(),
            &SearchConfig::default(),
            None,
            None,
            &ProgressReporter::new(),
        );
        // A 9-residue window over 10 records has two placements.
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].start.residue_number, 1);
        assert_eq!(matches[0].end.residue_number, 9);
        assert_eq!(matches[1].start.residue_number, 2);
        assert_eq!(matches[1].end.residue_number, 10);
        assert!(matches.iter().all(|m| m.rmsd < 1e-9));
        assert_eq!(matches[0].sequence.len(), 9);
    }

    #[test]
    fn numbering_gap_between_inner_stems_is_enforced() {
        // Residue 6 is absent, so no window has exactly five residues
        // between the inner stems.
        let mut records = straight_line_records("line", 'A', 1, 10);
        records.remove(5);
        let db = database_from_records(records);
        let matches = run(
            &db,
            &straight_line_query(),
            &SearchConfig::default(),
            None,
            None,
            &ProgressReporter::new(),
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn distance_filter_rejects_displaced_stem_groups() {
        let mut records = straight_line_records("line", 'A', 1, 10);
        records[8].ca.y += 10.0;
        let db = database_from_records(records);
        let matches = run(
            &db,
            &straight_line_query(),
            &SearchConfig::default(),
            None,
            None,
            &ProgressReporter::new(),
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn reconstructor_is_consulted_for_ca_only_fragments() {
        let db = database_from_records(straight_line_records("line", 'A', 1, 10));
        let reconstructor = CountingReconstructor {
            calls: AtomicUsize::new(0),
            unresolved: 0,
        };
        let matches = run(
            &db,
            &straight_line_query(),
            &SearchConfig::default(),
            None,
            Some(&reconstructor),
            &ProgressReporter::new(),
        );
        assert_eq!(matches.len(), 2);
        assert_eq!(reconstructor.calls.load(Ordering::Relaxed), 2);
        // The reconstructor appended one atom to the 9-residue CA trace.
        assert_eq!(matches[0].atoms.len(), 10);
    }

    #[test]
    fn unresolved_reconstruction_rejects_the_match() {
        let db = database_from_records(straight_line_records("line", 'A', 1, 10));
        let reconstructor = CountingReconstructor {
            calls: AtomicUsize::new(0),
            unresolved: 1,
        };
        let matches = run(
            &db,
            &straight_line_query(),
            &SearchConfig::default(),
            None,
            Some(&reconstructor),
            &ProgressReporter::new(),
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn all_atom_fragments_carry_stored_backbone_atoms() {
        let mut records = straight_line_records("line", 'A', 1, 10);
        for record in records.iter_mut() {
            record.n = Some(record.ca + nalgebra::Vector3::new(-0.5, 0.0, 0.0));
            record.c = Some(record.ca + nalgebra::Vector3::new(0.5, 0.0, 0.0));
        }
        let db = database_from_records(records);
        let config = crate::engine::config::SearchConfigBuilder::new()
            .fragment_kind(FragmentKind::AllAtom)
            .build()
            .unwrap();
        let matches = run(
            &db,
            &straight_line_query(),
            &config,
            None,
            None,
            &ProgressReporter::new(),
        );
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].atoms.len(), 27);
        assert!(matches[0].atoms.iter().any(|a| a.name == "N"));
    }
}
