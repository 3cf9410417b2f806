//! Spot search: three fixed stem residues anchoring a fragment of
//! variable internal length.

use super::contiguous_step;
use crate::core::utils::superposition::superpose;
use crate::engine::config::SearchConfig;
use crate::engine::database::FragmentDatabase;
use crate::engine::evaluator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::query::SpotQuery;
use crate::engine::results::PendingMatch;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

/// Coarse acceptance bound on the three-point stem RMSD, in Angstroms.
/// Candidates below it still face the full-atom backbone check at the
/// configured tolerance when a source directory is set.
const COARSE_STEM_RMSD_BOUND: f64 = 0.5;

#[instrument(skip_all, name = "spot_scan", fields(db_size = db.len(), max_gap = max_gap))]
pub(crate) fn run(
    db: &FragmentDatabase,
    query: &SpotQuery,
    max_gap: usize,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Vec<PendingMatch> {
    // Widest candidate: both inter-stem runs at max_gap plus the stems.
    let window = 2 * max_gap + 3;
    let Some(limit) = db.len().checked_sub(window) else {
        warn!(
            db_size = db.len(),
            window, "Database smaller than the widest candidate window"
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
            let found = evaluate_start(db, query, max_gap, config, start);
            reporter.report(Progress::ScanIncrement);
            found
        })
        .collect();

    reporter.report(Progress::ScanFinish);
    info!(
        candidates = limit,
        matches = matches.len(),
        "Spot scan complete"
    );
    matches
}

fn evaluate_start(
    db: &FragmentDatabase,
    query: &SpotQuery,
    max_gap: usize,
    config: &SearchConfig,
    start: usize,
) -> Option<PendingMatch> {
    let second = best_second(db, query, config.distance_tolerance_sq, max_gap, start)?;
    if second + max_gap >= db.len() {
        return None;
    }
    let third = best_third(
        db,
        query,
        config.distance_tolerance_sq,
        max_gap,
        start,
        second,
    )?;

    let stem_ca = [
        db.records()[start].ca,
        db.records()[second].ca,
        db.records()[third].ca,
    ];
    let sup = match superpose(&stem_ca, &query.stem_ca) {
        Ok(sup) => sup,
        Err(error) => {
            warn!(start, second, third, %error, "Stem superposition failed; dropping candidate");
            return None;
        }
    };
    if sup.rmsd > COARSE_STEM_RMSD_BOUND {
        return None;
    }

    let record_start = &db.records()[start];
    let record_third = &db.records()[third];
    let sequence = evaluator::sequence_of(db, start..=third);

    let (backbone_rmsd, atoms) = if config.source_dir.is_some() {
        let matched_trace: Vec<_> = db.records()[start..=third]
            .iter()
            .map(|r| sup.transform.apply(&r.ca))
            .collect();
        let stem_loci = [
            evaluator::locus(record_start),
            evaluator::locus(&db.records()[second]),
            evaluator::locus(record_third),
        ];
        let outcome = evaluator::fine_verify(
            config,
            &record_start.segment_id,
            record_start.chain_id,
            record_start.residue_number..=record_third.residue_number,
            &matched_trace,
            &stem_loci,
            &query.stem_backbone,
            Some(config.rmsd_tolerance),
        )?;
        (outcome.backbone_rmsd, outcome.atoms)
    } else {
        (
            None,
            evaluator::ca_fragment_atoms(db, start..=third, &sup.transform),
        )
    };

    debug!(start, second, third, rmsd = sup.rmsd, "Spot match accepted");
    Some(PendingMatch {
        segment_id: record_start.segment_id.clone(),
        start: evaluator::locus(record_start),
        end: evaluator::locus(record_third),
        sequence,
        rmsd: sup.rmsd,
        backbone_rmsd,
        atoms,
    })
}

/// Scans ahead of `start` for the index whose Cα distance to `start` best
/// matches the first inter-stem distance. A continuity failure ends the
/// scan but keeps candidates found before it.
fn best_second(
    db: &FragmentDatabase,
    query: &SpotQuery,
    tolerance_sq: f64,
    max_gap: usize,
    start: usize,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for offset in 1..=max_gap {
        let index = start + offset;
        if !contiguous_step(db, start, index, offset as isize) {
            break;
        }
        let diff = (db.distance_sq(start, index) - query.stem_distance_sq[0]).abs();
        if best.is_none_or(|(_, d)| diff < d) {
            best = Some((index, diff));
        }
    }
    match best {
        Some((index, diff)) if diff <= tolerance_sq => Some(index),
        _ => None,
    }
}

/// Scans ahead of `second` for the index minimizing the combined deviation
/// of both remaining inter-stem distances. The best candidate is rejected
/// only when it misses the tolerance on both distances at once.
fn best_third(
    db: &FragmentDatabase,
    query: &SpotQuery,
    tolerance_sq: f64,
    max_gap: usize,
    start: usize,
    second: usize,
) -> Option<usize> {
    let mut best: Option<(usize, f64, f64, f64)> = None;
    for offset in 1..=max_gap {
        let index = second + offset;
        if !contiguous_step(db, second, index, offset as isize) {
            break;
        }
        let d2 = db.distance_sq(start, index);
        let d3 = db.distance_sq(second, index);
        let combined =
            (d2 - query.stem_distance_sq[1]).abs() + (d3 - query.stem_distance_sq[2]).abs();
        if best.is_none_or(|(_, c, _, _)| combined < c) {
            best = Some((index, combined, d2, d3));
        }
    }

    let (index, _, d2, d3) = best?;
    if (d2 - query.stem_distance_sq[1]).abs() > tolerance_sq
        && (d3 - query.stem_distance_sq[2]).abs() > tolerance_sq
    {
        return None;
    }
    Some(index)
}
