//! Linear search: a fixed-width window slid across the database and
//! aligned against a Cα span of the query structure.

use crate::core::utils::superposition::superpose;
use crate::engine::config::SearchConfig;
use crate::engine::database::FragmentDatabase;
use crate::engine::evaluator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::query::SpanQuery;
use crate::engine::results::PendingMatch;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

#[instrument(skip_all, name = "linear_scan", fields(db_size = db.len(), span = query.ca_trace.len()))]
pub(crate) fn run(
    db: &FragmentDatabase,
    query: &SpanQuery,
    config: &SearchConfig,
    sequence_filter: Option<&Regex>,
    reporter: &ProgressReporter,
) -> Vec<PendingMatch> {
    let separation = query.separation();
    let Some(limit) = db.len().checked_sub(separation) else {
        warn!(
            db_size = db.len(),
            window = separation + 1,
            "Database smaller than the query span"
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
            let found = evaluate_start(db, query, config, sequence_filter, start);
            reporter.report(Progress::ScanIncrement);
            found
        })
        .collect();

    reporter.report(Progress::ScanFinish);
    info!(
        candidates = limit,
        matches = matches.len(),
        "Linear scan complete"
    );
    matches
}

fn evaluate_start(
    db: &FragmentDatabase,
    query: &SpanQuery,
    config: &SearchConfig,
    sequence_filter: Option<&Regex>,
    start: usize,
) -> Option<PendingMatch> {
    let end = start + query.separation();
    // Window endpoints must come from one structure and chain.
    if !db.same_segment(start, end) || !db.same_chain(start, end) {
        return None;
    }

    let window_ca: Vec<_> = db.records()[start..=end].iter().map(|r| r.ca).collect();
    let sup = match superpose(&window_ca, &query.ca_trace) {
        Ok(sup) => sup,
        Err(error) => {
            warn!(start, end, %error, "Window superposition failed; dropping candidate");
            return None;
        }
    };
    if sup.rmsd > config.rmsd_tolerance {
        return None;
    }

    let sequence = evaluator::sequence_of(db, start..=end);
    if let Some(filter) = sequence_filter {
        if !filter.is_match(&sequence) {
            debug!(start, %sequence, "Sequence filter rejected window");
            return None;
        }
    }

    let record_start = &db.records()[start];
    let record_end = &db.records()[end];

    let (backbone_rmsd, atoms) = if config.source_dir.is_some() {
        let matched_trace: Vec<_> = db.records()[start..=end]
            .iter()
            .map(|r| sup.transform.apply(&r.ca))
            .collect();
        let outcome = evaluator::fine_verify(
            config,
            &record_start.segment_id,
            record_start.chain_id,
            record_start.residue_number..=record_end.residue_number,
            &matched_trace,
            &[],
            &[],
            None,
        )?;
        (outcome.backbone_rmsd, outcome.atoms)
    } else {
        (
            None,
            evaluator::ca_fragment_atoms(db, start..=end, &sup.transform),
        )
    };

    debug!(start, end, rmsd = sup.rmsd, "Linear match accepted");
    Some(PendingMatch {
        segment_id: record_start.segment_id.clone(),
        start: evaluator::locus(record_start),
        end: evaluator::locus(record_end),
        sequence,
        rmsd: sup.rmsd,
        backbone_rmsd,
        atoms,
    })
}
