//! The three fragment-search workflows.
//!
//! All three take the query structure, a loaded fragment database, and a
//! [`SearchConfig`]; they differ in how the query region is described.
//! Results are returned as a value, so concurrent searches over the same
//! database do not interfere.

use crate::core::models::system::MolecularSystem;
use crate::engine::config::SearchConfig;
use crate::engine::database::FragmentDatabase;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::query::{SpanQuery, SpotQuery, StemGroupQuery, StemSpecifier};
use crate::engine::reconstruct::BackboneReconstructor;
use crate::engine::results::SearchReport;
use crate::engine::scan;
use regex::Regex;
use tracing::{info, instrument};

fn check_database(db: &FragmentDatabase) -> Result<(), EngineError> {
    if db.len() < 5 {
        return Err(EngineError::DatabaseTooSmall { size: db.len() });
    }
    Ok(())
}

fn compile_sequence_filter(config: &SearchConfig) -> Result<Option<Regex>, EngineError> {
    config
        .sequence_filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(EngineError::from)
}

/// Spot search: finds fragments whose Cα geometry reproduces three fixed
/// stem residues of the query structure, with up to `max_gap` database
/// residues between consecutive stems.
///
/// # Errors
///
/// Fails when the database is too small, when a stem cannot be resolved
/// in `system`, or when a stem residue lacks a backbone atom.
#[instrument(skip_all, name = "spot_search", fields(stems = stems.len(), max_gap = max_gap))]
pub fn search_spot(
    system: &MolecularSystem,
    db: &FragmentDatabase,
    stems: &[StemSpecifier],
    max_gap: usize,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SearchReport, EngineError> {
    check_database(db)?;
    let query = SpotQuery::build(system, stems)?;
    let pending = scan::spot::run(db, &query, max_gap, config, reporter);
    let report = SearchReport::from_pending(pending);
    info!(matches = report.num_matches(), "Spot search finished");
    Ok(report)
}

/// Linear search: slides a window the width of the `start..=end` span of
/// the query structure across the database and keeps every window within
/// the RMSD tolerance, optionally filtered by sequence.
///
/// # Errors
///
/// Fails when the database is too small, when an endpoint cannot be
/// resolved, when the endpoints are reversed, when a residue in the span
/// lacks a Cα atom, or when the sequence filter is not a valid regular
/// expression.
#[instrument(skip_all, name = "linear_search")]
pub fn search_linear(
    system: &MolecularSystem,
    db: &FragmentDatabase,
    start: StemSpecifier,
    end: StemSpecifier,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SearchReport, EngineError> {
    check_database(db)?;
    let filter = compile_sequence_filter(config)?;
    let query = SpanQuery::build(system, start, end)?;
    let pending = scan::linear::run(db, &query, config, filter.as_ref(), reporter);
    let report = SearchReport::from_pending(pending);
    info!(matches = report.num_matches(), "Linear search finished");
    Ok(report)
}

/// Variable-gap search: finds windows whose terminal runs reproduce two
/// stem groups of the query structure with a fixed number of residues
/// between them. `residues_between` defaults to the numbering distance
/// between the inner stems.
///
/// For Cα-only databases without a source directory, `reconstructor`
/// supplies missing backbone atoms on matched fragments.
///
/// # Errors
///
/// Fails when the database is too small, when the stem list is odd or
/// empty, when a stem cannot be resolved or lacks a backbone atom, or
/// when the sequence filter is not a valid regular expression.
#[instrument(skip_all, name = "stems_search", fields(stems = stems.len()))]
pub fn search_between_stems(
    system: &MolecularSystem,
    db: &FragmentDatabase,
    stems: &[StemSpecifier],
    residues_between: Option<usize>,
    config: &SearchConfig,
    reconstructor: Option<&dyn BackboneReconstructor>,
    reporter: &ProgressReporter,
) -> Result<SearchReport, EngineError> {
    check_database(db)?;
    let filter = compile_sequence_filter(config)?;
    let query = StemGroupQuery::build(system, stems, residues_between)?;
    let pending = scan::stems::run(db, &query, config, filter.as_ref(), reconstructor, reporter);
    let report = SearchReport::from_pending(pending);
    info!(
        matches = report.num_matches(),
        "Variable-gap search finished"
    );
    Ok(report)
}
