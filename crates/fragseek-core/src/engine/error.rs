use thiserror::Error;

use super::query::StemSpecifier;
use crate::core::utils::superposition::SuperpositionError;

/// Errors raised by the fragment-search engine.
///
/// Every variant here is a precondition or configuration failure; a
/// candidate that merely fails a continuity, distance, or RMSD filter is
/// skipped silently (with a trace event), never reported as an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "Fragment database is too small ({size} residues, need at least 5); \
         did you forget to load it?"
    )]
    DatabaseTooSmall { size: usize },

    #[error("Wrong number of stem residues: expected {expected}, got {actual}")]
    StemCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("Stem residue {spec} not found in the query structure")]
    StemNotFound { spec: StemSpecifier },

    #[error("Residue {spec} is missing required atom '{atom}'")]
    MissingAtom {
        spec: StemSpecifier,
        atom: &'static str,
    },

    #[error("Query span endpoints are out of order: {start} .. {end}")]
    InvalidSpan {
        start: StemSpecifier,
        end: StemSpecifier,
    },

    #[error("Invalid sequence filter: {0}")]
    SequenceFilter(#[from] regex::Error),

    #[error("Superposition failed: {0}")]
    Superposition(#[from] SuperpositionError),
}
