//! # Engine Module
//!
//! This module implements the fragment-search engine: the stateful logic
//! that turns a residue database and a query structure into a set of
//! aligned fragment matches.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Configuration** ([`config`]) - Search tolerances, sequence filters, and output options
//! - **Database** ([`database`]) - The flattened residue-record store scanned by every mode
//! - **Queries** ([`query`]) - Stem resolution and per-mode query construction
//! - **Results** ([`results`]) - Accepted matches and the report returned to callers
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback mechanisms
//! - **Reconstruction** ([`reconstruct`]) - The seam for external backbone reconstruction
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation

pub mod config;
pub mod database;
pub mod error;
pub(crate) mod evaluator;
pub mod progress;
pub mod query;
pub mod reconstruct;
pub mod results;
pub(crate) mod scan;
