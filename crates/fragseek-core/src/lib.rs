//! # FragSeek Core Library
//!
//! A library for structural-fragment search over protein backbones: given
//! a query region of a structure and a database of Cα traces, it finds
//! database fragments whose geometry reproduces the query within an RMSD
//! tolerance.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to
//! ensure a clear separation of concerns, making it modular, testable,
//! and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`MolecularSystem`), geometry utilities (superposition, RMSD), and
//!   I/O for PDB structures.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer holds the
//!   fragment database and implements the three scan modes with their
//!   two-phase filtering (cheap distance pruning before alignment).
//!
//! - **[`workflows`]: The Public API.** This is the highest-level,
//!   user-facing layer. It resolves query stems, drives the scans, and
//!   returns numbered, reproducible search reports.

pub mod core;
pub mod engine;
pub mod workflows;
