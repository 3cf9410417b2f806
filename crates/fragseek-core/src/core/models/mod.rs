//! # Core Models Module
//!
//! Fundamental data structures for representing molecular structures:
//! atoms, residues, chains, and the owning [`system::MolecularSystem`].
//!
//! The models carry identities, adjacency metadata, and coordinates;
//! everything else lives with the search engine. All storage is
//! keyed by `slotmap` IDs so that the rest of the crate can pass
//! lightweight handles instead of aliased references.

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
