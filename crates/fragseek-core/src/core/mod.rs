//! # Core Module
//!
//! The stateless foundation of the crate: molecular data models, PDB I/O,
//! and the geometry utilities (RMSD, Kabsch rigid superposition) the
//! search engine is built on.

pub mod io;
pub mod models;
pub mod utils;
