//! # Workflows Module
//!
//! This module provides the high-level entry points of the library. Each
//! workflow validates its inputs, builds the query from the query
//! structure, drives the corresponding database scan, and returns a
//! finished [`SearchReport`](crate::engine::results::SearchReport).

pub mod search;
