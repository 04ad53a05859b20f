//! Test utilities for the doc-values crates.
//!
//! This crate provides:
//! - A segment writer emitting metadata and data streams in every supported layout
//! - Object store wrappers for observing and tampering with stored streams
//! - Seeded random data generation
//!
//! It is only meant for tests and never links into the read path.

pub mod data_gen;
pub mod segment_writer;
pub mod stores;
