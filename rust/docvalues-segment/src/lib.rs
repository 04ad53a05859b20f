//! Per-segment doc-values read path: opens the metadata and data streams of one
//! segment and serves numeric, binary, sorted and sorted-set columns on demand.

pub mod read;

#[cfg(test)]
mod tests;
