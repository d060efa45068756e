//! Per-pixel entry points of the ReSTIR DI passes.
//!
//! Each pass exposes a `main` function that computes the output reservoir of
//! a single pixel; it's up to the caller to dispatch it over the whole
//! viewport and to store the results.

pub mod di_initial_candidates;
pub mod di_spatial_resampling;
pub mod di_temporal_resampling;
