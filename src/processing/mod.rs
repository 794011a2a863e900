//! Processing module: running processors around analysis.
//!
//! This module provides:
//! - BOM reconstruction so processors see files exactly as stored
//! - Preprocessing, which splits a file into derived virtual files
//! - Postprocessing, which merges per-block diagnostics

pub mod bom;
pub mod postprocess;
pub mod preprocess;

pub use bom::with_bom;
pub use postprocess::{postprocess, PostprocessOutput};
pub use preprocess::{normalize_error_message, preprocess, PreprocessOutcome};
