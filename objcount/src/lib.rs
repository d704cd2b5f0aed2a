//! objcount - Count and measure objects in photographs
//!
//! Segments an intensity image into foreground, fills holes, optionally
//! splits touching objects with a distance-transform watershed, drops
//! objects outside a size range and measures the rest.
//!
//! # Overview
//!
//! - [`segment`] - threshold, difference and edge segmentation
//! - [`analyze`] - the per-image pipeline, a pure function of its inputs
//! - [`export`] - results tables and annotated overlays
//! - [`batch`] - directory processing on a rayon pool
//!
//! # Example
//!
//! ```
//! use objcount::{IntensityGrid, PipelineConfig, SplitMode, analyze};
//!
//! let grid = IntensityGrid::from_fn(10, 10, |x, y| {
//!     if (1..4).contains(&x) && (1..4).contains(&y) { 200 } else { 50 }
//! })
//! .unwrap();
//! let config = PipelineConfig::new()
//!     .with_split(SplitMode::NoSplit)
//!     .with_size_range(1, 100);
//! let analysis = analyze(&config, &grid, None).unwrap();
//! assert_eq!(analysis.regions.len(), 1);
//! assert_eq!(analysis.regions[0].area, 9);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use objcount_core::*;

// Re-export stage crates as modules to avoid name conflicts
pub use objcount_filter as filter;
pub use objcount_io as io;
pub use objcount_region as region;

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod segment;

pub use batch::{BatchOptions, BatchReport, ImageJob, ImageReport, collect_jobs, run_batch};
pub use config::{Delimiter, PipelineConfig, RawConfig, Segmentation, SplitMode, Strategy};
pub use error::{
    ConfigError, ConfigResult, ExportError, ExportResult, PipelineError, PipelineResult,
};
pub use export::{ExportedFiles, export_results, format_table, render_overlay, write_table};
pub use pipeline::{Diagnostic, ImageAnalysis, analyze};
pub use segment::segment;
