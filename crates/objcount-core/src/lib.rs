//! objcount-core - Basic data structures for object quantification
//!
//! This crate provides the raster types shared by every stage of the
//! segmentation-and-measurement pipeline:
//!
//! - [`Grid`] - Generic row-major 2D container
//! - [`IntensityGrid`] / [`BinaryMask`] / [`LabelMap`] / [`FloatGrid`] -
//!   the pipeline's named rasters
//! - [`Color`] / [`RgbGrid`] - Overlay canvas
//!
//! # Example
//!
//! ```
//! use objcount_core::{BinaryMask, IntensityGrid};
//!
//! let grid = IntensityGrid::from_fn(8, 8, |x, _| if x < 4 { 50 } else { 200 }).unwrap();
//! let mask: BinaryMask = grid.map(|v| v > 140);
//! assert_eq!(mask.count_foreground(), 32);
//! ```

pub mod color;
pub mod error;
pub mod grid;
pub mod typed;

pub use color::{Color, RgbGrid};
pub use error::{Error, Result};
pub use grid::Grid;
pub use typed::{
    BinaryMask, DistanceField, FloatGrid, IntensityGrid, LabelMap, MAX_INTENSITY,
};
