//! objcount-filter - Image filtering operations
//!
//! This crate provides the filters the segmentation pipeline needs:
//!
//! - Convolution of floating-point grids with arbitrary kernels
//! - Gaussian smoothing (distance-field smoothing before marker detection)
//! - Sobel edge detection (edge-detection segmentation strategy)

pub mod convolve;
pub mod edge;
mod error;
pub mod kernel;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

// Re-export commonly used functions
pub use convolve::{BorderMode, fgrid_convolve, fgrid_convolve_sep, gaussian_blur};
pub use edge::{EdgeOrientation, sobel_edge};
