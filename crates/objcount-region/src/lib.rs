//! objcount-region - Region processing for objcount
//!
//! This crate provides the region stages of the pipeline:
//!
//! - **Connected component analysis** - Labeling 4- or 8-connected regions
//! - **Seed fill operations** - Flood fill and hole filling
//! - **Distance transform** - Exact Euclidean distance to background
//! - **Watershed segmentation** - Splitting touching objects from distance peaks
//! - **Relabeling** - Size filtering and label compaction
//! - **Measurement** - Per-region area, intensity, centroid, perimeter, axis
//!
//! # Examples
//!
//! ## Labeling and measuring
//!
//! ```
//! use objcount_core::{BinaryMask, IntensityGrid};
//! use objcount_region::{ConnectivityType, label_connected_components, measure_regions};
//!
//! let mask = BinaryMask::from_fn(10, 10, |x, y| x < 3 && y < 3 || x > 6 && y > 6).unwrap();
//! let labels = label_connected_components(&mask, ConnectivityType::FourWay);
//! assert_eq!(labels.max_label(), 2);
//!
//! let intensity = IntensityGrid::new_with_value(10, 10, 200).unwrap();
//! let regions = measure_regions(&labels, &intensity).unwrap();
//! assert_eq!(regions[0].area, 9);
//! ```
//!
//! ## Hole filling
//!
//! ```
//! use objcount_core::BinaryMask;
//! use objcount_region::fill_holes;
//!
//! let ring = BinaryMask::from_fn(5, 5, |x, y| x == 0 || y == 0 || x == 4 || y == 4).unwrap();
//! assert_eq!(fill_holes(&ring).count_foreground(), 25);
//! ```
//!
//! ## Watershed splitting
//!
//! ```
//! use objcount_core::BinaryMask;
//! use objcount_region::{WatershedOptions, split_touching};
//!
//! let mask = BinaryMask::from_fn(12, 12, |x, y| (2..10).contains(&x) && (2..10).contains(&y)).unwrap();
//! let outcome = split_touching(&mask, &WatershedOptions::new().with_sigma(1.0)).unwrap();
//! assert_eq!(outcome.labels.to_mask(), mask);
//! ```

pub mod boundary;
pub mod conncomp;
pub mod distance;
mod error;
pub mod maxima;
pub mod measure;
pub mod relabel;
pub mod seedfill;
pub mod watershed;

pub use error::{RegionError, RegionResult};

// Re-export commonly used types and functions
pub use boundary::find_boundaries;
pub use conncomp::{
    ConnectivityType, count_components, label_connected_components, split_disconnected_labels,
};
pub use distance::euclidean_distance_transform;
pub use maxima::find_local_maxima;
pub use measure::{Region, mask_perimeter, measure_label, measure_regions};
pub use relabel::{SizeFilterOutcome, compact_labels, filter_by_size};
pub use seedfill::{border_pixels, fill_holes, floodfill};
pub use watershed::{
    DEFAULT_SMOOTHING_SIGMA, SplitOutcome, WatershedOptions, split_touching, watershed_from_markers,
};
