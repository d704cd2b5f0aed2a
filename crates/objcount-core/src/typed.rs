//! Pixel-type specific operations
//!
//! The pipeline names its rasters after what they hold:
//!
//! - [`IntensityGrid`] - 8-bit single channel intensities (0-255)
//! - [`BinaryMask`] - foreground (`true`) / background (`false`)
//! - [`LabelMap`] - 0 for background, positive object labels
//! - [`FloatGrid`] - real valued intermediate fields such as distances

use crate::grid::Grid;
use std::collections::{BTreeMap, HashSet};

/// 8-bit single channel intensity image
pub type IntensityGrid = Grid<u8>;

/// Foreground/background classification of every pixel
pub type BinaryMask = Grid<bool>;

/// Per-pixel object labels, 0 is background
pub type LabelMap = Grid<u32>;

/// Real-valued field, e.g. a distance transform
pub type FloatGrid = Grid<f32>;

/// Euclidean distance to the nearest background pixel
pub type DistanceField = Grid<f32>;

/// Largest value an intensity pixel can hold
pub const MAX_INTENSITY: u8 = u8::MAX;

impl Grid<u8> {
    /// Convert to `[0, 1]` floating point by dividing by 255.
    ///
    /// Differences of normalized grids keep their sign, unlike 8-bit
    /// subtraction which would wrap or saturate.
    pub fn to_normalized(&self) -> FloatGrid {
        self.map(|v| v as f32 / MAX_INTENSITY as f32)
    }

    /// Mean intensity over all pixels
    pub fn mean(&self) -> f64 {
        let sum: u64 = self.data().iter().map(|&v| v as u64).sum();
        sum as f64 / self.len() as f64
    }
}

impl Grid<bool> {
    /// Number of foreground pixels
    pub fn count_foreground(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    /// True when no pixel is foreground
    pub fn is_all_background(&self) -> bool {
        !self.data().iter().any(|&v| v)
    }

    /// Swap foreground and background
    pub fn invert(&self) -> BinaryMask {
        self.map(|v| !v)
    }
}

impl Grid<u32> {
    /// Largest label present, 0 when the map is all background
    pub fn max_label(&self) -> u32 {
        self.data().iter().copied().max().unwrap_or(0)
    }

    /// Pixel count of every non-zero label present, in ascending label order.
    ///
    /// Only observed labels get an entry, so memory follows the number of
    /// regions rather than the largest label value.
    pub fn label_areas(&self) -> BTreeMap<u32, u32> {
        let mut areas = BTreeMap::new();
        for &label in self.data() {
            if label != 0 {
                *areas.entry(label).or_insert(0) += 1;
            }
        }
        areas
    }

    /// Distinct non-zero labels in order of first appearance (raster scan)
    pub fn labels_in_scan_order(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for &label in self.data() {
            if label != 0 && seen.insert(label) {
                order.push(label);
            }
        }
        order
    }

    /// Number of distinct non-zero labels
    pub fn count_labels(&self) -> usize {
        self.labels_in_scan_order().len()
    }

    /// Foreground mask of all labeled pixels
    pub fn to_mask(&self) -> BinaryMask {
        self.map(|label| label != 0)
    }
}

impl Grid<f32> {
    /// Minimum and maximum values, ignoring NaN
    pub fn min_max(&self) -> (f32, f32) {
        self.data()
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Maximum value, `None` if every pixel is NaN
    pub fn max_value(&self) -> Option<f32> {
        let (_, hi) = self.min_max();
        hi.is_finite().then_some(hi)
    }

    /// Negate every value
    pub fn negate(&self) -> FloatGrid {
        self.map(|v| -v)
    }
}
