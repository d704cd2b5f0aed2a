//! Watershed segmentation
//!
//! Splits touching objects in a binary mask. The distance transform of the
//! mask is smoothed, its local maxima become markers, and the markers are
//! grown over the negated field by a priority flood confined to the mask.
//!
//! # Algorithm
//!
//! 1. Exact Euclidean distance transform of the mask
//! 2. Gaussian smoothing of the distance field (skipped when sigma is 0)
//! 3. Local maxima inside the mask, 8-connected plateaus labeled into markers
//! 4. Priority flood from the markers over `-smoothed`
//!
//! A mask that yields no markers is labeled by plain connected components
//! instead, and [`SplitOutcome::degenerate`] is set. After flooding, a basin
//! whose pixels fall apart under the flood connectivity is split so every
//! output label is connected.

use crate::conncomp::{ConnectivityType, label_connected_components, split_disconnected_labels};
use crate::distance::euclidean_distance_transform;
use crate::maxima::find_local_maxima;
use crate::{RegionError, RegionResult};
use objcount_core::{BinaryMask, FloatGrid, LabelMap};
use objcount_filter::gaussian_blur;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Default standard deviation for distance-field smoothing
pub const DEFAULT_SMOOTHING_SIGMA: f32 = 4.0;

/// Options for watershed splitting
#[derive(Debug, Clone)]
pub struct WatershedOptions {
    /// Gaussian sigma applied to the distance field; 0 disables smoothing
    pub sigma: f32,
    /// Connectivity used for flooding and for the no-marker fallback
    pub connectivity: ConnectivityType,
}

impl Default for WatershedOptions {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SMOOTHING_SIGMA,
            connectivity: ConnectivityType::FourWay,
        }
    }
}

impl WatershedOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the smoothing sigma
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the connectivity
    pub fn with_connectivity(mut self, connectivity: ConnectivityType) -> Self {
        self.connectivity = connectivity;
        self
    }

    fn validate(&self) -> RegionResult<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(RegionError::InvalidParameters(format!(
                "smoothing sigma must be non-negative and finite, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Result of splitting a mask
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Label map; its foreground equals the input mask
    pub labels: LabelMap,
    /// Number of markers the flood started from
    pub marker_count: u32,
    /// True when no marker was found and plain labeling was used
    pub degenerate: bool,
}

/// Split touching objects in `mask`
///
/// Every foreground pixel of the mask receives a positive label and every
/// background pixel stays 0.
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] for a negative or
/// non-finite sigma.
pub fn split_touching(mask: &BinaryMask, options: &WatershedOptions) -> RegionResult<SplitOutcome> {
    options.validate()?;

    let distance = euclidean_distance_transform(mask);
    let smoothed = gaussian_blur(&distance, options.sigma)?;
    let peaks = find_local_maxima(&smoothed, mask)?;
    let markers = label_connected_components(&peaks, ConnectivityType::EightWay);
    let marker_count = markers.max_label();

    if marker_count == 0 {
        return Ok(SplitOutcome {
            labels: label_connected_components(mask, options.connectivity),
            marker_count,
            degenerate: true,
        });
    }

    let mut labels =
        watershed_from_markers(&smoothed.negate(), &markers, mask, options.connectivity)?;
    label_unreached(&mut labels, mask, options.connectivity)?;
    Ok(SplitOutcome {
        labels: split_disconnected_labels(&labels, options.connectivity),
        marker_count,
        degenerate: false,
    })
}

/// Give fresh labels to mask components the flood could not enter.
///
/// A component whose peak has a higher diagonal neighbor in another
/// component carries no marker of its own under 4-connected flooding.
fn label_unreached(
    labels: &mut LabelMap,
    mask: &BinaryMask,
    connectivity: ConnectivityType,
) -> RegionResult<()> {
    let leftover = labels.zip_map(mask, |label, inside| inside && label == 0)?;
    if leftover.is_all_background() {
        return Ok(());
    }
    let offset = labels.max_label();
    let extra = label_connected_components(&leftover, connectivity);
    for (out, &label) in labels.data_mut().iter_mut().zip(extra.data()) {
        if label != 0 {
            *out = offset + label;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct FloodEntry {
    value: f32,
    label: u32,
    seq: u64,
    index: usize,
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.label.cmp(&other.label))
            .then(self.seq.cmp(&other.seq))
    }
}

/// Grow marker labels over `surface`, lowest values first
///
/// Pixels outside `mask` are never labeled. Ties in surface value go to
/// the smaller marker label, then to the earlier queued pixel, so the
/// result is deterministic. Marker pixels outside the mask are ignored.
///
/// # Errors
///
/// Returns an error if the three grids differ in size.
pub fn watershed_from_markers(
    surface: &FloatGrid,
    markers: &LabelMap,
    mask: &BinaryMask,
    connectivity: ConnectivityType,
) -> RegionResult<LabelMap> {
    surface.check_same_size(markers)?;
    surface.check_same_size(mask)?;

    let (width, height) = surface.dimensions();
    let mut labels = markers.zip_map(mask, |label, inside| if inside { label } else { 0 })?;
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    for (x, y, label) in labels.iter_pixels() {
        if label != 0 {
            let index = labels.index(x, y);
            heap.push(Reverse(FloodEntry {
                value: surface.data()[index],
                label,
                seq,
                index,
            }));
            seq += 1;
        }
    }

    while let Some(Reverse(entry)) = heap.pop() {
        let x = (entry.index % width as usize) as u32;
        let y = (entry.index / width as usize) as u32;
        for (nx, ny) in connectivity.neighbors(x, y, width, height) {
            if !mask.get_pixel_unchecked(nx, ny) || labels.get_pixel_unchecked(nx, ny) != 0 {
                continue;
            }
            labels.set_pixel_unchecked(nx, ny, entry.label);
            let index = labels.index(nx, ny);
            heap.push(Reverse(FloodEntry {
                value: surface.data()[index],
                label: entry.label,
                seq,
                index,
            }));
            seq += 1;
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flood_fills_mask_from_two_markers() {
        // valley at x = 3 separates the two basins
        let surface = FloatGrid::from_fn(7, 1, |x, _| -((x as f32 - 3.0).abs())).unwrap();
        let mask = BinaryMask::new_with_value(7, 1, true).unwrap();
        let markers = LabelMap::from_data(7, 1, vec![1, 0, 0, 0, 0, 0, 2]).unwrap();
        let labels =
            watershed_from_markers(&surface, &markers, &mask, ConnectivityType::FourWay).unwrap();
        assert_eq!(labels.data(), &[1, 1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_flood_stays_inside_mask() {
        let surface = FloatGrid::new(5, 1).unwrap();
        let mask = BinaryMask::from_data(5, 1, vec![true, true, false, true, true]).unwrap();
        let markers = LabelMap::from_data(5, 1, vec![1, 0, 0, 0, 0]).unwrap();
        let labels =
            watershed_from_markers(&surface, &markers, &mask, ConnectivityType::FourWay).unwrap();
        assert_eq!(labels.data(), &[1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_single_blob_gives_single_region() {
        let mask = BinaryMask::from_fn(19, 19, |x, y| (4..15).contains(&x) && (5..14).contains(&y))
            .unwrap();
        let outcome = split_touching(&mask, &WatershedOptions::new().with_sigma(1.0)).unwrap();
        assert!(!outcome.degenerate);
        assert_eq!(outcome.labels.count_labels(), 1);
        assert_eq!(outcome.labels.to_mask(), mask);
    }

    #[test]
    fn test_empty_mask_is_degenerate() {
        let mask = BinaryMask::new(10, 10).unwrap();
        let outcome = split_touching(&mask, &WatershedOptions::default()).unwrap();
        assert!(outcome.degenerate);
        assert_eq!(outcome.marker_count, 0);
        assert_eq!(outcome.labels.max_label(), 0);
    }

    #[test]
    fn test_all_foreground_is_one_region() {
        let mask = BinaryMask::new_with_value(8, 6, true).unwrap();
        let outcome = split_touching(&mask, &WatershedOptions::default()).unwrap();
        assert_eq!(outcome.labels.count_labels(), 1);
        assert_eq!(outcome.labels.label_areas()[&1], 48);
    }

    #[test]
    fn test_rejects_negative_sigma() {
        let mask = BinaryMask::new(4, 4).unwrap();
        let options = WatershedOptions::new().with_sigma(-1.0);
        assert!(matches!(
            split_touching(&mask, &options),
            Err(RegionError::InvalidParameters(_))
        ));
    }
}
