//! Region measurement
//!
//! Per-label statistics over a label map and its intensity image: pixel
//! count, mean intensity, centroid, weighted boundary length and the major
//! axis of the equivalent ellipse.
//!
//! # Perimeter
//!
//! The boundary of a region is the region minus its 4-neighbour erosion.
//! Each boundary pixel is coded by correlating the boundary image with
//!
//! ```text
//! 10  2 10
//!  2  1  2
//! 10  2 10
//! ```
//!
//! and the code selects a length contribution: straight runs count 1,
//! diagonal steps count sqrt(2), and corners between the two count
//! (1 + sqrt(2)) / 2.

use crate::{RegionError, RegionResult};
use objcount_core::{BinaryMask, IntensityGrid, LabelMap};
use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;

/// Measurements of one labeled region
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Label value in the label map
    pub label: u32,
    /// Pixel count
    pub area: u32,
    /// Mean intensity over the region's pixels
    pub mean_intensity: f64,
    /// Centroid as (row, column)
    pub centroid: (f64, f64),
    /// Weighted boundary length
    pub perimeter: f64,
    /// Major axis length of the ellipse with the same second moments
    pub major_axis_length: f64,
}

impl Region {
    /// Centroid row (Y)
    pub fn row(&self) -> f64 {
        self.centroid.0
    }

    /// Centroid column (X)
    pub fn col(&self) -> f64 {
        self.centroid.1
    }
}

/// Inclusive pixel bounds of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

#[derive(Debug, Clone)]
struct Accumulator {
    count: u64,
    intensity: u64,
    sum_r: f64,
    sum_c: f64,
    sum_rr: f64,
    sum_cc: f64,
    sum_rc: f64,
    bounds: Bounds,
}

impl Accumulator {
    fn new(x: u32, y: u32) -> Self {
        Self {
            count: 0,
            intensity: 0,
            sum_r: 0.0,
            sum_c: 0.0,
            sum_rr: 0.0,
            sum_cc: 0.0,
            sum_rc: 0.0,
            bounds: Bounds {
                x0: x,
                y0: y,
                x1: x,
                y1: y,
            },
        }
    }

    fn add(&mut self, x: u32, y: u32, value: u8) {
        let r = y as f64;
        let c = x as f64;
        self.count += 1;
        self.intensity += value as u64;
        self.sum_r += r;
        self.sum_c += c;
        self.sum_rr += r * r;
        self.sum_cc += c * c;
        self.sum_rc += r * c;
        self.bounds.x0 = self.bounds.x0.min(x);
        self.bounds.y0 = self.bounds.y0.min(y);
        self.bounds.x1 = self.bounds.x1.max(x);
        self.bounds.y1 = self.bounds.y1.max(y);
    }

    fn centroid(&self) -> (f64, f64) {
        let n = self.count as f64;
        (self.sum_r / n, self.sum_c / n)
    }

    /// Larger eigenvalue of the normalized central moment matrix
    fn major_eigenvalue(&self) -> f64 {
        let n = self.count as f64;
        let (mr, mc) = self.centroid();
        let a = (self.sum_rr / n - mr * mr).max(0.0);
        let c = (self.sum_cc / n - mc * mc).max(0.0);
        let b = self.sum_rc / n - mr * mc;
        (a + c) / 2.0 + (4.0 * b * b + (a - c) * (a - c)).sqrt() / 2.0
    }
}

/// Measure every labeled region
///
/// Returns one [`Region`] per label present in `labels`, in ascending label
/// order.
///
/// # Errors
///
/// Returns an error if `labels` and `intensity` differ in size.
pub fn measure_regions(labels: &LabelMap, intensity: &IntensityGrid) -> RegionResult<Vec<Region>> {
    labels.check_same_size(intensity)?;

    let mut accumulators: BTreeMap<u32, Accumulator> = BTreeMap::new();
    for (x, y, label) in labels.iter_pixels() {
        if label == 0 {
            continue;
        }
        accumulators
            .entry(label)
            .or_insert_with(|| Accumulator::new(x, y))
            .add(x, y, intensity.get_pixel_unchecked(x, y));
    }

    let mut regions = Vec::with_capacity(accumulators.len());
    for (label, acc) in accumulators {
        regions.push(Region {
            label,
            area: acc.count as u32,
            mean_intensity: acc.intensity as f64 / acc.count as f64,
            centroid: acc.centroid(),
            perimeter: region_perimeter(labels, label, acc.bounds)?,
            major_axis_length: 4.0 * acc.major_eigenvalue().sqrt(),
        });
    }
    Ok(regions)
}

/// Weighted boundary length of one region
fn region_perimeter(labels: &LabelMap, label: u32, bounds: Bounds) -> RegionResult<f64> {
    // one pixel of padding on each side keeps the outside as background
    let width = bounds.x1 - bounds.x0 + 3;
    let height = bounds.y1 - bounds.y0 + 3;
    let inside = BinaryMask::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            return false;
        }
        labels.get_pixel_unchecked(bounds.x0 + x - 1, bounds.y0 + y - 1) == label
    })?;
    Ok(mask_perimeter(&inside))
}

/// Weighted boundary length of the foreground of `mask`
///
/// Pixels beyond the grid edge count as background.
pub fn mask_perimeter(mask: &BinaryMask) -> f64 {
    let (width, height) = mask.dimensions();
    let at = |x: i64, y: i64| -> bool {
        x >= 0
            && y >= 0
            && x < width as i64
            && y < height as i64
            && mask.get_pixel_unchecked(x as u32, y as u32)
    };

    let mut boundary = mask.create_template();
    for (x, y, fg) in mask.iter_pixels() {
        if !fg {
            continue;
        }
        let (xi, yi) = (x as i64, y as i64);
        let interior = at(xi - 1, yi) && at(xi + 1, yi) && at(xi, yi - 1) && at(xi, yi + 1);
        if !interior {
            boundary.set_pixel_unchecked(x, y, true);
        }
    }

    let on_boundary = |x: i64, y: i64| -> bool {
        x >= 0
            && y >= 0
            && x < width as i64
            && y < height as i64
            && boundary.get_pixel_unchecked(x as u32, y as u32)
    };

    let mut total = 0.0;
    for (x, y, is_boundary) in boundary.iter_pixels() {
        if !is_boundary {
            continue;
        }
        let (xi, yi) = (x as i64, y as i64);
        let mut code = 1u32;
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            if on_boundary(xi + dx, yi + dy) {
                code += 2;
            }
        }
        for (dx, dy) in [(-1, -1), (1, -1), (-1, 1), (1, 1)] {
            if on_boundary(xi + dx, yi + dy) {
                code += 10;
            }
        }
        total += code_weight(code);
    }
    total
}

fn code_weight(code: u32) -> f64 {
    match code {
        5 | 7 | 15 | 17 | 25 | 27 => 1.0,
        21 | 33 => SQRT_2,
        13 | 23 => (1.0 + SQRT_2) / 2.0,
        _ => 0.0,
    }
}

/// Measure a single label, `None` if it has no pixels
pub fn measure_label(
    labels: &LabelMap,
    intensity: &IntensityGrid,
    label: u32,
) -> RegionResult<Option<Region>> {
    if label == 0 {
        return Err(RegionError::InvalidParameters(
            "label 0 is background and has no region".to_string(),
        ));
    }
    Ok(measure_regions(labels, intensity)?
        .into_iter()
        .find(|r| r.label == label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: u32, at: u32, side: u32) -> LabelMap {
        LabelMap::from_fn(size, size, |x, y| {
            ((at..at + side).contains(&x) && (at..at + side).contains(&y)) as u32
        })
        .unwrap()
    }

    #[test]
    fn test_square_measurements() {
        let labels = square(7, 2, 3);
        let intensity = IntensityGrid::new_with_value(7, 7, 200).unwrap();
        let regions = measure_regions(&labels, &intensity).unwrap();
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert_eq!(r.label, 1);
        assert_eq!(r.area, 9);
        assert!((r.mean_intensity - 200.0).abs() < 1e-12);
        assert_eq!(r.centroid, (3.0, 3.0));
        assert!((r.perimeter - 8.0).abs() < 1e-12);
        let expected_axis = 4.0 * (2.0f64 / 3.0).sqrt();
        assert!((r.major_axis_length - expected_axis).abs() < 1e-9);
    }

    #[test]
    fn test_single_pixel() {
        let labels = square(3, 1, 1);
        let intensity = IntensityGrid::new_with_value(3, 3, 17).unwrap();
        let regions = measure_regions(&labels, &intensity).unwrap();
        assert_eq!(regions[0].area, 1);
        assert_eq!(regions[0].perimeter, 0.0);
        assert_eq!(regions[0].major_axis_length, 0.0);
    }

    #[test]
    fn test_horizontal_bar_axis() {
        // 1 x 5 bar: column variance 2, row variance 0
        let labels = LabelMap::from_fn(7, 3, |x, y| (y == 1 && (1..6).contains(&x)) as u32).unwrap();
        let intensity = IntensityGrid::new(7, 3).unwrap();
        let r = &measure_regions(&labels, &intensity).unwrap()[0];
        assert!((r.major_axis_length - 4.0 * 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(r.centroid, (1.0, 3.0));
        // end pixels have code 3 and contribute nothing
        assert!((r.perimeter - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_regions_sorted_and_gaps_skipped() {
        let labels = LabelMap::from_data(4, 1, vec![5, 0, 2, 2]).unwrap();
        let intensity = IntensityGrid::from_data(4, 1, vec![10, 0, 20, 40]).unwrap();
        let regions = measure_regions(&labels, &intensity).unwrap();
        let ids: Vec<u32> = regions.iter().map(|r| r.label).collect();
        assert_eq!(ids, vec![2, 5]);
        assert!((regions[0].mean_intensity - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_huge_label() {
        let labels = LabelMap::from_data(3, 1, vec![u32::MAX, 0, 7]).unwrap();
        let intensity = IntensityGrid::from_data(3, 1, vec![90, 0, 30]).unwrap();
        let regions = measure_regions(&labels, &intensity).unwrap();
        let ids: Vec<u32> = regions.iter().map(|r| r.label).collect();
        assert_eq!(ids, vec![7, u32::MAX]);
        assert_eq!(regions[1].area, 1);
        assert!((regions[1].mean_intensity - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_size_mismatch() {
        let labels = LabelMap::new(3, 3).unwrap();
        let intensity = IntensityGrid::new(4, 3).unwrap();
        assert!(measure_regions(&labels, &intensity).is_err());
    }

    #[test]
    fn test_measure_label() {
        let labels = square(7, 2, 3);
        let intensity = IntensityGrid::new(7, 7).unwrap();
        assert_eq!(measure_label(&labels, &intensity, 1).unwrap().unwrap().area, 9);
        assert!(measure_label(&labels, &intensity, 2).unwrap().is_none());
        assert!(measure_label(&labels, &intensity, 0).is_err());
    }
}
