//! Foreground segmentation
//!
//! Turns an intensity image into a binary foreground mask with one of the
//! three strategies of [`Segmentation`].

use crate::config::Segmentation;
use crate::error::{PipelineError, PipelineResult};
use objcount_core::{BinaryMask, IntensityGrid};
use objcount_filter::{EdgeOrientation, sobel_edge};

/// Produce the foreground mask of `grid`
///
/// `compare` is only read by [`Segmentation::Difference`], where the mask
/// marks pixels at which `grid` is brighter than `compare` by more than the
/// threshold on the normalized scale.
///
/// # Errors
///
/// [`PipelineError::MissingComparison`] when the difference strategy gets
/// no comparison image, [`PipelineError::DimensionMismatch`] when the two
/// images differ in size.
pub fn segment(
    segmentation: &Segmentation,
    grid: &IntensityGrid,
    compare: Option<&IntensityGrid>,
) -> PipelineResult<BinaryMask> {
    let mask = match *segmentation {
        Segmentation::Threshold { threshold } => grid.map(|v| v as f32 > threshold),
        Segmentation::Difference { threshold } => {
            let other = compare.ok_or(PipelineError::MissingComparison)?;
            if other.dimensions() != grid.dimensions() {
                return Err(PipelineError::DimensionMismatch {
                    expected: grid.dimensions(),
                    actual: other.dimensions(),
                });
            }
            let a = grid.to_normalized();
            let b = other.to_normalized();
            a.zip_map(&b, |x, y| x - y > threshold)
                .map_err(|_| PipelineError::DimensionMismatch {
                    expected: grid.dimensions(),
                    actual: other.dimensions(),
                })?
        }
        Segmentation::EdgeDetection { threshold } => {
            sobel_edge(grid, EdgeOrientation::All).map(|m| m > threshold)
        }
    };
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;

    fn ramp() -> IntensityGrid {
        IntensityGrid::from_fn(16, 4, |x, _| (x * 16) as u8).unwrap()
    }

    #[test]
    fn test_threshold_is_strict() {
        let grid = IntensityGrid::from_data(3, 1, vec![139, 140, 141]).unwrap();
        let mask = segment(&Segmentation::Threshold { threshold: 140.0 }, &grid, None).unwrap();
        assert_eq!(mask.data(), &[false, false, true]);
    }

    #[test]
    fn test_threshold_monotone() {
        let grid = ramp();
        let mut previous = segment(&Strategy::Threshold.with_threshold(0.0), &grid, None).unwrap();
        for t in [30.0, 90.0, 150.0, 240.0] {
            let mask = segment(&Strategy::Threshold.with_threshold(t), &grid, None).unwrap();
            // every foreground pixel at a higher threshold was foreground before
            assert!(mask.data().iter().zip(previous.data()).all(|(&now, &before)| !now || before));
            previous = mask;
        }
    }

    #[test]
    fn test_difference_is_signed() {
        let a = IntensityGrid::from_data(3, 1, vec![200, 50, 120]).unwrap();
        let b = IntensityGrid::from_data(3, 1, vec![50, 200, 100]).unwrap();
        let seg = Segmentation::Difference { threshold: 0.25 };
        let mask = segment(&seg, &a, Some(&b)).unwrap();
        // only the first pixel is brighter by more than a quarter
        assert_eq!(mask.data(), &[true, false, false]);
    }

    #[test]
    fn test_difference_negative_threshold() {
        let a = IntensityGrid::from_data(4, 1, vec![200, 50, 120, 90]).unwrap();
        let b = IntensityGrid::from_data(4, 1, vec![50, 200, 100, 100]).unwrap();
        let seg = Strategy::Difference.with_threshold(-0.1);
        let mask = segment(&seg, &a, Some(&b)).unwrap();
        // slightly darker pixels pass, much darker ones do not
        assert_eq!(mask.data(), &[true, false, true, true]);
    }

    #[test]
    fn test_difference_errors() {
        let a = IntensityGrid::new(3, 3).unwrap();
        let b = IntensityGrid::new(3, 4).unwrap();
        let seg = Segmentation::Difference { threshold: 0.25 };
        assert!(matches!(
            segment(&seg, &a, None),
            Err(PipelineError::MissingComparison)
        ));
        assert!(matches!(
            segment(&seg, &a, Some(&b)),
            Err(PipelineError::DimensionMismatch {
                expected: (3, 3),
                actual: (3, 4)
            })
        ));
    }

    #[test]
    fn test_edge_detection_outlines_block() {
        let grid = IntensityGrid::from_fn(12, 12, |x, y| {
            if (4..8).contains(&x) && (4..8).contains(&y) { 220 } else { 30 }
        })
        .unwrap();
        let mask = segment(&Segmentation::EdgeDetection { threshold: 0.1 }, &grid, None).unwrap();
        assert_eq!(mask.get_pixel(4, 5), Some(true));
        assert_eq!(mask.get_pixel(1, 1), Some(false));
        assert_eq!(mask.get_pixel(0, 5), Some(false));
    }
}
