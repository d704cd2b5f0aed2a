//! Edge detection
//!
//! Gradient-magnitude edge maps used by the edge-detection segmentation
//! strategy.

use crate::convolve::{BorderMode, fgrid_convolve};
use crate::kernel::Kernel;
use objcount_core::{FloatGrid, IntensityGrid};

/// Edge detection orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOrientation {
    /// Detect horizontal edges
    Horizontal,
    /// Detect vertical edges
    Vertical,
    /// Detect all edges
    #[default]
    All,
}

/// Apply Sobel edge detection.
///
/// The intensity grid is first normalized to `[0, 1]`. With
/// [`EdgeOrientation::All`] the result is `sqrt(h^2 + v^2) / sqrt(2)`, which
/// keeps the magnitude within `[0, 1]`; a single orientation returns the
/// absolute response of that kernel. Pixels on the outermost ring are set
/// to 0 since their 3x3 neighborhood leaves the image.
pub fn sobel_edge(grid: &IntensityGrid, orientation: EdgeOrientation) -> FloatGrid {
    let normalized = grid.to_normalized();
    let mut out = match orientation {
        EdgeOrientation::Horizontal => {
            fgrid_convolve(&normalized, &Kernel::sobel_horizontal(), BorderMode::Reflect)
                .map(f32::abs)
        }
        EdgeOrientation::Vertical => {
            fgrid_convolve(&normalized, &Kernel::sobel_vertical(), BorderMode::Reflect)
                .map(f32::abs)
        }
        EdgeOrientation::All => {
            let h = fgrid_convolve(&normalized, &Kernel::sobel_horizontal(), BorderMode::Reflect);
            let v = fgrid_convolve(&normalized, &Kernel::sobel_vertical(), BorderMode::Reflect);
            let mut magnitude = h.create_template();
            for ((m, &a), &b) in magnitude.data_mut().iter_mut().zip(h.data()).zip(v.data()) {
                *m = (a * a + b * b).sqrt() / std::f32::consts::SQRT_2;
            }
            magnitude
        }
    };

    let (w, h) = out.dimensions();
    for y in 0..h {
        for x in 0..w {
            if out.is_border(x, y) {
                out.set_pixel_unchecked(x, y, 0.0);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_image_has_no_edges() {
        let grid = IntensityGrid::new_with_value(6, 6, 120).unwrap();
        let edges = sobel_edge(&grid, EdgeOrientation::All);
        assert!(edges.data().iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_vertical_step_edge() {
        // left half black, right half white
        let grid = IntensityGrid::from_fn(8, 8, |x, _| if x < 4 { 0 } else { 255 }).unwrap();
        let v = sobel_edge(&grid, EdgeOrientation::Vertical);
        let h = sobel_edge(&grid, EdgeOrientation::Horizontal);

        // the step sits between columns 3 and 4
        assert!((v.get_pixel(3, 4).unwrap() - 1.0).abs() < 1e-5);
        assert!((v.get_pixel(4, 4).unwrap() - 1.0).abs() < 1e-5);
        assert_eq!(v.get_pixel(1, 4), Some(0.0));
        assert!(h.data().iter().all(|&x| x.abs() < 1e-6));

        let all = sobel_edge(&grid, EdgeOrientation::All);
        let expected = 1.0 / std::f32::consts::SQRT_2;
        assert!((all.get_pixel(3, 4).unwrap() - expected).abs() < 1e-5);
        // border ring is cleared
        assert_eq!(all.get_pixel(3, 0), Some(0.0));
    }
}
