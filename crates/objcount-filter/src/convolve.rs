//! Convolution operations
//!
//! Implements convolution of floating-point grids with arbitrary kernels
//! and the Gaussian smoothing built on it.

use crate::{FilterError, FilterResult, Kernel};
use objcount_core::FloatGrid;

/// How samples outside the grid are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Mirror about the edge, repeating the edge sample (`c b a | a b c`)
    #[default]
    Reflect,
    /// Replicate the nearest edge sample (`a a a | a b c`)
    Replicate,
}

impl BorderMode {
    /// Map a possibly out-of-range coordinate into `0..n`
    #[inline]
    pub fn resolve(self, i: i64, n: i64) -> i64 {
        match self {
            BorderMode::Replicate => i.clamp(0, n - 1),
            BorderMode::Reflect => {
                let period = 2 * n;
                let m = i.rem_euclid(period);
                if m < n { m } else { period - 1 - m }
            }
        }
    }
}

/// Convolve a floating-point grid with a kernel
///
/// Each output pixel is the weighted sum of the kernel applied to the
/// neighborhood centered on it; the kernel is not flipped.
pub fn fgrid_convolve(grid: &FloatGrid, kernel: &Kernel, border: BorderMode) -> FloatGrid {
    let w = grid.width() as i64;
    let h = grid.height() as i64;
    let kw = kernel.width() as i64;
    let kh = kernel.height() as i64;
    let cx = kernel.center_x() as i64;
    let cy = kernel.center_y() as i64;
    let kdata = kernel.data();

    let mut out = grid.create_template();
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for ky in 0..kh {
                let sy = border.resolve(y + ky - cy, h);
                for kx in 0..kw {
                    let k = kdata[(ky * kw + kx) as usize];
                    if k == 0.0 {
                        continue;
                    }
                    let sx = border.resolve(x + kx - cx, w);
                    sum += grid.get_pixel_unchecked(sx as u32, sy as u32) * k;
                }
            }
            out.set_pixel_unchecked(x as u32, y as u32, sum);
        }
    }
    out
}

/// Convolve with a horizontal kernel, then with a vertical kernel
pub fn fgrid_convolve_sep(
    grid: &FloatGrid,
    kernel_x: &Kernel,
    kernel_y: &Kernel,
    border: BorderMode,
) -> FloatGrid {
    let tmp = fgrid_convolve(grid, kernel_x, border);
    fgrid_convolve(&tmp, kernel_y, border)
}

/// Apply Gaussian blur with standard deviation `sigma`
///
/// Uses a separable kernel truncated at four standard deviations and
/// reflect border handling. A `sigma` of exactly 0 returns a copy.
///
/// # Errors
///
/// Returns [`FilterError::InvalidParameters`] for negative or non-finite
/// `sigma`.
pub fn gaussian_blur(grid: &FloatGrid, sigma: f32) -> FilterResult<FloatGrid> {
    if sigma == 0.0 {
        return Ok(grid.clone());
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FilterError::InvalidParameters(format!(
            "gaussian sigma must be non-negative and finite, got {sigma}"
        )));
    }
    let kx = Kernel::gaussian_1d(sigma)?;
    let ky = kx.transpose();
    Ok(fgrid_convolve_sep(grid, &kx, &ky, BorderMode::Reflect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_resolve() {
        let m = BorderMode::Reflect;
        assert_eq!(m.resolve(-1, 4), 0);
        assert_eq!(m.resolve(-2, 4), 1);
        assert_eq!(m.resolve(4, 4), 3);
        assert_eq!(m.resolve(5, 4), 2);
        assert_eq!(m.resolve(2, 4), 2);
        // wider than the grid
        assert_eq!(m.resolve(-5, 2), 0);
        assert_eq!(BorderMode::Replicate.resolve(-3, 4), 0);
    }

    #[test]
    fn test_gaussian_preserves_constant() {
        let grid = FloatGrid::new_with_value(7, 5, 3.0).unwrap();
        let blurred = gaussian_blur(&grid, 2.0).unwrap();
        for &v in blurred.data() {
            assert!((v - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_gaussian_preserves_mass_with_reflect() {
        let mut grid = FloatGrid::new(15, 15).unwrap();
        grid.set_pixel(7, 7, 1.0).unwrap();
        let blurred = gaussian_blur(&grid, 1.0).unwrap();
        let total: f32 = blurred.data().iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        let (_, peak) = blurred.min_max();
        assert_eq!(blurred.get_pixel(7, 7), Some(peak));
    }

    #[test]
    fn test_gaussian_zero_sigma_is_identity() {
        let grid = FloatGrid::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(gaussian_blur(&grid, 0.0).unwrap(), grid);
        assert!(gaussian_blur(&grid, -1.0).is_err());
    }
}
