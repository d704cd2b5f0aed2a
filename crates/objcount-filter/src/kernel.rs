//! Convolution kernels
//!
//! A kernel is a small row-major weight matrix with a designated center
//! element. Convolution places the center over the output pixel.

use crate::{FilterError, FilterResult};

/// Number of standard deviations covered on each side of a Gaussian kernel
pub const GAUSSIAN_TRUNCATE: f32 = 4.0;

/// A 2D convolution kernel
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a zero kernel with the given dimensions, centered.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a centered kernel from row-major values.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values for a {width}x{height} kernel, got {}",
                kernel.data.len(),
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Horizontal 1D Gaussian kernel of unit sum.
    ///
    /// The half-width is `round(GAUSSIAN_TRUNCATE * sigma)`, so the kernel
    /// covers four standard deviations on each side.
    pub fn gaussian_1d(sigma: f32) -> FilterResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FilterError::InvalidParameters(format!(
                "gaussian sigma must be positive and finite, got {sigma}"
            )));
        }
        let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as i32;
        let denom = 2.0 * sigma * sigma;
        let mut values: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / denom).exp())
            .collect();
        let sum: f32 = values.iter().sum();
        values.iter_mut().for_each(|v| *v /= sum);
        Self::from_slice(values.len() as u32, 1, &values)
    }

    /// Sobel kernel responding to horizontal edges (vertical gradient),
    /// scaled by 1/4 so a unit step yields a response of 1.
    pub fn sobel_horizontal() -> Self {
        Self {
            width: 3,
            height: 3,
            cx: 1,
            cy: 1,
            data: vec![
                0.25, 0.5, 0.25, //
                0.0, 0.0, 0.0, //
                -0.25, -0.5, -0.25,
            ],
        }
    }

    /// Sobel kernel responding to vertical edges (horizontal gradient),
    /// scaled by 1/4.
    pub fn sobel_vertical() -> Self {
        Self {
            width: 3,
            height: 3,
            cx: 1,
            cy: 1,
            data: vec![
                0.25, 0.0, -0.25, //
                0.5, 0.0, -0.5, //
                0.25, 0.0, -0.25,
            ],
        }
    }

    /// Swap rows and columns; a horizontal 1D kernel becomes vertical.
    pub fn transpose(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                data[(x * self.height + y) as usize] = self.data[(y * self.width + x) as usize];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cx: self.cy,
            cy: self.cx,
            data,
        }
    }

    /// Get the kernel width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Get the kernel data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get the value at (x, y)
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Sum of all kernel values
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_unit_sum_and_size() {
        let k = Kernel::gaussian_1d(1.0).unwrap();
        assert_eq!(k.width(), 9);
        assert_eq!(k.height(), 1);
        assert_eq!(k.center_x(), 4);
        assert!((k.sum() - 1.0).abs() < 1e-5);
        // symmetric and peaked at the center
        assert_eq!(k.get(0, 0), k.get(8, 0));
        assert!(k.get(4, 0).unwrap() > k.get(3, 0).unwrap());
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        assert!(Kernel::gaussian_1d(0.0).is_err());
        assert!(Kernel::gaussian_1d(f32::NAN).is_err());
    }

    #[test]
    fn test_transpose() {
        let k = Kernel::from_slice(3, 1, &[1.0, 2.0, 3.0]).unwrap();
        let t = k.transpose();
        assert_eq!((t.width(), t.height()), (1, 3));
        assert_eq!(t.get(0, 2), Some(3.0));
        assert_eq!(t.center_y(), 1);
    }

    #[test]
    fn test_sobel_sums_to_zero() {
        assert_eq!(Kernel::sobel_horizontal().sum(), 0.0);
        assert_eq!(Kernel::sobel_vertical().sum(), 0.0);
    }
}
