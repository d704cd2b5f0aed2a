//! Grid - The 2D pixel container
//!
//! `Grid<T>` is the one storage type behind every raster in the pipeline:
//! intensity images, binary masks, label maps, distance fields and the RGB
//! overlay canvas.
//!
//! # Memory Layout
//!
//! Data is stored in row-major order with no padding. The pixel at (x, y)
//! is at index `y * width + x`; `x` is the column and `y` the row, with the
//! origin in the upper left corner.
//!
//! # Examples
//!
//! ```
//! use objcount_core::Grid;
//!
//! let mut grid: Grid<u8> = Grid::new(4, 3).unwrap();
//! grid.set_pixel(2, 1, 200).unwrap();
//! assert_eq!(grid.get_pixel(2, 1), Some(200));
//! assert_eq!(grid.get_pixel(9, 9), None);
//! ```

use crate::error::{Error, Result};

/// Row-major 2D array of pixel values
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<T>,
}

impl<T: Copy + Default> Grid<T> {
    /// Create a new grid with every pixel set to `T::default()`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, T::default())
    }

    /// Create a new grid with every pixel set to `value`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: T) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(Grid {
            width,
            height,
            data: vec![value; size],
        })
    }

    /// Create a grid from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length doesn't
    /// match `width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(Grid {
            width,
            height,
            data,
        })
    }

    /// Create a grid by evaluating `f(x, y)` at every pixel
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> T,
    {
        let mut grid = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                grid.set_pixel_unchecked(x, y, f(x, y));
            }
        }
        Ok(grid)
    }

    /// Create a default-valued grid with the same dimensions as `self`
    pub fn create_template(&self) -> Self {
        Grid {
            width: self.width,
            height: self.height,
            data: vec![T::default(); self.data.len()],
        }
    }

    /// Get the grid width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the grid height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the grid dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; a grid holds at least one pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check that `other` has the same dimensions as `self`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] naming both shapes.
    pub fn check_same_size<U>(&self, other: &Grid<U>) -> Result<()> {
        if self.dimensions() != (other.width, other.height) {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: (other.width, other.height),
            });
        }
        Ok(())
    }

    /// Linear index of (x, y); caller guarantees bounds
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get the pixel value at (x, y), or `None` when out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[self.index(x, y)])
    }

    /// Get the pixel value at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if the index falls outside the data buffer.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> T {
        self.data[self.index(x, y)]
    }

    /// Set the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of range.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: T) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = self.index(x, y);
        self.data[idx] = value;
        Ok(())
    }

    /// Set the pixel value at (x, y) without bounds checking
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Get the pixel data
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Get mutable pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the grid and return its pixel data
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Get one row of pixels
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[T] {
        let start = (y as usize) * (self.width as usize);
        &self.data[start..start + self.width as usize]
    }

    /// Apply `f` to every pixel, producing a grid of the same shape
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: Copy + Default,
        F: FnMut(T) -> U,
    {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// Combine two equally-sized grids pixel by pixel
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the shapes differ.
    pub fn zip_map<U, V, F>(&self, other: &Grid<U>, mut f: F) -> Result<Grid<V>>
    where
        U: Copy + Default,
        V: Copy + Default,
        F: FnMut(T, U) -> V,
    {
        self.check_same_size(other)?;
        Ok(Grid {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Iterate over `(x, y, value)` in raster order
    pub fn iter_pixels(&self) -> impl Iterator<Item = (u32, u32, T)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i as u32) % width, (i as u32) / width, v))
    }

    /// Is (x, y) on the outermost ring of pixels?
    #[inline]
    pub fn is_border(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(matches!(
            Grid::<u8>::new(0, 5),
            Err(Error::InvalidDimension {
                width: 0,
                height: 5
            })
        ));
    }

    #[test]
    fn test_from_data_length_check() {
        assert!(Grid::from_data(2, 2, vec![1u8, 2, 3]).is_err());
        let grid = Grid::from_data(2, 2, vec![1u8, 2, 3, 4]).unwrap();
        assert_eq!(grid.get_pixel(1, 1), Some(4));
        assert_eq!(grid.row(1), &[3, 4]);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut grid: Grid<u32> = Grid::new(3, 3).unwrap();
        assert!(grid.set_pixel(3, 0, 1).is_err());
        assert!(grid.set_pixel(2, 2, 7).is_ok());
        assert_eq!(grid.get_pixel_unchecked(2, 2), 7);
    }

    #[test]
    fn test_zip_map_dimension_mismatch() {
        let a: Grid<u8> = Grid::new(3, 3).unwrap();
        let b: Grid<u8> = Grid::new(3, 4).unwrap();
        let err = a.zip_map(&b, |p, q| p.max(q)).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: (3, 3),
                actual: (3, 4)
            }
        ));
    }

    #[test]
    fn test_iter_pixels_raster_order() {
        let grid = Grid::from_fn(3, 2, |x, y| (y * 10 + x) as u8).unwrap();
        let coords: Vec<(u32, u32, u8)> = grid.iter_pixels().collect();
        assert_eq!(coords[0], (0, 0, 0));
        assert_eq!(coords[2], (2, 0, 2));
        assert_eq!(coords[3], (0, 1, 10));
        assert_eq!(coords.len(), 6);
    }

    #[test]
    fn test_is_border() {
        let grid: Grid<bool> = Grid::new(4, 4).unwrap();
        assert!(grid.is_border(0, 2));
        assert!(grid.is_border(3, 1));
        assert!(!grid.is_border(1, 2));
    }
}
