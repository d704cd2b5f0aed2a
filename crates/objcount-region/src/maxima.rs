//! Regional peak detection on scalar fields

use objcount_core::{BinaryMask, FloatGrid};

/// Find local maxima of `field` inside `mask`
///
/// A foreground pixel is a maximum when no foreground pixel in its 3x3
/// neighborhood has a strictly greater value. Plateaus therefore mark every
/// pixel on them; background pixels are never maxima.
///
/// `field` and `mask` must have equal dimensions.
pub fn find_local_maxima(field: &FloatGrid, mask: &BinaryMask) -> objcount_core::Result<BinaryMask> {
    field.check_same_size(mask)?;
    let (width, height) = field.dimensions();

    BinaryMask::from_fn(width, height, |x, y| {
        if !mask.get_pixel_unchecked(x, y) {
            return false;
        }
        let center = field.get_pixel_unchecked(x, y);
        let x0 = x.saturating_sub(1);
        let y0 = y.saturating_sub(1);
        let x1 = (x + 1).min(width - 1);
        let y1 = (y + 1).min(height - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                if mask.get_pixel_unchecked(nx, ny) && field.get_pixel_unchecked(nx, ny) > center {
                    return false;
                }
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_peak() {
        let field = FloatGrid::from_fn(5, 5, |x, y| {
            let dx = x as f32 - 2.0;
            let dy = y as f32 - 2.0;
            10.0 - (dx * dx + dy * dy)
        })
        .unwrap();
        let mask = BinaryMask::new_with_value(5, 5, true).unwrap();
        let maxima = find_local_maxima(&field, &mask).unwrap();
        assert_eq!(maxima.count_foreground(), 1);
        assert_eq!(maxima.get_pixel(2, 2), Some(true));
    }

    #[test]
    fn test_plateau_counts_every_pixel() {
        let field = FloatGrid::new_with_value(3, 2, 4.0).unwrap();
        let mask = BinaryMask::new_with_value(3, 2, true).unwrap();
        let maxima = find_local_maxima(&field, &mask).unwrap();
        assert_eq!(maxima.count_foreground(), 6);
    }

    #[test]
    fn test_background_neighbors_are_ignored() {
        // the higher value at (0, 0) lies outside the mask
        let field = FloatGrid::from_data(2, 1, vec![9.0, 1.0]).unwrap();
        let mask = BinaryMask::from_data(2, 1, vec![false, true]).unwrap();
        let maxima = find_local_maxima(&field, &mask).unwrap();
        assert_eq!(maxima.data(), &[false, true]);
    }

    #[test]
    fn test_size_mismatch() {
        let field = FloatGrid::new(3, 3).unwrap();
        let mask = BinaryMask::new(3, 4).unwrap();
        assert!(find_local_maxima(&field, &mask).is_err());
    }
}
