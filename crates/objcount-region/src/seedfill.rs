//! Seed fill operations
//!
//! Flood fill over binary masks and the border-seeded hole filling built
//! on it.

use crate::conncomp::ConnectivityType;
use objcount_core::BinaryMask;
use std::collections::VecDeque;

/// Mark every pixel reachable from the seeds through pixels equal to
/// `value`.
///
/// Seeds whose own value differs from `value` are ignored. Returns a mask
/// of the reached pixels.
pub fn floodfill(
    mask: &BinaryMask,
    seeds: impl IntoIterator<Item = (u32, u32)>,
    value: bool,
    connectivity: ConnectivityType,
) -> BinaryMask {
    let (width, height) = mask.dimensions();
    let mut reached = mask.create_template();
    let mut queue = VecDeque::new();

    for (x, y) in seeds {
        if mask.get_pixel(x, y) == Some(value) && !reached.get_pixel_unchecked(x, y) {
            reached.set_pixel_unchecked(x, y, true);
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in connectivity.neighbors(x, y, width, height) {
            if mask.get_pixel_unchecked(nx, ny) == value && !reached.get_pixel_unchecked(nx, ny) {
                reached.set_pixel_unchecked(nx, ny, true);
                queue.push_back((nx, ny));
            }
        }
    }

    reached
}

/// Coordinates of the outermost ring of a `width` x `height` grid
pub fn border_pixels(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let rows = (0..width).flat_map(move |x| [(x, 0), (x, height - 1)]);
    let cols = (0..height).flat_map(move |y| [(0, y), (width - 1, y)]);
    rows.chain(cols)
}

/// Fill holes in a binary mask
///
/// A hole is a background pixel with no 4-connected background path to the
/// grid border. Every hole pixel becomes foreground; everything else is
/// unchanged. The operation is idempotent.
pub fn fill_holes(mask: &BinaryMask) -> BinaryMask {
    let (width, height) = mask.dimensions();
    let outside = floodfill(
        mask,
        border_pixels(width, height),
        false,
        ConnectivityType::FourWay,
    );
    outside.map(|reached| !reached)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(size: u32) -> BinaryMask {
        // square outline from (1,1) to (size-2, size-2)
        BinaryMask::from_fn(size, size, |x, y| {
            let lo = 1;
            let hi = size - 2;
            (x == lo || x == hi || y == lo || y == hi)
                && (lo..=hi).contains(&x)
                && (lo..=hi).contains(&y)
        })
        .unwrap()
    }

    #[test]
    fn test_fill_ring_interior() {
        let mask = ring(7);
        let filled = fill_holes(&mask);
        // 5x5 block from (1,1) to (5,5)
        assert_eq!(filled.count_foreground(), 25);
        assert_eq!(filled.get_pixel(3, 3), Some(true));
        assert_eq!(filled.get_pixel(0, 0), Some(false));
    }

    #[test]
    fn test_diagonal_gap_still_encloses() {
        // the hole touches the outside only diagonally, which does not
        // count under 4-connectivity
        let mut mask = ring(7);
        mask.set_pixel(1, 1, false).unwrap();
        let filled = fill_holes(&mask);
        assert_eq!(filled.get_pixel(3, 3), Some(true));
        assert_eq!(filled.get_pixel(1, 1), Some(false));
    }

    #[test]
    fn test_open_ring_is_not_filled() {
        let mut mask = ring(7);
        mask.set_pixel(3, 1, false).unwrap();
        let filled = fill_holes(&mask);
        assert_eq!(filled, mask);
    }

    #[test]
    fn test_fill_holes_idempotent() {
        let mask = ring(9);
        let once = fill_holes(&mask);
        let twice = fill_holes(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_foreground_unchanged() {
        let mask = BinaryMask::new_with_value(4, 4, true).unwrap();
        assert_eq!(fill_holes(&mask), mask);
    }

    #[test]
    fn test_floodfill_ignores_mismatched_seed() {
        let mask = ring(7);
        let reached = floodfill(&mask, [(1, 1)], false, ConnectivityType::FourWay);
        assert!(reached.is_all_background());
    }
}
