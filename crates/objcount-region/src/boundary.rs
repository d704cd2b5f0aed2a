//! Label boundaries

use objcount_core::{BinaryMask, LabelMap};

/// Mark pixels whose label differs from a 4-neighbour
///
/// Both sides of a boundary are marked, so a region touching background
/// gets its outermost pixels and the adjacent background pixels set.
pub fn find_boundaries(labels: &LabelMap) -> BinaryMask {
    let (width, height) = labels.dimensions();
    let mut boundaries: BinaryMask = labels.map(|_| false);
    for (x, y, label) in labels.iter_pixels() {
        let differs = [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)].iter().any(|&(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            nx >= 0
                && ny >= 0
                && nx < width as i64
                && ny < height as i64
                && labels.get_pixel_unchecked(nx as u32, ny as u32) != label
        });
        if differs {
            boundaries.set_pixel_unchecked(x, y, true);
        }
    }
    boundaries
}
