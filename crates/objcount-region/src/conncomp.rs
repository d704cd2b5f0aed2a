//! Connected component analysis
//!
//! This module labels maximal 4- or 8-connected sets of foreground pixels
//! in a binary mask. Labels are handed out in raster order of each
//! component's first pixel, starting at 1.

use objcount_core::{BinaryMask, LabelMap};
use std::collections::VecDeque;

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    #[default]
    FourWay,
    /// 8-way connectivity (includes diagonals)
    EightWay,
}

const OFFSETS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const OFFSETS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl ConnectivityType {
    /// Neighbor offsets as (dx, dy)
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            ConnectivityType::FourWay => &OFFSETS_4,
            ConnectivityType::EightWay => &OFFSETS_8,
        }
    }

    /// 4 or 8
    pub fn count(self) -> u32 {
        self.offsets().len() as u32
    }

    /// Parse 4 or 8
    pub fn from_count(n: u32) -> Option<Self> {
        match n {
            4 => Some(ConnectivityType::FourWay),
            8 => Some(ConnectivityType::EightWay),
            _ => None,
        }
    }

    /// In-bounds neighbors of (x, y) in a `width` x `height` grid
    pub fn neighbors(
        self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (u32, u32)> {
        self.offsets().iter().filter_map(move |&(dx, dy)| {
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            (nx >= 0 && ny >= 0 && nx < width as i64 && ny < height as i64)
                .then_some((nx as u32, ny as u32))
        })
    }
}

/// Label all connected components in a binary mask
///
/// Returns a label map where background pixels are 0 and each component
/// carries a unique positive label.
pub fn label_connected_components(mask: &BinaryMask, connectivity: ConnectivityType) -> LabelMap {
    let (width, height) = mask.dimensions();
    let mut labels: LabelMap = mask.map(|_| 0u32);
    let mut next_label = 0u32;
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if !mask.get_pixel_unchecked(x, y) || labels.get_pixel_unchecked(x, y) != 0 {
                continue;
            }

            next_label += 1;
            labels.set_pixel_unchecked(x, y, next_label);
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                for (nx, ny) in connectivity.neighbors(cx, cy, width, height) {
                    if mask.get_pixel_unchecked(nx, ny) && labels.get_pixel_unchecked(nx, ny) == 0
                    {
                        labels.set_pixel_unchecked(nx, ny, next_label);
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    labels
}

/// Relabel so every label covers one connected set of pixels
///
/// Pixels with equal non-zero labels that are not connected under
/// `connectivity` receive distinct labels. Output labels are assigned in
/// raster order of first pixel, like [`label_connected_components`].
pub fn split_disconnected_labels(labels: &LabelMap, connectivity: ConnectivityType) -> LabelMap {
    let (width, height) = labels.dimensions();
    let mut out = labels.create_template();
    let mut next_label = 0u32;
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            let label = labels.get_pixel_unchecked(x, y);
            if label == 0 || out.get_pixel_unchecked(x, y) != 0 {
                continue;
            }

            next_label += 1;
            out.set_pixel_unchecked(x, y, next_label);
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                for (nx, ny) in connectivity.neighbors(cx, cy, width, height) {
                    if labels.get_pixel_unchecked(nx, ny) == label
                        && out.get_pixel_unchecked(nx, ny) == 0
                    {
                        out.set_pixel_unchecked(nx, ny, next_label);
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    out
}

/// Count the number of connected components
pub fn count_components(mask: &BinaryMask, connectivity: ConnectivityType) -> u32 {
    label_connected_components(mask, connectivity).max_label()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(width: u32, height: u32, pixels: &[(u32, u32)]) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height).unwrap();
        for &(x, y) in pixels {
            mask.set_pixel(x, y, true).unwrap();
        }
        mask
    }

    #[test]
    fn test_diagonal_pixels_depend_on_connectivity() {
        let mask = mask_from(4, 4, &[(0, 0), (1, 1), (2, 2)]);
        assert_eq!(count_components(&mask, ConnectivityType::FourWay), 3);
        assert_eq!(count_components(&mask, ConnectivityType::EightWay), 1);
    }

    #[test]
    fn test_labels_follow_raster_order() {
        let mask = mask_from(5, 3, &[(4, 0), (0, 2), (1, 2)]);
        let labels = label_connected_components(&mask, ConnectivityType::FourWay);
        assert_eq!(labels.get_pixel(4, 0), Some(1));
        assert_eq!(labels.get_pixel(0, 2), Some(2));
        assert_eq!(labels.get_pixel(1, 2), Some(2));
        assert_eq!(labels.get_pixel(2, 2), Some(0));
    }

    #[test]
    fn test_u_shape_is_one_component() {
        // columns 0 and 2 joined along the bottom row
        let mask = mask_from(3, 3, &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2), (2, 1), (2, 0)]);
        let labels = label_connected_components(&mask, ConnectivityType::FourWay);
        assert_eq!(labels.max_label(), 1);
        assert_eq!(labels.label_areas()[&1], 7);
    }

    #[test]
    fn test_split_disconnected_labels() {
        // label 3 appears twice, separated by background
        let labels = LabelMap::from_data(5, 1, vec![3, 3, 0, 3, 7]).unwrap();
        let out = split_disconnected_labels(&labels, ConnectivityType::FourWay);
        assert_eq!(out.data(), &[1, 1, 0, 2, 3]);
    }

    #[test]
    fn test_empty_mask() {
        let mask = BinaryMask::new(6, 6).unwrap();
        assert_eq!(count_components(&mask, ConnectivityType::EightWay), 0);
    }

    #[test]
    fn test_neighbors_clip_to_bounds() {
        let corner: Vec<_> = ConnectivityType::EightWay.neighbors(0, 0, 3, 3).collect();
        assert_eq!(corner.len(), 3);
        let center: Vec<_> = ConnectivityType::FourWay.neighbors(1, 1, 3, 3).collect();
        assert_eq!(center.len(), 4);
    }
}
