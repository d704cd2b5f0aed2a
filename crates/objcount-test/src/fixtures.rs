//! Synthetic fixtures
//!
//! Small generated images with known geometry, so regression tests can
//! state exact expected counts and areas without shipping image files.

use crate::error::{TestError, TestResult};
use objcount_core::{BinaryMask, IntensityGrid};

/// Foreground intensity used by the fixtures
pub const FOREGROUND: u8 = 200;
/// Background intensity used by the fixtures
pub const BACKGROUND: u8 = 50;

/// Axis-aligned square block: top-left corner and side length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

impl Block {
    pub fn new(x: u32, y: u32, side: u32) -> Self {
        Self { x, y, side }
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        (self.x..self.x + self.side).contains(&x) && (self.y..self.y + self.side).contains(&y)
    }
}

/// Grid of `background` with every block painted `foreground`
pub fn blocks_grid(
    width: u32,
    height: u32,
    blocks: &[Block],
    foreground: u8,
    background: u8,
) -> TestResult<IntensityGrid> {
    for b in blocks {
        if b.x + b.side > width || b.y + b.side > height {
            return Err(TestError::InvalidFixture(format!(
                "block {b:?} exceeds {width}x{height}"
            )));
        }
    }
    Ok(IntensityGrid::from_fn(width, height, |x, y| {
        if blocks.iter().any(|b| b.contains(x, y)) {
            foreground
        } else {
            background
        }
    })?)
}

/// 10x10 grid with two separated 3x3 blocks of 200 on 50
pub fn two_blocks() -> TestResult<IntensityGrid> {
    blocks_grid(
        10,
        10,
        &[Block::new(1, 1, 3), Block::new(6, 5, 3)],
        FOREGROUND,
        BACKGROUND,
    )
}

/// Union of discs of the given radius around each `(x, y)` center
pub fn disks_mask(
    width: u32,
    height: u32,
    centers: &[(f64, f64)],
    radius: f64,
) -> TestResult<BinaryMask> {
    Ok(BinaryMask::from_fn(width, height, |x, y| {
        centers.iter().any(|&(cx, cy)| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            dx * dx + dy * dy <= radius * radius
        })
    })?)
}

/// Two radius-10 discs whose centers lie 16 pixels apart, forming one blob
/// with a narrow waist
pub fn overlapping_disks() -> TestResult<BinaryMask> {
    disks_mask(48, 40, &[(15.0, 20.0), (31.0, 20.0)], 10.0)
}

/// Annulus centered in a square grid: `inner < distance <= outer`
pub fn ring_mask(size: u32, outer: f64, inner: f64) -> TestResult<BinaryMask> {
    if inner >= outer {
        return Err(TestError::InvalidFixture(format!(
            "ring inner radius {inner} must be below outer radius {outer}"
        )));
    }
    let c = (size as f64 - 1.0) / 2.0;
    Ok(BinaryMask::from_fn(size, size, |x, y| {
        let dx = x as f64 - c;
        let dy = y as f64 - c;
        let d2 = dx * dx + dy * dy;
        d2 <= outer * outer && d2 > inner * inner
    })?)
}

/// Render a mask as an intensity grid
pub fn mask_to_intensity(mask: &BinaryMask, foreground: u8, background: u8) -> IntensityGrid {
    mask.map(|fg| if fg { foreground } else { background })
}
