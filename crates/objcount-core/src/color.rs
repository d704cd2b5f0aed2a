//! RGB colors and the overlay canvas
//!
//! The overlay exporter paints on an [`RgbGrid`], a `Grid<Color>` created
//! from the intensity image.

use crate::grid::Grid;
use crate::typed::IntensityGrid;

/// RGB color for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray color with all channels equal to `v`
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Black color
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// White color
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Red color
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    /// Yellow color
    pub const YELLOW: Color = Color {
        r: 255,
        g: 255,
        b: 0,
    };

    /// Luminance of the color, rounded to 8 bits.
    ///
    /// Uses the ITU-R BT.709 weights `0.2125 R + 0.7154 G + 0.0721 B`.
    pub fn luminance(&self) -> u8 {
        let y = 0.2125 * self.r as f32 + 0.7154 * self.g as f32 + 0.0721 * self.b as f32;
        y.round().clamp(0.0, 255.0) as u8
    }
}

/// RGB image used as the overlay canvas
pub type RgbGrid = Grid<Color>;

impl Grid<Color> {
    /// Promote a grayscale image to RGB
    pub fn from_gray(gray: &IntensityGrid) -> RgbGrid {
        gray.map(Color::gray)
    }

    /// Interleaved `RGBRGB...` bytes in row-major order
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len() * 3);
        for c in self.data() {
            bytes.extend_from_slice(&[c.r, c.g, c.b]);
        }
        bytes
    }

    /// Paint (x, y) if it lies inside the canvas; signed coordinates allow
    /// callers to draw shapes that overhang the border.
    pub fn paint(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.set_pixel_unchecked(x as u32, y as u32, color);
    }
}
