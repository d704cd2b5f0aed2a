//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate and writes them with
//! `jpeg-encoder`. Decoded images are reduced to single-channel intensity;
//! written images are 24-bit RGB.

use crate::{IoError, IoResult};
use jpeg_decoder::PixelFormat;
use objcount_core::{Color, IntensityGrid, RgbGrid};
use std::io::{Read, Write};

/// Default JPEG quality for overlays
pub const DEFAULT_QUALITY: u8 = 90;

/// Read a JPEG image as single-channel intensity.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// Grayscale images are returned as is (16-bit samples scaled to 8 bits),
/// RGB images are reduced with [`Color::luminance`] and CMYK images are
/// converted to RGB first.
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<IntensityGrid> {
    let mut decoder = jpeg_decoder::Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG has no frame header".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;
    let n = width as usize * height as usize;
    let expected = n * info.pixel_format.pixel_bytes();
    if pixels.len() < expected {
        return Err(IoError::InvalidData(format!(
            "JPEG pixel buffer has {} bytes, expected {}",
            pixels.len(),
            expected
        )));
    }

    let data: Vec<u8> = match info.pixel_format {
        PixelFormat::L8 => pixels[..n].to_vec(),
        PixelFormat::L16 => pixels
            .chunks_exact(2)
            .take(n)
            .map(|c| {
                let v = ((c[0] as u32) << 8) | c[1] as u32;
                ((v + 128) / 257) as u8
            })
            .collect(),
        PixelFormat::RGB24 => pixels
            .chunks_exact(3)
            .take(n)
            .map(|c| Color::new(c[0], c[1], c[2]).luminance())
            .collect(),
        PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .take(n)
            .map(|c| {
                // Adobe CMYK JPEGs store inverted ink values
                let k = c[3] as u32;
                let r = (c[0] as u32 * k / 255) as u8;
                let g = (c[1] as u32 * k / 255) as u8;
                let b = (c[2] as u32 * k / 255) as u8;
                Color::new(r, g, b).luminance()
            })
            .collect(),
    };

    Ok(IntensityGrid::from_data(width, height, data)?)
}

fn dimension(value: u32) -> IoResult<u16> {
    u16::try_from(value).map_err(|_| {
        IoError::EncodeError(format!("dimension {value} exceeds the JPEG limit of 65535"))
    })
}

/// Write an RGB image as baseline JPEG
pub fn write_jpeg_rgb<W: Write>(grid: &RgbGrid, writer: W, quality: u8) -> IoResult<()> {
    let width = dimension(grid.width())?;
    let height = dimension(grid.height())?;
    let encoder = jpeg_encoder::Encoder::new(writer, quality.clamp(1, 100));
    encoder
        .encode(
            &grid.to_rgb_bytes(),
            width,
            height,
            jpeg_encoder::ColorType::Rgb,
        )
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_jpeg_roundtrip_is_close() {
        let gray = IntensityGrid::from_fn(16, 16, |x, _| if x < 8 { 40 } else { 210 }).unwrap();
        let rgb = RgbGrid::from_gray(&gray);
        let mut buf = Vec::new();
        write_jpeg_rgb(&rgb, &mut buf, 95).unwrap();
        let back = read_jpeg(Cursor::new(buf)).unwrap();
        assert_eq!(back.dimensions(), (16, 16));
        // lossy, but flat areas stay near their value
        let left = back.get_pixel(2, 8).unwrap() as i32;
        let right = back.get_pixel(13, 8).unwrap() as i32;
        assert!((left - 40).abs() <= 6, "left = {left}");
        assert!((right - 210).abs() <= 6, "right = {right}");
    }

    #[test]
    fn test_jpeg_garbage_is_decode_error() {
        let result = read_jpeg(Cursor::new(vec![0xFF, 0xD8, 0xFF, 0x00, 0x01]));
        assert!(matches!(result, Err(IoError::DecodeError(_))));
    }
}
