//! PNG image format support

use crate::{IoError, IoResult};
use objcount_core::{Color, IntensityGrid, RgbGrid};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Scale a big-endian 16-bit sample to 8 bits
#[inline]
fn sample16(data: &[u8], idx: usize) -> u8 {
    let v = ((data[idx] as u32) << 8) | data[idx + 1] as u32;
    ((v + 128) / 257) as u8
}

/// Read a PNG image as single-channel intensity
///
/// Palette and low bit-depth images are expanded first. Color pixels are
/// reduced with [`Color::luminance`], 16-bit samples are scaled to 8 bits
/// and alpha is ignored.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<IntensityGrid> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let (color_type, bit_depth) = reader.output_color_type();

    let channels = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "PNG palette was not expanded".to_string(),
            ));
        }
    };
    let bytes_per_sample = match bit_depth {
        BitDepth::Eight => 1,
        BitDepth::Sixteen => 2,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG bit depth after expansion: {:?}",
                other
            )));
        }
    };

    // Read image data
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let stride = channels * bytes_per_sample;
    if bytes_per_row < width as usize * stride || data.len() < bytes_per_row * height as usize {
        return Err(IoError::InvalidData("PNG frame shorter than header".to_string()));
    }

    let sample = |idx: usize| -> u8 {
        if bytes_per_sample == 2 {
            sample16(data, idx)
        } else {
            data[idx]
        }
    };

    let grid = IntensityGrid::from_fn(width, height, |x, y| {
        let idx = y as usize * bytes_per_row + x as usize * stride;
        if channels < 3 {
            sample(idx)
        } else {
            Color::new(
                sample(idx),
                sample(idx + bytes_per_sample),
                sample(idx + 2 * bytes_per_sample),
            )
            .luminance()
        }
    })?;
    Ok(grid)
}

fn encode<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    color_type: ColorType,
    data: &[u8],
) -> IoResult<()> {
    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    writer
        .write_image_data(data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;
    Ok(())
}

/// Write an RGB image as 8-bit PNG
pub fn write_png_rgb<W: Write>(grid: &RgbGrid, writer: W) -> IoResult<()> {
    encode(
        writer,
        grid.width(),
        grid.height(),
        ColorType::Rgb,
        &grid.to_rgb_bytes(),
    )
}

/// Write an intensity image as 8-bit grayscale PNG
pub fn write_png_gray<W: Write>(grid: &IntensityGrid, writer: W) -> IoResult<()> {
    encode(
        writer,
        grid.width(),
        grid.height(),
        ColorType::Grayscale,
        grid.data(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_grayscale() {
        let grid = IntensityGrid::from_fn(13, 7, |x, y| (x * 17 + y * 3) as u8).unwrap();
        let mut buf = Vec::new();
        write_png_gray(&grid, &mut buf).unwrap();
        let back = read_png(Cursor::new(buf)).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_png_rgb_reads_as_luminance() {
        let mut rgb = RgbGrid::new(3, 1).unwrap();
        rgb.set_pixel(0, 0, Color::RED).unwrap();
        rgb.set_pixel(1, 0, Color::WHITE).unwrap();
        rgb.set_pixel(2, 0, Color::gray(90)).unwrap();
        let mut buf = Vec::new();
        write_png_rgb(&rgb, &mut buf).unwrap();
        let back = read_png(Cursor::new(buf)).unwrap();
        assert_eq!(back.data(), &[54, 255, 90]);
    }

    #[test]
    fn test_png_16bit_gray_is_scaled() {
        let mut buf = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buf, 2, 1);
            encoder.set_color(ColorType::Grayscale);
            encoder.set_depth(BitDepth::Sixteen);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0xFF, 0xFF, 0x80, 0x00]).unwrap();
            writer.finish().unwrap();
        }
        let back = read_png(Cursor::new(buf)).unwrap();
        assert_eq!(back.data(), &[255, 128]);
    }

    #[test]
    fn test_png_garbage_is_decode_error() {
        let result = read_png(Cursor::new(vec![0x89, 0x50, 0x4E, 0x47, 1, 2, 3]));
        assert!(matches!(result, Err(IoError::DecodeError(_))));
    }
}
