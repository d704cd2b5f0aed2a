//! objcount-io - Image I/O for objcount
//!
//! Decodes photographs into the single-channel [`IntensityGrid`] the
//! pipeline works on, and encodes RGB overlays.
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | PNG    | 1/2/4/8/16-bit gray, RGB(A), palette | 8-bit gray, RGB |
//! | JPEG   | gray, RGB, CMYK | RGB |
//!
//! Formats are recognized by their magic bytes, not the file extension.

mod error;
pub mod format;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;

pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format, detect_format_from_bytes};

use objcount_core::{IntensityGrid, RgbGrid};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image file as single-channel intensity
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be read,
/// [`IoError::UnsupportedFormat`] for unrecognized data and
/// [`IoError::DecodeError`] for corrupt files.
pub fn read_intensity<P: AsRef<Path>>(path: P) -> IoResult<IntensityGrid> {
    let data = fs::read(path.as_ref())?;
    read_intensity_mem(&data)
}

/// Decode an in-memory image as single-channel intensity
pub fn read_intensity_mem(data: &[u8]) -> IoResult<IntensityGrid> {
    match detect_format_from_bytes(data)? {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(Cursor::new(data)),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Encode an RGB image into `writer`
pub fn write_rgb_stream<W: Write>(grid: &RgbGrid, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png_rgb(grid, writer),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::write_jpeg_rgb(grid, writer, jpeg::DEFAULT_QUALITY),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{:?} support not enabled",
            other
        ))),
    }
}

/// Write an RGB image to a file
pub fn write_rgb<P: AsRef<Path>>(path: P, grid: &RgbGrid, format: ImageFormat) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_rgb_stream(grid, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}
