//! Image I/O regression test
//!
//! Run with:
//! ```
//! cargo test -p objcount-io --test io_reg
//! ```

use objcount_core::RgbGrid;
use objcount_io::{ImageFormat, IoError, detect_format, read_intensity, write_rgb};
use objcount_test::{RegParams, fixtures, regout_dir};

#[test]
fn io_reg() {
    let mut rp = RegParams::new("io");
    let dir = regout_dir().join("io_reg");
    std::fs::create_dir_all(&dir).expect("create regout dir");

    let gray = fixtures::two_blocks().expect("fixture");
    let rgb = RgbGrid::from_gray(&gray);

    // PNG is lossless: intensity survives the RGB round trip
    let png_path = dir.join("two_blocks.png");
    write_rgb(&png_path, &rgb, ImageFormat::Png).expect("write png");
    rp.check(
        detect_format(&png_path).ok() == Some(ImageFormat::Png),
        "png detected",
    ); // 1
    let back = read_intensity(&png_path).expect("read png");
    rp.compare_grids(&gray, &back); // 2

    // JPEG is lossy; the block mean stays close
    let jpg_path = dir.join("two_blocks.jpg");
    write_rgb(&jpg_path, &rgb, ImageFormat::Jpeg).expect("write jpeg");
    rp.check(
        detect_format(&jpg_path).ok() == Some(ImageFormat::Jpeg),
        "jpeg detected",
    ); // 3
    let back = read_intensity(&jpg_path).expect("read jpeg");
    rp.compare_values(gray.mean(), back.mean(), 8.0); // 4

    // Missing files surface as I/O errors, junk as unsupported
    let missing = read_intensity(dir.join("does_not_exist.png"));
    rp.check(matches!(missing, Err(IoError::Io(_))), "missing file"); // 5
    let junk_path = dir.join("junk.png");
    std::fs::write(&junk_path, b"not an image at all").expect("write junk");
    let junk = read_intensity(&junk_path);
    rp.check(matches!(junk, Err(IoError::UnsupportedFormat(_))), "junk file"); // 6

    assert!(rp.cleanup(), "io regression test failed");
}
