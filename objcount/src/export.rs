//! Results table and overlay output

use crate::config::{Delimiter, PipelineConfig, SplitMode, Strategy};
use crate::error::ExportResult;
use crate::pipeline::ImageAnalysis;
use objcount_core::{Color, IntensityGrid, LabelMap, RgbGrid};
use objcount_io::ImageFormat;
use objcount_region::{Region, find_boundaries};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Table column names, in output order
pub const TABLE_COLUMNS: [&str; 7] = [
    "Label",
    "MeanIntensity",
    "Y",
    "X",
    "Area",
    "Perimeter",
    "MajorAxisLength",
];

/// Color of region boundaries in the overlay
pub const BOUNDARY_COLOR: Color = Color::YELLOW;

/// Color of label ids in the overlay
pub const LABEL_COLOR: Color = Color::RED;

const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;

/// 3x5 digit bitmaps, one row per entry, most significant bit on the left
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Write the results table for `regions`
///
/// A header row is always written, so an empty region list produces a
/// header-only table.
pub fn write_table<W: Write>(
    mut writer: W,
    regions: &[Region],
    delimiter: Delimiter,
) -> std::io::Result<()> {
    writer.write_all(format_table(regions, delimiter).as_bytes())
}

/// Render the results table to a string
pub fn format_table(regions: &[Region], delimiter: Delimiter) -> String {
    let d = delimiter.as_char();
    let mut text = TABLE_COLUMNS.join(&d.to_string());
    text.push('\n');
    for r in regions {
        text.push_str(&format!(
            "{}{d}{:.6}{d}{:.6}{d}{:.6}{d}{}{d}{:.6}{d}{:.6}\n",
            r.label,
            r.mean_intensity,
            r.row(),
            r.col(),
            r.area,
            r.perimeter,
            r.major_axis_length,
        ));
    }
    text
}

/// `<strategy>_<split>_<index>_results.<txt|csv>`
pub fn table_file_name(
    strategy: Strategy,
    split: SplitMode,
    index: usize,
    delimiter: Delimiter,
) -> String {
    format!(
        "{}_{}_{}_results.{}",
        strategy.name(),
        split.token(),
        index,
        delimiter.extension()
    )
}

/// `overlay_<strategy>_<split>_<index>.<png|jpg>`
pub fn overlay_file_name(
    strategy: Strategy,
    split: SplitMode,
    index: usize,
    format: ImageFormat,
) -> String {
    format!(
        "overlay_{}_{}_{}.{}",
        strategy.name(),
        split.token(),
        index,
        format.extension()
    )
}

fn draw_digit(canvas: &mut RgbGrid, digit: usize, left: i64, top: i64, color: Color) {
    for (dy, bits) in DIGITS[digit].iter().enumerate() {
        for dx in 0..GLYPH_WIDTH {
            if bits & (0b100 >> dx) != 0 {
                canvas.paint(left + dx, top + dy as i64, color);
            }
        }
    }
}

/// Draw `number` centred on (`col`, `row`); glyphs overhanging the canvas
/// are clipped.
pub fn draw_number(canvas: &mut RgbGrid, number: u32, col: f64, row: f64, color: Color) {
    let digits: Vec<usize> = number
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let width = digits.len() as i64 * (GLYPH_WIDTH + 1) - 1;
    let left = col.round() as i64 - width / 2;
    let top = row.round() as i64 - GLYPH_HEIGHT / 2;
    for (i, &digit) in digits.iter().enumerate() {
        draw_digit(canvas, digit, left + i as i64 * (GLYPH_WIDTH + 1), top, color);
    }
}

/// Grey image with yellow region boundaries and red label ids
pub fn render_overlay(
    grid: &IntensityGrid,
    labels: &LabelMap,
    regions: &[Region],
) -> ExportResult<RgbGrid> {
    grid.check_same_size(labels)?;
    let mut canvas = RgbGrid::from_gray(grid);
    let boundaries = find_boundaries(labels);
    for (pixel, &edge) in canvas.data_mut().iter_mut().zip(boundaries.data()) {
        if edge {
            *pixel = BOUNDARY_COLOR;
        }
    }
    for region in regions {
        draw_number(&mut canvas, region.label, region.col(), region.row(), LABEL_COLOR);
    }
    Ok(canvas)
}

/// Paths written by [`export_results`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// Results table
    pub table: PathBuf,
    /// Annotated overlay image
    pub overlay: PathBuf,
}

/// Write the table and overlay of image `index` into `output_dir`
///
/// The directory is created if missing.
pub fn export_results(
    output_dir: &Path,
    index: usize,
    config: &PipelineConfig,
    grid: &IntensityGrid,
    analysis: &ImageAnalysis,
) -> ExportResult<ExportedFiles> {
    fs::create_dir_all(output_dir)?;
    let strategy = config.segmentation.strategy();

    let table = output_dir.join(table_file_name(
        strategy,
        config.split,
        index,
        config.delimiter,
    ));
    let mut writer = BufWriter::new(File::create(&table)?);
    write_table(&mut writer, &analysis.regions, config.delimiter)?;
    writer.flush()?;

    let overlay = output_dir.join(overlay_file_name(
        strategy,
        config.split,
        index,
        config.overlay_format,
    ));
    let canvas = render_overlay(grid, &analysis.labels, &analysis.regions)?;
    objcount_io::write_rgb(&overlay, &canvas, config.overlay_format)?;

    tracing::debug!(table = %table.display(), overlay = %overlay.display(), "exported");
    Ok(ExportedFiles { table, overlay })
}
