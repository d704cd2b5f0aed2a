//! Segmentation-and-measurement pipeline for a single image
//!
//! segment -> fill holes -> split (or label) -> size filter -> measure.
//! The pipeline is a pure function of the grids and the configuration; it
//! reads and writes no files.

use crate::config::{PipelineConfig, SplitMode};
use crate::error::PipelineResult;
use crate::segment::segment;
use objcount_core::{IntensityGrid, LabelMap};
use objcount_region::{
    Region, fill_holes, filter_by_size, label_connected_components, measure_regions,
    split_touching,
};
use std::fmt;

/// Recoverable conditions worth reporting alongside a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Watershed found no markers; plain labeling was used instead
    DegenerateSplit,
    /// No region survived size filtering
    EmptyResult,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateSplit => {
                f.write_str("no watershed markers found, fell back to plain labeling")
            }
            Diagnostic::EmptyResult => f.write_str("no objects left after size filtering"),
        }
    }
}

/// Output of [`analyze`]
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// Final compacted label map
    pub labels: LabelMap,
    /// One entry per label in ascending label order
    pub regions: Vec<Region>,
    /// Recoverable conditions met on the way
    pub diagnostics: Vec<Diagnostic>,
}

impl ImageAnalysis {
    /// Whether `diagnostic` was reported
    pub fn has(&self, diagnostic: Diagnostic) -> bool {
        self.diagnostics.contains(&diagnostic)
    }
}

/// Run the pipeline on one image
///
/// `compare` is the comparison image for difference segmentation and is
/// ignored by the other strategies.
///
/// # Errors
///
/// Configuration errors, a missing or differently sized comparison image
/// for difference segmentation, or an internal region error.
pub fn analyze(
    config: &PipelineConfig,
    grid: &IntensityGrid,
    compare: Option<&IntensityGrid>,
) -> PipelineResult<ImageAnalysis> {
    config.validate()?;
    let mut diagnostics = Vec::new();

    let mask = segment(&config.segmentation, grid, compare)?;
    let filled = fill_holes(&mask);
    tracing::debug!(
        foreground = mask.count_foreground(),
        filled = filled.count_foreground(),
        "segmented"
    );

    let labels = match config.split {
        SplitMode::NoSplit => label_connected_components(&filled, config.connectivity),
        SplitMode::Watershed => {
            let outcome = split_touching(&filled, &config.watershed_options())?;
            if outcome.degenerate {
                tracing::warn!("{}", Diagnostic::DegenerateSplit);
                diagnostics.push(Diagnostic::DegenerateSplit);
            }
            tracing::debug!(markers = outcome.marker_count, "watershed");
            outcome.labels
        }
    };

    let filtered = filter_by_size(&labels, config.min_size, config.max_size)?;
    tracing::debug!(
        kept = filtered.kept,
        removed = filtered.removed,
        "size filter"
    );
    if filtered.kept == 0 {
        tracing::warn!("{}", Diagnostic::EmptyResult);
        diagnostics.push(Diagnostic::EmptyResult);
    }

    let regions = measure_regions(&filtered.labels, grid)?;
    Ok(ImageAnalysis {
        labels: filtered.labels,
        regions,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;

    fn two_blocks() -> IntensityGrid {
        IntensityGrid::from_fn(10, 10, |x, y| {
            let a = (1..4).contains(&x) && (1..4).contains(&y);
            let b = (6..9).contains(&x) && (5..8).contains(&y);
            if a || b { 200 } else { 50 }
        })
        .unwrap()
    }

    #[test]
    fn test_two_blocks_no_split() {
        let config = PipelineConfig::new()
            .with_split(SplitMode::NoSplit)
            .with_size_range(1, 100);
        let analysis = analyze(&config, &two_blocks(), None).unwrap();
        assert_eq!(analysis.regions.len(), 2);
        assert!(analysis.diagnostics.is_empty());
        for r in &analysis.regions {
            assert_eq!(r.area, 9);
            assert_eq!(r.mean_intensity, 200.0);
        }
    }

    #[test]
    fn test_everything_filtered_is_empty_result() {
        let config = PipelineConfig::new()
            .with_split(SplitMode::NoSplit)
            .with_size_range(10, 100);
        let analysis = analyze(&config, &two_blocks(), None).unwrap();
        assert!(analysis.regions.is_empty());
        assert!(analysis.has(Diagnostic::EmptyResult));
        assert_eq!(analysis.labels.max_label(), 0);
    }

    #[test]
    fn test_blank_image_watershed_is_degenerate() {
        let grid = IntensityGrid::new_with_value(8, 8, 10).unwrap();
        let analysis = analyze(&PipelineConfig::default(), &grid, None).unwrap();
        assert!(analysis.has(Diagnostic::DegenerateSplit));
        assert!(analysis.has(Diagnostic::EmptyResult));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig::new().with_size_range(5, 1);
        assert!(analyze(&config, &two_blocks(), None).is_err());
    }

    #[test]
    fn test_difference_needs_comparison() {
        let config = PipelineConfig::new().with_segmentation(Strategy::Difference.with_threshold(0.25));
        assert!(analyze(&config, &two_blocks(), None).is_err());
        let dark = IntensityGrid::new_with_value(10, 10, 50).unwrap();
        let analysis = analyze(
            &config.clone().with_split(SplitMode::NoSplit).with_size_range(1, 100),
            &two_blocks(),
            Some(&dark),
        )
        .unwrap();
        assert_eq!(analysis.regions.len(), 2);
    }
}
