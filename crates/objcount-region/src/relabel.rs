//! Size filtering and label compaction

use crate::{RegionError, RegionResult};
use objcount_core::LabelMap;
use std::collections::{HashMap, HashSet};

/// Result of [`filter_by_size`]
#[derive(Debug, Clone)]
pub struct SizeFilterOutcome {
    /// Compacted label map holding only the kept regions
    pub labels: LabelMap,
    /// Number of regions kept
    pub kept: u32,
    /// Number of regions removed for being too small or too large
    pub removed: u32,
}

/// Renumber labels to `1..=N` in order of first appearance
///
/// Background stays 0. The mapping goes through an explicit old-to-new
/// table holding only the labels observed during a raster scan.
pub fn compact_labels(labels: &LabelMap) -> LabelMap {
    let table: HashMap<u32, u32> = labels
        .labels_in_scan_order()
        .into_iter()
        .zip(1..)
        .collect();
    labels.map(|label| table.get(&label).copied().unwrap_or(0))
}

/// Keep regions whose pixel count lies in `min_area..=max_area`
///
/// Removed regions become background and the survivors are compacted with
/// [`compact_labels`], so the output labels run from 1 with no gaps.
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] when `min_area > max_area`.
pub fn filter_by_size(
    labels: &LabelMap,
    min_area: u32,
    max_area: u32,
) -> RegionResult<SizeFilterOutcome> {
    if min_area > max_area {
        return Err(RegionError::InvalidParameters(format!(
            "size range is empty: min {min_area} > max {max_area}"
        )));
    }

    let mut keep = HashSet::new();
    let mut removed = 0u32;
    for (label, area) in labels.label_areas() {
        if (min_area..=max_area).contains(&area) {
            keep.insert(label);
        } else {
            removed += 1;
        }
    }
    let kept = keep.len() as u32;

    let filtered = labels.map(|label| if keep.contains(&label) { label } else { 0 });
    Ok(SizeFilterOutcome {
        labels: compact_labels(&filtered),
        kept,
        removed,
    })
}
