//! Error types for the objcount pipeline

use thiserror::Error;

/// Invalid configuration, detected before any pixel is processed
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Segmentation strategy name not recognized
    #[error("unknown segmentation strategy '{0}' (expected threshold, difference or edgeDetection)")]
    UnknownStrategy(String),

    /// `min_size` exceeds `max_size`
    #[error("invalid size range: min {min} > max {max}")]
    InvalidSizeRange { min: u32, max: u32 },

    /// A parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file is not valid JSON for the expected shape
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure writing results
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the table or creating the output directory failed
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the overlay failed
    #[error("overlay error: {0}")]
    Image(#[from] objcount_io::IoError),

    /// Label map and image disagree in size
    #[error("overlay error: {0}")]
    Core(#[from] objcount_core::Error),
}

/// Errors from running the pipeline on one image or a batch
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The comparison image differs in size from the input image
    #[error("dimension mismatch: image is {expected:?}, comparison is {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The difference strategy was used without a comparison image
    #[error("difference segmentation requires a comparison image")]
    MissingComparison,

    /// Region processing failed
    #[error("region error: {0}")]
    Region(#[from] objcount_region::RegionError),

    /// Filtering failed
    #[error("filter error: {0}")]
    Filter(#[from] objcount_filter::FilterError),

    /// Loading an image failed
    #[error("image load error: {0}")]
    Load(#[from] objcount_io::IoError),

    /// Writing results failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Listing the input directory failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
