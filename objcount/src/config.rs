//! Pipeline configuration
//!
//! A [`PipelineConfig`] is either assembled with builder methods or read
//! from its serialized form, [`RawConfig`], which names the segmentation
//! strategy by string. [`RawConfig::into_config`] is the single place where
//! names and ranges are checked.

use crate::error::{ConfigError, ConfigResult};
use objcount_io::ImageFormat;
use objcount_region::{ConnectivityType, WatershedOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default intensity threshold for the threshold strategy (0-255)
pub const DEFAULT_INTENSITY_THRESHOLD: f32 = 140.0;
/// Default normalized threshold for the difference strategy
pub const DEFAULT_DIFFERENCE_THRESHOLD: f32 = 0.25;
/// Default normalized threshold for the edge-detection strategy
pub const DEFAULT_EDGE_THRESHOLD: f32 = 0.1;
/// Default smallest object area kept, in pixels
pub const DEFAULT_MIN_SIZE: u32 = 200;
/// Default largest object area kept, in pixels
pub const DEFAULT_MAX_SIZE: u32 = 1500;

/// Segmentation strategy without its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Intensity strictly above a threshold
    Threshold,
    /// Brighter than a comparison image by more than a normalized threshold
    Difference,
    /// Sobel magnitude above a normalized threshold
    EdgeDetection,
}

impl Strategy {
    /// All strategies, in documentation order
    pub const ALL: [Strategy; 3] = [
        Strategy::Threshold,
        Strategy::Difference,
        Strategy::EdgeDetection,
    ];

    /// Name used in configuration files and output file names
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Threshold => "threshold",
            Strategy::Difference => "difference",
            Strategy::EdgeDetection => "edgeDetection",
        }
    }

    /// Look up a strategy by its configuration name
    pub fn from_name(name: &str) -> ConfigResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))
    }

    /// Threshold used when none is configured
    pub fn default_threshold(self) -> f32 {
        match self {
            Strategy::Threshold => DEFAULT_INTENSITY_THRESHOLD,
            Strategy::Difference => DEFAULT_DIFFERENCE_THRESHOLD,
            Strategy::EdgeDetection => DEFAULT_EDGE_THRESHOLD,
        }
    }

    /// Attach a threshold
    pub fn with_threshold(self, threshold: f32) -> Segmentation {
        match self {
            Strategy::Threshold => Segmentation::Threshold { threshold },
            Strategy::Difference => Segmentation::Difference { threshold },
            Strategy::EdgeDetection => Segmentation::EdgeDetection { threshold },
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Segmentation strategy with its threshold
///
/// The threshold of [`Segmentation::Threshold`] is in intensity units
/// (0-255); the other two are on the normalized `[0, 1]` scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segmentation {
    /// Foreground where intensity exceeds the threshold
    Threshold { threshold: f32 },
    /// Foreground where the image is brighter than the comparison image by
    /// more than the threshold; a negative threshold also admits pixels
    /// that are darker by less than its magnitude
    Difference { threshold: f32 },
    /// Foreground where the Sobel gradient magnitude exceeds the threshold
    EdgeDetection { threshold: f32 },
}

impl Segmentation {
    /// Strategy of this segmentation
    pub fn strategy(&self) -> Strategy {
        match self {
            Segmentation::Threshold { .. } => Strategy::Threshold,
            Segmentation::Difference { .. } => Strategy::Difference,
            Segmentation::EdgeDetection { .. } => Strategy::EdgeDetection,
        }
    }

    /// Configured threshold
    pub fn threshold(&self) -> f32 {
        match *self {
            Segmentation::Threshold { threshold }
            | Segmentation::Difference { threshold }
            | Segmentation::EdgeDetection { threshold } => threshold,
        }
    }

    /// Whether a comparison image is needed
    pub fn needs_comparison(&self) -> bool {
        matches!(self, Segmentation::Difference { .. })
    }
}

impl Default for Segmentation {
    fn default() -> Self {
        Strategy::Threshold.with_threshold(DEFAULT_INTENSITY_THRESHOLD)
    }
}

/// Whether touching objects are split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Distance-transform watershed
    #[default]
    Watershed,
    /// Plain connected components
    NoSplit,
}

impl SplitMode {
    /// Token used in output file names
    pub fn token(self) -> &'static str {
        match self {
            SplitMode::Watershed => "ws",
            SplitMode::NoSplit => "nosplit",
        }
    }

    fn from_enabled(enabled: bool) -> Self {
        if enabled {
            SplitMode::Watershed
        } else {
            SplitMode::NoSplit
        }
    }
}

/// Field separator of the results table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Tab separated, written as `.txt`
    #[default]
    Tab,
    /// Comma separated, written as `.csv`
    Comma,
}

impl Delimiter {
    /// Separator character
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Comma => ',',
        }
    }

    /// Table file extension
    pub fn extension(self) -> &'static str {
        match self {
            Delimiter::Tab => "txt",
            Delimiter::Comma => "csv",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Delimiter::Tab => "tab",
            Delimiter::Comma => "comma",
        }
    }

    fn from_name(name: &str) -> ConfigResult<Self> {
        match name {
            "tab" => Ok(Delimiter::Tab),
            "comma" => Ok(Delimiter::Comma),
            other => Err(ConfigError::InvalidParameter(format!(
                "delimiter must be 'tab' or 'comma', got '{other}'"
            ))),
        }
    }
}

/// Validated pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Segmentation strategy and threshold
    pub segmentation: Segmentation,
    /// Watershed or plain labeling
    pub split: SplitMode,
    /// Gaussian sigma applied to the distance field before marker search
    pub gaussian_spread: f32,
    /// Smallest object area kept (inclusive)
    pub min_size: u32,
    /// Largest object area kept (inclusive)
    pub max_size: u32,
    /// Pixel adjacency for labeling and flooding
    pub connectivity: ConnectivityType,
    /// Results table separator
    pub delimiter: Delimiter,
    /// Overlay image format
    pub overlay_format: ImageFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmentation: Segmentation::default(),
            split: SplitMode::Watershed,
            gaussian_spread: objcount_region::DEFAULT_SMOOTHING_SIGMA,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            connectivity: ConnectivityType::FourWay,
            delimiter: Delimiter::Tab,
            overlay_format: ImageFormat::Png,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segmentation strategy
    pub fn with_segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Set the split mode
    pub fn with_split(mut self, split: SplitMode) -> Self {
        self.split = split;
        self
    }

    /// Set the distance-field smoothing sigma
    pub fn with_gaussian_spread(mut self, sigma: f32) -> Self {
        self.gaussian_spread = sigma;
        self
    }

    /// Set the inclusive object size range
    pub fn with_size_range(mut self, min_size: u32, max_size: u32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Set the connectivity
    pub fn with_connectivity(mut self, connectivity: ConnectivityType) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the table delimiter
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the overlay format
    pub fn with_overlay_format(mut self, format: ImageFormat) -> Self {
        self.overlay_format = format;
        self
    }

    /// Check ranges
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSizeRange`] when `min_size > max_size`,
    /// [`ConfigError::InvalidParameter`] for a non-finite threshold, a
    /// negative threshold outside difference segmentation, a negative or
    /// non-finite gaussian spread, or an intensity threshold above 255.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_size > self.max_size {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if !self.gaussian_spread.is_finite() || self.gaussian_spread < 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "gaussian spread must be non-negative and finite, got {}",
                self.gaussian_spread
            )));
        }
        let threshold = self.segmentation.threshold();
        if !threshold.is_finite() {
            return Err(ConfigError::InvalidParameter(format!(
                "threshold must be finite, got {threshold}"
            )));
        }
        // a signed difference may be compared against a negative threshold
        if threshold < 0.0 && !self.segmentation.needs_comparison() {
            return Err(ConfigError::InvalidParameter(format!(
                "{} threshold must be non-negative, got {threshold}",
                self.segmentation.strategy()
            )));
        }
        if let Segmentation::Threshold { threshold } = self.segmentation
            && threshold > objcount_core::MAX_INTENSITY as f32
        {
            return Err(ConfigError::InvalidParameter(format!(
                "intensity threshold must be at most 255, got {threshold}"
            )));
        }
        Ok(())
    }

    /// Watershed options matching this configuration
    pub fn watershed_options(&self) -> WatershedOptions {
        WatershedOptions::new()
            .with_sigma(self.gaussian_spread)
            .with_connectivity(self.connectivity)
    }

    /// Read and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        RawConfig::from_json_file(path)?.into_config()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        RawConfig::from_json_str(json)?.into_config()
    }

    /// Serializable form of this configuration
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            segmentation_strategy: self.segmentation.strategy().name().to_string(),
            threshold_value: Some(self.segmentation.threshold() as f64),
            split_enabled: self.split == SplitMode::Watershed,
            gaussian_spread: self.gaussian_spread as f64,
            min_size: self.min_size as i64,
            max_size: self.max_size as i64,
            connectivity: self.connectivity.count(),
            delimiter: self.delimiter.name().to_string(),
            overlay_format: self.overlay_format.extension().to_string(),
        }
    }
}

/// Unvalidated configuration as stored in JSON
///
/// Missing fields take their defaults; a missing `threshold_value` means
/// the selected strategy's default threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub segmentation_strategy: String,
    pub threshold_value: Option<f64>,
    pub split_enabled: bool,
    pub gaussian_spread: f64,
    pub min_size: i64,
    pub max_size: i64,
    pub connectivity: u32,
    pub delimiter: String,
    pub overlay_format: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        let mut raw = PipelineConfig::default().to_raw();
        raw.threshold_value = None;
        raw
    }
}

fn size_bound(name: &str, value: i64) -> ConfigResult<u32> {
    u32::try_from(value).map_err(|_| {
        ConfigError::InvalidParameter(format!("{name} must be between 0 and {}, got {value}", u32::MAX))
    })
}

impl RawConfig {
    /// Parse JSON without validating values
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON file without validating values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Resolve names and check ranges
    pub fn into_config(self) -> ConfigResult<PipelineConfig> {
        let strategy = Strategy::from_name(&self.segmentation_strategy)?;
        let threshold = self
            .threshold_value
            .map(|t| t as f32)
            .unwrap_or_else(|| strategy.default_threshold());
        let connectivity = ConnectivityType::from_count(self.connectivity).ok_or_else(|| {
            ConfigError::InvalidParameter(format!(
                "connectivity must be 4 or 8, got {}",
                self.connectivity
            ))
        })?;
        let overlay_format = ImageFormat::from_extension(&self.overlay_format).ok_or_else(|| {
            ConfigError::InvalidParameter(format!(
                "overlay format must be 'png' or 'jpg', got '{}'",
                self.overlay_format
            ))
        })?;

        let config = PipelineConfig {
            segmentation: strategy.with_threshold(threshold),
            split: SplitMode::from_enabled(self.split_enabled),
            gaussian_spread: self.gaussian_spread as f32,
            min_size: size_bound("min_size", self.min_size)?,
            max_size: size_bound("max_size", self.max_size)?,
            connectivity,
            delimiter: Delimiter::from_name(&self.delimiter)?,
            overlay_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.segmentation, Segmentation::Threshold { threshold: 140.0 });
        assert_eq!(config.split, SplitMode::Watershed);
        assert_eq!(config.gaussian_spread, 4.0);
        assert_eq!((config.min_size, config.max_size), (200, 1500));
        assert_eq!(config.connectivity, ConnectivityType::FourWay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_names() {
        for s in Strategy::ALL {
            assert_eq!(Strategy::from_name(s.name()).unwrap(), s);
        }
        assert_eq!("edgeDetection".parse::<Strategy>().unwrap(), Strategy::EdgeDetection);
        assert!(matches!(
            Strategy::from_name("foo"),
            Err(ConfigError::UnknownStrategy(name)) if name == "foo"
        ));
    }

    #[test]
    fn test_json_uses_strategy_default_threshold() {
        let config = PipelineConfig::from_json_str(r#"{"segmentation_strategy": "difference"}"#)
            .unwrap();
        assert_eq!(config.segmentation, Segmentation::Difference { threshold: 0.25 });
    }

    #[test]
    fn test_json_full() {
        let json = r#"{
            "segmentation_strategy": "edgeDetection",
            "threshold_value": 0.2,
            "split_enabled": false,
            "gaussian_spread": 0,
            "min_size": 1,
            "max_size": 100,
            "connectivity": 8,
            "delimiter": "comma",
            "overlay_format": "jpg"
        }"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.segmentation.strategy(), Strategy::EdgeDetection);
        assert!((config.segmentation.threshold() - 0.2).abs() < 1e-6);
        assert_eq!(config.split, SplitMode::NoSplit);
        assert_eq!(config.connectivity, ConnectivityType::EightWay);
        assert_eq!(config.delimiter, Delimiter::Comma);
        assert_eq!(config.overlay_format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        let cases = [
            r#"{"segmentation_strategy": "foo"}"#,
            r#"{"min_size": 10, "max_size": 5}"#,
            r#"{"min_size": -1}"#,
            r#"{"gaussian_spread": -2}"#,
            r#"{"threshold_value": -0.5}"#,
            r#"{"threshold_value": 300}"#,
            r#"{"connectivity": 6}"#,
            r#"{"delimiter": "pipe"}"#,
            r#"{"overlay_format": "gif"}"#,
            r#"{"unknown_field": 1}"#,
        ];
        for json in cases {
            assert!(PipelineConfig::from_json_str(json).is_err(), "{json}");
        }
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"segmentation_strategy": "foo"}"#),
            Err(ConfigError::UnknownStrategy(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"min_size": 10, "max_size": 5}"#),
            Err(ConfigError::InvalidSizeRange { min: 10, max: 5 })
        ));
    }

    #[test]
    fn test_negative_threshold_only_for_difference() {
        let difference = PipelineConfig::new()
            .with_segmentation(Strategy::Difference.with_threshold(-0.1));
        assert!(difference.validate().is_ok());
        assert!(
            PipelineConfig::from_json_str(
                r#"{"segmentation_strategy": "difference", "threshold_value": -0.2}"#
            )
            .is_ok()
        );
        for strategy in [Strategy::Threshold, Strategy::EdgeDetection] {
            let config = PipelineConfig::new().with_segmentation(strategy.with_threshold(-0.1));
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidParameter(_))
            ));
        }
        let nan = PipelineConfig::new()
            .with_segmentation(Strategy::Difference.with_threshold(f32::NAN));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_raw_round_trip() {
        let config = PipelineConfig::new()
            .with_segmentation(Strategy::Difference.with_threshold(0.5))
            .with_split(SplitMode::NoSplit)
            .with_size_range(3, 30);
        let json = config.to_raw().to_json_pretty().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_tokens() {
        assert_eq!(SplitMode::Watershed.token(), "ws");
        assert_eq!(SplitMode::NoSplit.token(), "nosplit");
        assert_eq!(Delimiter::Tab.extension(), "txt");
        assert_eq!(Delimiter::Comma.as_char(), ',');
    }
}
