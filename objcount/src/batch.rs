//! Directory batch driver
//!
//! Lists the images of an input directory, gives each a 1-based index in
//! natural file-name order and runs load -> analyze -> export for every
//! image on the rayon pool. Jobs share nothing; each writes its own files.

use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError, PipelineResult};
use crate::export::{ExportedFiles, export_results};
use crate::pipeline::{Diagnostic, analyze};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions picked up from the input directory (case-insensitive)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One image to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// 1-based position in the sorted input listing
    pub index: usize,
    /// Image to analyze
    pub input: PathBuf,
    /// Same-named image in the comparison directory, if any
    pub compare: Option<PathBuf>,
}

/// Where a batch reads and writes
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Directory listed for input images
    pub input_dir: PathBuf,
    /// Directory of same-named comparison images for difference segmentation
    pub compare_dir: Option<PathBuf>,
    /// Directory receiving tables and overlays
    pub output_dir: PathBuf,
    /// Continue with the remaining images after a failure
    pub keep_going: bool,
}

impl BatchOptions {
    /// Read from `input_dir`, write to `output_dir`, stop at the first failure
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set the comparison directory
    pub fn with_compare_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.compare_dir = Some(dir.into());
        self
    }

    /// Set whether failures are collected instead of aborting
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

/// Result of one successfully processed image
#[derive(Debug, Clone)]
pub struct ImageReport {
    /// 1-based image index used in the output file names
    pub index: usize,
    /// Image that was analyzed
    pub input: PathBuf,
    /// Regions left after size filtering
    pub region_count: usize,
    /// Recoverable conditions reported by the pipeline
    pub diagnostics: Vec<Diagnostic>,
    /// Table and overlay written for this image
    pub files: ExportedFiles,
}

/// Outcome of a whole batch, ordered by image index
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Images processed successfully
    pub processed: Vec<ImageReport>,
    /// Images that failed, only populated with `keep_going`
    pub failed: Vec<(ImageJob, PipelineError)>,
}

impl BatchReport {
    /// Total number of regions over all processed images
    pub fn region_count(&self) -> usize {
        self.processed.iter().map(|r| r.region_count).sum()
    }

    /// True when no image failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NameChunk<'a> {
    Number(u128),
    Text(&'a str),
}

fn name_chunks(name: &str) -> Vec<NameChunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let bytes = name.as_bytes();
    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let end = bytes[start..]
            .iter()
            .position(|b| b.is_ascii_digit() != digit)
            .map_or(bytes.len(), |n| start + n);
        let part = &name[start..end];
        chunks.push(match part.parse::<u128>() {
            Ok(n) if digit => NameChunk::Number(n),
            _ => NameChunk::Text(part),
        });
        start = end;
    }
    chunks
}

/// Order file names so that embedded numbers compare numerically
/// (`2.png` before `10.png`)
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    name_chunks(a).cmp(&name_chunks(b)).then_with(|| a.cmp(b))
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// List the images of `input_dir` as jobs
///
/// With a `compare_dir`, each job is paired with the file of the same name
/// there; a missing partner leaves `compare` empty.
pub fn collect_jobs(input_dir: &Path, compare_dir: Option<&Path>) -> PipelineResult<Vec<ImageJob>> {
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if is_image(&path)
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| natural_cmp(a, b));

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(i, name)| ImageJob {
            index: i + 1,
            input: input_dir.join(&name),
            compare: compare_dir
                .map(|dir| dir.join(&name))
                .filter(|p| p.is_file()),
        })
        .collect())
}

/// Load, analyze and export one image
///
/// Runs inside an `image` span carrying the job index, so pipeline
/// diagnostics are attributed to their image.
pub fn run_job(config: &PipelineConfig, job: &ImageJob, output_dir: &Path) -> PipelineResult<ImageReport> {
    let _span = tracing::info_span!("image", index = job.index).entered();
    let grid = objcount_io::read_intensity(&job.input)?;
    let compare = match (&job.compare, config.segmentation.needs_comparison()) {
        (Some(path), true) => Some(objcount_io::read_intensity(path)?),
        _ => None,
    };
    let analysis = analyze(config, &grid, compare.as_ref())?;
    let files = export_results(output_dir, job.index, config, &grid, &analysis)?;
    tracing::info!(
        image = %job.input.display(),
        regions = analysis.regions.len(),
        "processed"
    );
    Ok(ImageReport {
        index: job.index,
        input: job.input.clone(),
        region_count: analysis.regions.len(),
        diagnostics: analysis.diagnostics,
        files,
    })
}

/// Run the pipeline over a directory of images
///
/// The configuration is validated before any file is touched. Without
/// `keep_going` the first failing image aborts the batch with its error;
/// with it every image is attempted and failures are collected in the
/// report.
pub fn run_batch(config: &PipelineConfig, options: &BatchOptions) -> PipelineResult<BatchReport> {
    config.validate()?;
    if config.segmentation.needs_comparison() && options.compare_dir.is_none() {
        return Err(ConfigError::InvalidParameter(
            "difference segmentation needs a comparison directory".to_string(),
        )
        .into());
    }

    let jobs = collect_jobs(&options.input_dir, options.compare_dir.as_deref())?;
    tracing::info!(
        images = jobs.len(),
        strategy = %config.segmentation.strategy(),
        split = config.split.token(),
        "starting batch"
    );

    let mut report = BatchReport::default();
    if options.keep_going {
        let outcomes: Vec<_> = jobs
            .into_par_iter()
            .map(|job| {
                let outcome = run_job(config, &job, &options.output_dir);
                (job, outcome)
            })
            .collect();
        for (job, outcome) in outcomes {
            match outcome {
                Ok(image) => report.processed.push(image),
                Err(e) => {
                    tracing::error!(index = job.index, image = %job.input.display(), "{e}");
                    report.failed.push((job, e));
                }
            }
        }
    } else {
        report.processed = jobs
            .par_iter()
            .map(|job| {
                run_job(config, job, &options.output_dir).inspect_err(|e| {
                    tracing::error!(index = job.index, image = %job.input.display(), "{e}");
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
    }

    tracing::info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        regions = report.region_count(),
        "batch finished"
    );
    Ok(report)
}
