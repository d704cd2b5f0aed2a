//! objcount-test - Regression test framework for objcount
//!
//! Regression tests create a [`RegParams`], run a numbered series of
//! comparisons through it and finish with [`RegParams::cleanup`], which
//! prints every failure and returns the overall verdict.
//!
//! # Usage
//!
//! ```
//! use objcount_test::RegParams;
//!
//! let mut rp = RegParams::new("conncomp");
//! rp.compare_values(2.0, 2.0, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! The [`fixtures`] module builds the synthetic images the tests run on.

mod error;
pub mod fixtures;
mod params;

use std::path::PathBuf;

pub use error::{TestError, TestResult};
pub use params::RegParams;

/// Get the path to the workspace root
fn workspace_root() -> PathBuf {
    // objcount-test is at crates/objcount-test, so go up two directories
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> PathBuf {
    workspace_root().join("target/regout")
}
