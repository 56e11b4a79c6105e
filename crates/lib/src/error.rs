//! Build-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::matrix::ConfigError;
use crate::style::StyleError;

/// Errors that stop a build run.
///
/// Configuration, pattern and I/O errors are raised before any compilation
/// starts. `BuildFailed` is only raised after every compilation has settled
/// and reconciliation has run.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("invalid build matrix: {0}")]
  Config(#[from] ConfigError),

  #[error("invalid style pattern: {0}")]
  Style(#[from] StyleError),

  #[error(transparent)]
  ConfigFile(#[from] ConfigFileError),

  #[error("entry point {} does not exist", .0.display())]
  MissingEntryPoint(PathBuf),

  #[error("failed to prepare output directory {}: {source}", .path.display())]
  OutputDir { path: PathBuf, source: std::io::Error },

  #[error("build failed for {}:\n{}", .variants.join(", "), .messages.join("\n"))]
  BuildFailed { variants: Vec<String>, messages: Vec<String> },
}

impl BuildError {
  /// Variants named by a `BuildFailed` error.
  pub fn failed_variants(&self) -> &[String] {
    match self {
      BuildError::BuildFailed { variants, .. } => variants,
      _ => &[],
    }
  }
}
