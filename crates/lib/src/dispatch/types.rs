//! Types for compilation dispatch.

use std::path::PathBuf;
use std::time::Duration;

use crate::compile::CompileError;
use crate::error::BuildError;
use crate::matrix::BuildVariant;

/// Outcome of one variant's compilation.
#[derive(Debug, Clone)]
pub struct CompilationResult {
  pub variant: BuildVariant,

  /// Files the pass left on disk (empty on failure).
  pub emitted_files: Vec<PathBuf>,

  pub error: Option<CompileError>,

  pub elapsed: Duration,
}

impl CompilationResult {
  pub fn new(variant: BuildVariant, outcome: Result<Vec<PathBuf>, CompileError>, elapsed: Duration) -> Self {
    match outcome {
      Ok(emitted_files) => Self {
        variant,
        emitted_files,
        error: None,
        elapsed,
      },
      Err(error) => Self {
        variant,
        emitted_files: Vec::new(),
        error: Some(error),
        elapsed,
      },
    }
  }

  pub fn success(&self) -> bool {
    self.error.is_none()
  }
}

/// Every variant's outcome, in matrix order.
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
  pub results: Vec<CompilationResult>,
}

impl DispatchResult {
  pub fn is_success(&self) -> bool {
    self.results.iter().all(CompilationResult::success)
  }

  pub fn succeeded(&self) -> impl Iterator<Item = &CompilationResult> {
    self.results.iter().filter(|r| r.success())
  }

  pub fn failed(&self) -> impl Iterator<Item = &CompilationResult> {
    self.results.iter().filter(|r| !r.success())
  }

  /// Returns `BuildFailed` naming every failed variant, if any failed.
  pub fn check(&self) -> Result<(), BuildError> {
    if self.is_success() {
      return Ok(());
    }

    let mut variants = Vec::new();
    let mut messages = Vec::new();

    for result in self.failed() {
      variants.push(result.variant.to_string());
      if let Some(error) = &result.error {
        messages.push(format!("{}: {}", result.variant, error));
      }
    }

    Err(BuildError::BuildFailed { variants, messages })
  }
}
