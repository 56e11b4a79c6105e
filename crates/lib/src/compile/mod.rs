//! Compiler capability.
//!
//! The compiler itself (bundler, minifier, tree-shaker) is external. This
//! module defines what one compilation pass is asked to do and the trait the
//! dispatcher drives; [`esbuild::EsbuildCompiler`] is the production
//! implementation.

pub mod esbuild;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::matrix::BuildVariant;
use crate::style::StyleTransformAdapter;

pub use esbuild::EsbuildCompiler;

/// Why a single variant failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
  /// The compiler process could not be started.
  #[error("failed to run {program}: {message}")]
  Spawn { program: String, message: String },

  /// The compiler exited unsuccessfully (syntax, resolution or plugin error).
  #[error("compiler exited with code {code:?}: {stderr}")]
  Exited { code: Option<i32>, stderr: String },

  /// The compiler reported success but the output script is missing.
  #[error("compiler did not write {}", .0.display())]
  MissingOutput(PathBuf),

  /// The compilation task panicked or was torn down before reporting.
  #[error("compilation task aborted: {0}")]
  Aborted(String),
}

/// Everything one compilation pass needs.
///
/// Bundling, tree shaking and source maps are always on; the remaining knobs
/// come from the variant.
#[derive(Debug, Clone)]
pub struct CompilationTask {
  pub variant: BuildVariant,
  pub entry_point: PathBuf,
  pub externals: Arc<[String]>,
  pub style: Arc<StyleTransformAdapter>,
  pub bundle: bool,
  pub tree_shaking: bool,
  pub sourcemap: bool,
}

impl CompilationTask {
  pub fn new(
    variant: BuildVariant,
    entry_point: impl Into<PathBuf>,
    externals: Arc<[String]>,
    style: Arc<StyleTransformAdapter>,
  ) -> Self {
    Self {
      variant,
      entry_point: entry_point.into(),
      externals,
      style,
      bundle: true,
      tree_shaking: true,
      sourcemap: true,
    }
  }

  pub fn outfile(&self) -> &Path {
    &self.variant.output_path
  }
}

/// Runs one compilation pass.
///
/// Implementations write the variant's output script, its map, and whatever
/// side artifacts the attached style adapter declares. They return the files
/// that exist afterwards.
#[async_trait]
pub trait Compiler: Send + Sync {
  async fn compile(&self, task: &CompilationTask) -> Result<Vec<PathBuf>, CompileError>;

  /// Whether emitted stylesheets use the adapter's class-name pattern.
  fn applies_class_pattern(&self) -> bool {
    true
  }
}
