//! Full build run.
//!
//! 1. Validate the configuration, style pattern and matrix (fail fast)
//! 2. Dispatch every variant and wait for all of them to settle
//! 3. Sweep byproducts from the output directory
//! 4. Verify the surviving artifact set
//!
//! Reconciliation runs even when some variants failed so the output
//! directory never keeps stray stylesheets; the failure is reported after.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::compile::Compiler;
use crate::config::Config;
use crate::dispatch::{CompilationResult, dispatch};
use crate::error::BuildError;
use crate::matrix::BuildMatrix;
use crate::reconcile::{ArtifactCheck, ReconcilePlan, RemovedFile, verify_artifacts};
use crate::style::StyleTransformAdapter;

/// Everything a run decided before compiling.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  pub matrix: BuildMatrix,
  pub style: Arc<StyleTransformAdapter>,
  pub reconcile: ReconcilePlan,
  pub entry_point: PathBuf,
  pub out_dir: PathBuf,
  pub externals: Vec<String>,
}

impl BuildPlan {
  /// Validates `config` and derives the plan. Nothing touches the disk.
  pub fn from_config(config: &Config) -> Result<Self, BuildError> {
    let style = Arc::new(config.style_adapter()?);
    let matrix = config.matrix()?;
    matrix.validate(style.as_ref())?;
    let reconcile = ReconcilePlan::new(&matrix, style.as_ref());

    Ok(Self {
      matrix,
      style,
      reconcile,
      entry_point: config.entry_path(),
      out_dir: config.out_dir_path(),
      externals: config.externals.clone(),
    })
  }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct BuildReport {
  pub results: Vec<CompilationResult>,
  pub removed: Vec<RemovedFile>,
  pub artifacts: ArtifactCheck,
  /// The compiler named local classes itself instead of using the pattern.
  pub pattern_ignored: bool,
  pub elapsed: Duration,
}

/// Whether `compiler` will drop the class-name pattern of `plan`. Logs a warning if so.
pub fn check_class_pattern(plan: &BuildPlan, compiler: &dyn Compiler) -> bool {
  let ignored = plan.style.requires_plugin() && !compiler.applies_class_pattern();
  if ignored {
    warn!(
      pattern = plan.style.pattern(),
      "compiler does not run the css-modules plugin; class names will not follow the pattern"
    );
  }
  ignored
}

/// Runs the whole pipeline for `plan` with `compiler`.
pub async fn run(plan: &BuildPlan, compiler: Arc<dyn Compiler>) -> Result<BuildReport, BuildError> {
  let started = Instant::now();

  if !tokio::fs::try_exists(&plan.entry_point).await.unwrap_or(false) {
    return Err(BuildError::MissingEntryPoint(plan.entry_point.clone()));
  }

  tokio::fs::create_dir_all(&plan.out_dir)
    .await
    .map_err(|source| BuildError::OutputDir {
      path: plan.out_dir.clone(),
      source,
    })?;

  let pattern_ignored = check_class_pattern(plan, compiler.as_ref());

  let dispatched = dispatch(
    &plan.matrix,
    &plan.entry_point,
    &plan.externals,
    plan.style.clone(),
    compiler,
  )
  .await;

  // Every task has settled; sweeping now cannot race a pending write.
  let removed = plan.reconcile.sweep(&plan.out_dir);

  dispatched.check()?;

  let artifacts = verify_artifacts(&plan.out_dir, &plan.reconcile).map_err(|source| BuildError::OutputDir {
    path: plan.out_dir.clone(),
    source,
  })?;
  if !artifacts.is_complete() {
    warn!(
      missing = artifacts.missing.len(),
      leftover = artifacts.leftover.len(),
      "output directory does not match the expected artifact set"
    );
  }

  let report = BuildReport {
    results: dispatched.results,
    removed,
    artifacts,
    pattern_ignored,
    elapsed: started.elapsed(),
  };
  info!(
    variants = report.results.len(),
    removed = report.removed.len(),
    elapsed_ms = report.elapsed.as_millis() as u64,
    "build complete"
  );
  Ok(report)
}

/// Validates `config`, then runs the pipeline.
pub async fn build(config: &Config, compiler: Arc<dyn Compiler>) -> Result<BuildReport, BuildError> {
  let plan = BuildPlan::from_config(config)?;
  run(&plan, compiler).await
}
