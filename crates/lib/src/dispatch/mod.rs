//! Compilation dispatch.
//!
//! Every variant of the matrix becomes one compilation task. All tasks are
//! spawned up front on a `JoinSet`; the only suspension point is the join
//! that waits for every one of them to settle. A failing or panicking task
//! never cancels its siblings.

mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::compile::{CompilationTask, CompileError, Compiler};
use crate::matrix::BuildMatrix;
use crate::style::StyleTransformAdapter;

pub use types::{CompilationResult, DispatchResult};

/// Compile every variant of `matrix` concurrently.
///
/// Each task shares the entry point, the external list and the style adapter.
/// The returned results are in matrix order and contain one entry per
/// variant, whatever happened to its task.
pub async fn dispatch(
  matrix: &BuildMatrix,
  entry_point: &Path,
  externals: &[String],
  style: Arc<StyleTransformAdapter>,
  compiler: Arc<dyn Compiler>,
) -> DispatchResult {
  info!(variants = matrix.len(), entry = %entry_point.display(), "dispatching compilations");

  let externals: Arc<[String]> = Arc::from(externals);
  let mut join_set = JoinSet::new();

  for (index, variant) in matrix.iter().enumerate() {
    let task = CompilationTask::new(variant.clone(), entry_point, externals.clone(), style.clone());
    let compiler = compiler.clone();

    join_set.spawn(async move {
      let started = Instant::now();
      let variant = task.variant.clone();

      // Run the pass on its own task so a panic is reported against this variant.
      let outcome = match tokio::spawn(async move { compiler.compile(&task).await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(CompileError::Aborted(e.to_string())),
      };

      (index, CompilationResult::new(variant, outcome, started.elapsed()))
    });
  }

  debug!(tasks = join_set.len(), "all compilation tasks submitted");

  let mut slots: Vec<Option<CompilationResult>> = vec![None; matrix.len()];

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((index, result)) => {
        match &result.error {
          None => info!(
            variant = %result.variant,
            files = result.emitted_files.len(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "compilation succeeded"
          ),
          Some(e) => error!(variant = %result.variant, error = %e, "compilation failed"),
        }
        slots[index] = Some(result);
      }
      Err(e) => {
        error!(error = %e, "compilation task panicked");
      }
    }
  }

  let results: Vec<_> = slots
    .into_iter()
    .zip(matrix.iter())
    .map(|(slot, variant)| {
      slot.unwrap_or_else(|| {
        CompilationResult::new(
          variant.clone(),
          Err(CompileError::Aborted("task ended without reporting".to_string())),
          Default::default(),
        )
      })
    })
    .collect();

  let result = DispatchResult { results };
  info!(
    succeeded = result.succeeded().count(),
    failed = result.failed().count(),
    "all compilations settled"
  );
  result
}
