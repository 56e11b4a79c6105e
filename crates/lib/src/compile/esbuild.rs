//! esbuild-backed compiler.
//!
//! Each pass runs the `esbuild` executable (or a wrapper with the same
//! command line) as a child process. The style adapter contributes its loader
//! arguments and exports its class-name configuration through the
//! environment.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::compile::{CompilationTask, CompileError, Compiler};
use crate::matrix::map_path;
use crate::style::SideArtifacts;

#[derive(Debug, Clone)]
pub struct EsbuildCompiler {
  program: String,
  working_dir: Option<PathBuf>,
}

impl EsbuildCompiler {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      working_dir: None,
    }
  }

  /// Runs every pass from `dir` instead of the current directory.
  pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  /// The program is esbuild itself, not a wrapper running the css-modules plugin.
  pub fn is_stock(&self) -> bool {
    Path::new(&self.program).file_stem().is_some_and(|stem| stem == "esbuild")
  }

  /// Builds the esbuild command line for `task`.
  pub fn args(task: &CompilationTask) -> Vec<String> {
    let mut args = vec![task.entry_point.display().to_string()];

    if task.bundle {
      args.push("--bundle".to_string());
    }
    args.push(format!("--outfile={}", task.outfile().display()));
    args.push(format!("--format={}", task.variant.format));
    args.push(format!("--tree-shaking={}", task.tree_shaking));
    if task.variant.minify {
      args.push("--minify".to_string());
    }
    if task.sourcemap {
      args.push("--sourcemap".to_string());
    }
    for external in task.externals.iter() {
      args.push(format!("--external:{external}"));
    }
    args.extend(task.style.compiler_args());
    args.push("--log-level=warning".to_string());

    args
  }
}

#[async_trait]
impl Compiler for EsbuildCompiler {
  async fn compile(&self, task: &CompilationTask) -> Result<Vec<PathBuf>, CompileError> {
    info!(variant = %task.variant, outfile = %task.outfile().display(), "compiling");

    let mut command = Command::new(&self.program);
    command.args(Self::args(task)).envs(task.style.compiler_env());
    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }

    debug!(program = %self.program, "spawning compiler");

    let output = command.output().await.map_err(|e| CompileError::Spawn {
      program: self.program.clone(),
      message: e.to_string(),
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
      return Err(CompileError::Exited {
        code: output.status.code(),
        stderr,
      });
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
      debug!(variant = %task.variant, stderr = %stderr.trim(), "compiler warnings");
    }

    let outfile = self.resolve(task.outfile());
    if !tokio::fs::try_exists(&outfile).await.unwrap_or(false) {
      return Err(CompileError::MissingOutput(task.outfile().to_path_buf()));
    }

    Ok(emitted_files(task, |p| self.resolve(p)).await)
  }

  fn applies_class_pattern(&self) -> bool {
    !self.is_stock()
  }
}

impl EsbuildCompiler {
  fn resolve(&self, path: &Path) -> PathBuf {
    match &self.working_dir {
      Some(dir) if path.is_relative() => dir.join(path),
      _ => path.to_path_buf(),
    }
  }
}

/// Returns the expected outputs of `task` that exist on disk.
///
/// Paths are reported as the task named them; `resolve` maps them to where
/// the compiler actually wrote them.
pub async fn emitted_files(task: &CompilationTask, resolve: impl Fn(&Path) -> PathBuf) -> Vec<PathBuf> {
  let mut candidates = vec![task.outfile().to_path_buf(), map_path(task.outfile())];
  candidates.extend(task.style.side_artifacts(task.outfile()).into_iter().map(|a| a.path));

  let mut emitted = Vec::with_capacity(candidates.len());
  for path in candidates {
    if tokio::fs::try_exists(resolve(&path)).await.unwrap_or(false) {
      emitted.push(path);
    }
  }
  emitted
}
