//! Test utilities for distmatrix-lib.
//!
//! [`StubCompiler`] stands in for esbuild: it writes the script, the script
//! map and the stylesheet side artifacts the attached adapter declares, using
//! the adapter to scope a fixed set of class names.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::compile::esbuild::emitted_files;
use crate::compile::{CompilationTask, CompileError, Compiler};
use crate::matrix::{ArtifactKind, map_path};
use crate::style::SideArtifacts;

/// Class names every stub stylesheet declares.
pub const LOCAL_CLASSES: &[&str] = &["tooltip", "arrow", "show"];

/// Source stylesheet the stub pretends to have compiled.
pub const STYLE_SOURCE: &str = "src/components/Tooltip/styles.module.css";

#[derive(Debug, Default)]
pub struct StubCompiler {
  fail: HashSet<String>,
  panic: HashSet<String>,
  delay: Option<Duration>,
  stock: bool,
  calls: AtomicUsize,
}

impl StubCompiler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fails the pass whose output file is named `file_name`.
  pub fn failing(mut self, file_name: &str) -> Self {
    self.fail.insert(file_name.to_string());
    self
  }

  /// Panics inside the pass whose output file is named `file_name`.
  pub fn panicking(mut self, file_name: &str) -> Self {
    self.panic.insert(file_name.to_string());
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Reports that class names are not taken from the adapter's pattern.
  pub fn stock(mut self) -> Self {
    self.stock = true;
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

fn file_name(path: &Path) -> String {
  path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

#[async_trait]
impl Compiler for StubCompiler {
  async fn compile(&self, task: &CompilationTask) -> Result<Vec<PathBuf>, CompileError> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    let name = file_name(task.outfile());
    if self.panic.contains(&name) {
      panic!("stub compiler panicked on {name}");
    }
    if self.fail.contains(&name) {
      return Err(CompileError::Exited {
        code: Some(1),
        stderr: format!("{}: ERROR: Expected \";\" but found \"}}\"", task.entry_point.display()),
      });
    }

    let format = task.variant.format;
    let script = format!("// {format} minify={}\nexport const X = 1;\n", task.variant.minify);
    tokio::fs::write(task.outfile(), script).await.map_err(io_error)?;
    tokio::fs::write(map_path(task.outfile()), "{\"version\":3}\n")
      .await
      .map_err(io_error)?;

    for artifact in task.style.side_artifacts(task.outfile()) {
      let content = match artifact.kind {
        ArtifactKind::Stylesheet => LOCAL_CLASSES
          .iter()
          .map(|local| format!(".{} {{}}\n", task.style.class_name(local, Path::new(STYLE_SOURCE), format)))
          .collect::<String>(),
        _ => "{\"version\":3}\n".to_string(),
      };
      tokio::fs::write(&artifact.path, content).await.map_err(io_error)?;
    }

    Ok(emitted_files(task, Path::to_path_buf).await)
  }

  fn applies_class_pattern(&self) -> bool {
    !self.stock
  }
}

fn io_error(e: std::io::Error) -> CompileError {
  CompileError::Exited {
    code: None,
    stderr: e.to_string(),
  }
}
