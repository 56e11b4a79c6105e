//! End-to-end pipeline tests against a deterministic stand-in compiler.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use distmatrix_lib::compile::{CompilationTask, CompileError, Compiler};
use distmatrix_lib::config::Config;
use distmatrix_lib::dispatch::dispatch;
use distmatrix_lib::matrix::{ArtifactKind, BuildMatrix, BuildVariant, ModuleFormat, VariantRole, map_path};
use distmatrix_lib::pipeline::{BuildPlan, build, run};
use distmatrix_lib::reconcile::reconcile;
use distmatrix_lib::style::{SideArtifacts, StyleTransformAdapter};

const STYLE_SOURCE: &str = "src/Tooltip.module.css";
const LOCALS: &[&str] = &["tooltip", "arrow", "dark"];

/// Writes the script, its map, and the adapter's side artifacts.
struct DeterministicCompiler;

#[async_trait]
impl Compiler for DeterministicCompiler {
  async fn compile(&self, task: &CompilationTask) -> Result<Vec<PathBuf>, CompileError> {
    let format = task.variant.format;
    let mut written = Vec::new();

    let script = format!(
      "/* {} */ import React from \"react\"; export const X = () => null;\n",
      task.variant
    );
    fs::write(task.outfile(), script).unwrap();
    written.push(task.outfile().to_path_buf());
    fs::write(map_path(task.outfile()), "{\"version\":3,\"sources\":[]}").unwrap();
    written.push(map_path(task.outfile()));

    for artifact in task.style.side_artifacts(task.outfile()) {
      let body = if artifact.kind == ArtifactKind::Stylesheet {
        LOCALS
          .iter()
          .map(|l| format!(".{}{{}}\n", task.style.class_name(l, Path::new(STYLE_SOURCE), format)))
          .collect()
      } else {
        "{\"version\":3}".to_string()
      };
      fs::write(&artifact.path, body).unwrap();
      written.push(artifact.path);
    }

    Ok(written)
  }
}

fn project(base: &str) -> (TempDir, Config) {
  let temp = TempDir::new().unwrap();
  fs::create_dir_all(temp.path().join("src")).unwrap();
  fs::write(temp.path().join("src/index.tsx"), "export const X = () => null;\n").unwrap();
  let config = Config {
    root: temp.path().to_path_buf(),
    base_name: base.to_string(),
    ..Config::default()
  };
  (temp, config)
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
  fs::read_dir(dir)
    .unwrap()
    .flatten()
    .map(|e| (e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap()))
    .collect()
}

fn class_names(stylesheet: &Path) -> Vec<String> {
  fs::read_to_string(stylesheet)
    .unwrap()
    .lines()
    .map(|l| l.trim_start_matches('.').trim_end_matches("{}").to_string())
    .collect()
}

#[tokio::test]
async fn full_build_delivers_documented_artifact_set() {
  let (temp, config) = project("react-tooltip");

  let report = build(&config, Arc::new(DeterministicCompiler)).await.unwrap();

  let files: Vec<_> = snapshot(&temp.path().join("dist")).into_keys().collect();
  assert_eq!(
    files,
    vec![
      "react-tooltip.cjs.js",
      "react-tooltip.cjs.js.map",
      "react-tooltip.cjs.min.js",
      "react-tooltip.cjs.min.js.map",
      "react-tooltip.css",
      "react-tooltip.css.map",
      "react-tooltip.esm.js",
      "react-tooltip.esm.js.map",
      "react-tooltip.esm.min.js",
      "react-tooltip.esm.min.js.map",
      "react-tooltip.iife.js",
      "react-tooltip.iife.js.map",
      "react-tooltip.iife.min.js",
      "react-tooltip.iife.min.js.map",
      "react-tooltip.min.css",
      "react-tooltip.min.css.map",
    ]
  );
  assert!(report.artifacts.is_complete());
  assert!(report.results.iter().all(|r| r.success()));
}

#[tokio::test]
async fn two_runs_produce_identical_artifacts() {
  let (temp, config) = project("lib");
  let dist = temp.path().join("dist");

  build(&config, Arc::new(DeterministicCompiler)).await.unwrap();
  let first = snapshot(&dist);

  fs::remove_dir_all(&dist).unwrap();
  build(&config, Arc::new(DeterministicCompiler)).await.unwrap();
  let second = snapshot(&dist);

  assert_eq!(first, second);
}

#[tokio::test]
async fn rerun_over_existing_output_is_stable() {
  let (temp, config) = project("lib");
  let dist = temp.path().join("dist");

  build(&config, Arc::new(DeterministicCompiler)).await.unwrap();
  let first = snapshot(&dist);
  let report = build(&config, Arc::new(DeterministicCompiler)).await.unwrap();

  assert_eq!(snapshot(&dist), first);
  assert!(report.artifacts.is_complete());
}

#[tokio::test]
async fn esm_only_matrix_keeps_format_neutral_stylesheet() {
  let temp = TempDir::new().unwrap();
  let dir = temp.path();
  let matrix = BuildMatrix::new(vec![
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, true, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource),
  ]);
  let style = Arc::new(StyleTransformAdapter::new("lib__[local]_[hash]").unwrap());
  matrix.validate(style.as_ref()).unwrap();

  let result = dispatch(
    &matrix,
    Path::new("src/index.tsx"),
    &["react".to_string()],
    style.clone(),
    Arc::new(DeterministicCompiler),
  )
  .await;
  assert!(result.is_success());
  reconcile(dir, &matrix, style.as_ref());

  let files = snapshot(dir);
  for name in [
    "lib.esm.js",
    "lib.esm.js.map",
    "lib.esm.min.js",
    "lib.esm.min.js.map",
    "lib.css",
    "lib.css.map",
  ] {
    assert!(files.contains_key(name), "{name} missing");
  }
  assert!(!files.contains_key("lib.esm.css"));
  assert!(!files.contains_key("lib.esm.min.css"));
}

#[tokio::test]
async fn class_names_match_across_formats_before_sweep() {
  let temp = TempDir::new().unwrap();
  let dir = temp.path();
  let matrix = BuildMatrix::new(vec![
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Cjs, false, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource),
  ]);
  let style = Arc::new(StyleTransformAdapter::new("react-tooltip__[local]_[hash]").unwrap());

  dispatch(&matrix, Path::new("src/index.tsx"), &[], style.clone(), Arc::new(DeterministicCompiler)).await;

  let esm = class_names(&dir.join("lib.esm.css"));
  let cjs = class_names(&dir.join("lib.cjs.css"));
  assert_eq!(esm, cjs);
  assert_eq!(esm.len(), LOCALS.len());
  assert!(esm[0].starts_with("react-tooltip__tooltip_"));
}

#[tokio::test]
async fn format_token_makes_class_names_differ() {
  let temp = TempDir::new().unwrap();
  let dir = temp.path();
  let matrix = BuildMatrix::new(vec![
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Cjs, false, VariantRole::Distribution),
    BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource),
  ]);
  let style = Arc::new(StyleTransformAdapter::new("[local]_[format]").unwrap());

  dispatch(&matrix, Path::new("src/index.tsx"), &[], style.clone(), Arc::new(DeterministicCompiler)).await;

  assert_ne!(class_names(&dir.join("lib.esm.css")), class_names(&dir.join("lib.cjs.css")));
}

#[tokio::test]
async fn stray_byproducts_from_earlier_runs_are_removed() {
  let (temp, config) = project("lib");
  let dist = temp.path().join("dist");
  fs::create_dir_all(&dist).unwrap();
  fs::write(dist.join("lib.cjs.min.css"), ".old{}").unwrap();
  fs::write(dist.join("lib.js.map"), "{}").unwrap();
  fs::write(dist.join("notes.txt"), "keep me").unwrap();

  let plan = BuildPlan::from_config(&config).unwrap();
  let removed = plan.reconcile.sweep(&plan.out_dir);

  assert_eq!(removed.len(), 2);
  assert!(!dist.join("lib.cjs.min.css").exists());
  assert!(!dist.join("lib.js.map").exists());
  assert!(dist.join("notes.txt").exists());

  let report = run(&plan, Arc::new(DeterministicCompiler)).await.unwrap();
  assert!(report.artifacts.is_complete());
  assert!(dist.join("notes.txt").exists());
}
