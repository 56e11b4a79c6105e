//! Implementation of the `distmatrix build` command.
//!
//! Compiles every variant of the matrix concurrently, reconciles the output
//! directory and prints a summary. Exits non-zero naming every variant that
//! failed; the surviving variants' artifacts are still in place.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use distmatrix_lib::BuildError;
use distmatrix_lib::compile::EsbuildCompiler;
use distmatrix_lib::pipeline::build;

use super::load_config;
use crate::output::{
  Disposition, OutputFormat, format_elapsed, print_artifact, print_error, print_json, print_stat, print_success,
  print_warning, relative_to,
};

pub fn cmd_build(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let out_dir = config.out_dir_path();
  let compiler = Arc::new(EsbuildCompiler::new(config.compiler.program.clone()).with_working_dir(config.root.clone()));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = match rt.block_on(build(&config, compiler)) {
    Ok(report) => report,
    Err(BuildError::BuildFailed { variants, messages }) => {
      for message in &messages {
        print_error(message);
      }
      bail!("build failed for {}", variants.join(", "));
    }
    Err(e) => return Err(e.into()),
  };

  if output.is_json() {
    let variants: Vec<_> = report
      .results
      .iter()
      .map(|r| {
        serde_json::json!({
          "variant": r.variant.to_string(),
          "output": r.variant.output_path,
          "emitted": r.emitted_files,
          "elapsed_ms": r.elapsed.as_millis() as u64,
        })
      })
      .collect();
    let json_output = serde_json::json!({
      "out_dir": out_dir,
      "variants": variants,
      "removed": report.removed,
      "artifacts": report.artifacts,
      "pattern_ignored": report.pattern_ignored,
      "elapsed_ms": report.elapsed.as_millis() as u64,
    });
    print_json(&json_output)?;
    return Ok(());
  }

  print_success("Build complete!");
  for path in &report.artifacts.present {
    print_artifact(Disposition::Keep, path, &out_dir);
  }
  println!();
  print_stat("Output", out_dir.display());
  print_stat("Variants", report.results.len());
  print_stat("Byproducts removed", report.removed.len());
  print_stat("Duration", format_elapsed(report.elapsed));

  if report.pattern_ignored {
    print_warning(super::STOCK_ESBUILD_WARNING);
  }
  for path in &report.artifacts.missing {
    print_warning(format!("expected artifact missing: {}", relative_to(path, &out_dir)));
  }
  for path in &report.artifacts.leftover {
    print_warning(format!("byproduct could not be removed: {}", relative_to(path, &out_dir)));
  }

  Ok(())
}
