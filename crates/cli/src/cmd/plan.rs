//! Implementation of the `distmatrix plan` command.
//!
//! Validates the config and prints the build matrix together with the files a
//! build keeps and the byproducts it removes. Nothing is compiled.

use std::path::Path;

use anyhow::Result;
use distmatrix_lib::pipeline::BuildPlan;

use super::load_config;
use crate::output::{Disposition, OutputFormat, print_artifact, print_info, print_json, print_stat, print_variant};

pub fn cmd_plan(config: Option<&Path>, output: OutputFormat) -> Result<()> {
  let config = load_config(config)?;
  let plan = BuildPlan::from_config(&config)?;

  if output.is_json() {
    let json_output = serde_json::json!({
      "entry_point": plan.entry_point,
      "out_dir": plan.out_dir,
      "externals": plan.externals,
      "style": {
        "pattern": plan.style.pattern(),
        "scope": plan.style.scope(),
        "format_dependent": plan.style.is_format_dependent(),
      },
      "variants": plan.matrix,
      "canonical": plan.reconcile.canonical(),
      "byproducts": plan.reconcile.byproducts(),
    });
    return print_json(&json_output);
  }

  print_info(format!("Build matrix: {} variant(s)", plan.matrix.len()));
  for variant in &plan.matrix {
    print_variant(variant, &variant.output_path, &plan.out_dir);
  }

  println!();
  println!("Keeps:");
  for path in plan.reconcile.canonical() {
    print_artifact(Disposition::Keep, path, &plan.out_dir);
  }
  println!("Removes:");
  for artifact in plan.reconcile.byproducts() {
    print_artifact(Disposition::Remove, &artifact.path, &plan.out_dir);
  }

  println!();
  print_stat("Entry", plan.entry_point.display());
  print_stat("Output", plan.out_dir.display());
  print_stat("Style pattern", plan.style.pattern());
  print_stat("Externals", plan.externals.join(", "));

  Ok(())
}
