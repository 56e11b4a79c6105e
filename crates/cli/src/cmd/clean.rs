//! Implementation of the `distmatrix clean` command.
//!
//! Runs reconciliation on its own: removes every byproduct the matrix
//! declares from the output directory and leaves deliverables and unrelated
//! files alone.

use std::path::Path;

use anyhow::Result;

use distmatrix_lib::pipeline::BuildPlan;
use distmatrix_lib::reconcile::reconcile;

use super::load_config;
use crate::output::{Disposition, print_artifact, print_info, print_success};

pub fn cmd_clean(config: Option<&Path>) -> Result<()> {
  let config = load_config(config)?;
  let plan = BuildPlan::from_config(&config)?;

  let removed = reconcile(&plan.out_dir, &plan.matrix, plan.style.as_ref());

  if removed.is_empty() {
    print_info("Nothing to clean");
    return Ok(());
  }

  print_success(format!("Removed {} byproduct(s)", removed.len()));
  for file in &removed {
    print_artifact(Disposition::Remove, &file.path, &plan.out_dir);
  }

  Ok(())
}
