//! Implementation of the `distmatrix class-name` command.

use std::path::Path;

use anyhow::Result;

use distmatrix_lib::compile::{Compiler, EsbuildCompiler};
use distmatrix_lib::matrix::ModuleFormat;

use super::{STOCK_ESBUILD_WARNING, load_config};
use crate::output::print_warning;

/// Prints the scoped name `local` gets under the configured pattern.
pub fn cmd_class_name(local: &str, source: &Path, format: ModuleFormat, config: Option<&Path>) -> Result<()> {
  let config = load_config(config)?;
  let adapter = config.style_adapter()?;
  if adapter.requires_plugin() && !EsbuildCompiler::new(config.compiler.program.clone()).applies_class_pattern() {
    print_warning(STOCK_ESBUILD_WARNING);
  }

  println!("{}", adapter.class_name(local, source, format));

  Ok(())
}
