mod build;
mod class_name;
mod clean;
mod plan;

use std::path::Path;

use anyhow::{Context, Result};

use distmatrix_lib::config::Config;

pub use build::cmd_build;
pub use class_name::cmd_class_name;
pub use clean::cmd_clean;
pub use plan::cmd_plan;

/// Shown when the configured compiler is plain esbuild, which has no css-modules plugin.
const STOCK_ESBUILD_WARNING: &str = "compiler is stock esbuild: the css-modules plugin is not loaded, so class names \
   will not follow the configured pattern. Point [compiler].program or DISTMATRIX_ESBUILD at a wrapper that runs it.";

/// Loads `explicit`, or discovers the config from the current directory.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  Config::discover(explicit, &cwd).context("Failed to load config")
}
