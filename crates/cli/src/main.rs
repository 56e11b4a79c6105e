mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use distmatrix_lib::matrix::ModuleFormat;

use crate::output::OutputFormat;

/// distmatrix - build one component entry into every distributable format
#[derive(Parser)]
#[command(name = "distmatrix")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile every variant and reconcile the output directory
  Build {
    /// Path to the config file (default: ./distmatrix.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show the build matrix and the files each run keeps and removes
  Plan {
    /// Path to the config file (default: ./distmatrix.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
  },

  /// Remove stray byproducts from the output directory without compiling
  Clean {
    /// Path to the config file (default: ./distmatrix.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },

  /// Preview the scoped class name for a local CSS class
  ClassName {
    /// Local class name as written in the stylesheet
    local: String,

    /// Stylesheet the class is declared in
    #[arg(short, long, default_value = "src/styles.module.css")]
    source: PathBuf,

    /// Module format the name is generated for
    #[arg(short, long, default_value = "esm")]
    format: ModuleFormat,

    /// Path to the config file (default: ./distmatrix.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn output_format(json: bool) -> OutputFormat {
  if json { OutputFormat::Json } else { OutputFormat::Text }
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Commands::Build { config, json } => cmd::cmd_build(config.as_deref(), output_format(json)),
    Commands::Plan { config, json } => cmd::cmd_plan(config.as_deref(), output_format(json)),
    Commands::Clean { config } => cmd::cmd_clean(config.as_deref()),
    Commands::ClassName {
      local,
      source,
      format,
      config,
    } => cmd::cmd_class_name(&local, &source, format, config.as_deref()),
  }
}
