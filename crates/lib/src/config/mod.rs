//! Project configuration.
//!
//! Read from `distmatrix.toml`. Every field has a default, so an empty file
//! (or no file at all) describes the stock react-tooltip build:
//!
//! ```toml
//! entry = "./src/index.tsx"
//! out_dir = "dist"
//! base_name = "react-tooltip"
//! externals = ["react", "react-dom", "prop-types"]
//!
//! [style]
//! pattern = "react-tooltip__[local]_[hash]"
//! scope = "local"
//!
//! [compiler]
//! program = "esbuild"
//! ```
//!
//! Relative paths resolve against the directory holding the file. That
//! directory is made absolute on load, so resolved paths do not depend on the
//! process working directory.
//!
//! The `[style]` pattern reaches the compiler through `DISTMATRIX_CSS_PATTERN`
//! and `DISTMATRIX_CSS_SCOPE`. Stock esbuild reads neither and names local
//! classes itself, so a locally scoped build needs `compiler.program` to point
//! at a wrapper that runs the css-modules plugin with those variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILE_NAME, DEFAULT_BASE_NAME, DEFAULT_COMPILER, DEFAULT_ENTRY, DEFAULT_EXTERNALS, DEFAULT_OUT_DIR,
  DEFAULT_STYLE_PATTERN, ENV_ESBUILD,
};
use crate::matrix::{BuildMatrix, ConfigError, define_matrix, validate_base_name};
use crate::style::{ScopeMode, StyleError, StyleTransformAdapter};

#[derive(Debug, Error)]
pub enum ConfigFileError {
  #[error("failed to read config {}: {source}", .path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config {}: {message}", .path.display())]
  Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
  pub pattern: String,
  pub scope: ScopeMode,
}

impl Default for StyleConfig {
  fn default() -> Self {
    Self {
      pattern: DEFAULT_STYLE_PATTERN.to_string(),
      scope: ScopeMode::Local,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
  /// esbuild executable, or a wrapper accepting the same arguments.
  pub program: String,
}

impl Default for CompilerConfig {
  fn default() -> Self {
    Self {
      program: DEFAULT_COMPILER.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub entry: PathBuf,
  pub out_dir: PathBuf,
  pub base_name: String,
  pub externals: Vec<String>,
  pub style: StyleConfig,
  pub compiler: CompilerConfig,

  /// Directory relative paths resolve against.
  #[serde(skip)]
  pub root: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      entry: PathBuf::from(DEFAULT_ENTRY),
      out_dir: PathBuf::from(DEFAULT_OUT_DIR),
      base_name: DEFAULT_BASE_NAME.to_string(),
      externals: DEFAULT_EXTERNALS.iter().map(|s| s.to_string()).collect(),
      style: StyleConfig::default(),
      compiler: CompilerConfig::default(),
      root: PathBuf::from("."),
    }
  }
}

impl Config {
  /// Parses `content` as if it were read from a file in `root`.
  pub fn from_toml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self, toml::de::Error> {
    let mut config: Config = toml::from_str(content)?;
    config.root = root.into();
    Ok(config)
  }

  /// Reads and parses the config file at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let parent = path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));
    let root = std::path::absolute(parent).map_err(|source| ConfigFileError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let config = Self::from_toml_str(&content, root).map_err(|e| ConfigFileError::Parse {
      path: path.to_path_buf(),
      message: e.message().to_string(),
    })?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Loads `explicit` if given, else `distmatrix.toml` in `dir` if present,
  /// else the defaults rooted at `dir`. Environment overrides apply last.
  pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigFileError> {
    let mut config = match explicit {
      Some(path) => Self::load(path)?,
      None => {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
          Self::load(&candidate)?
        } else {
          debug!(dir = %dir.display(), "no config file, using defaults");
          let root = std::path::absolute(dir).map_err(|source| ConfigFileError::Read {
            path: candidate.clone(),
            source,
          })?;
          Self {
            root,
            ..Self::default()
          }
        }
      }
    };
    config.apply_env_overrides();
    Ok(config)
  }

  pub fn apply_env_overrides(&mut self) {
    if let Ok(program) = std::env::var(ENV_ESBUILD)
      && !program.is_empty()
    {
      debug!(program = %program, "compiler overridden from environment");
      self.compiler.program = program;
    }
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  pub fn entry_path(&self) -> PathBuf {
    self.resolve(&self.entry)
  }

  pub fn out_dir_path(&self) -> PathBuf {
    self.resolve(&self.out_dir)
  }

  pub fn style_adapter(&self) -> Result<StyleTransformAdapter, StyleError> {
    Ok(StyleTransformAdapter::new(&self.style.pattern)?.with_scope(self.style.scope))
  }

  /// The full matrix rooted at the resolved output directory.
  pub fn matrix(&self) -> Result<BuildMatrix, ConfigError> {
    validate_base_name(&self.base_name)?;
    Ok(define_matrix(&self.out_dir_path(), &self.base_name))
  }
}
