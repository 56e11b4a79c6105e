//! Types for the build matrix.
//!
//! A matrix is an ordered list of variants. Each variant knows which of its
//! outputs are deliverables and which are incidental byproducts, so both
//! validation and reconciliation derive their file sets from the same place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::SideArtifacts;

/// Module system a variant is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
  Esm,
  Cjs,
  Iife,
}

impl ModuleFormat {
  pub const ALL: [ModuleFormat; 3] = [ModuleFormat::Esm, ModuleFormat::Cjs, ModuleFormat::Iife];

  /// Returns the value passed to `--format` and used as the file-name suffix.
  pub fn as_str(&self) -> &'static str {
    match self {
      ModuleFormat::Esm => "esm",
      ModuleFormat::Cjs => "cjs",
      ModuleFormat::Iife => "iife",
    }
  }
}

impl fmt::Display for ModuleFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ModuleFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "esm" => Ok(ModuleFormat::Esm),
      "cjs" => Ok(ModuleFormat::Cjs),
      "iife" => Ok(ModuleFormat::Iife),
      other => Err(format!("unknown module format '{other}' (expected esm, cjs or iife)")),
    }
  }
}

/// What a variant is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantRole {
  /// The script and its map are shipped; the stylesheet it drags along is not.
  Distribution,
  /// Compiled under a format-neutral name only to produce the shipped
  /// stylesheet. Its script and map duplicate the esm output.
  StyleSource,
}

/// Kind of file a compilation pass leaves in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  Script,
  ScriptMap,
  Stylesheet,
  StylesheetMap,
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ArtifactKind::Script => "script",
      ArtifactKind::ScriptMap => "script map",
      ArtifactKind::Stylesheet => "stylesheet",
      ArtifactKind::StylesheetMap => "stylesheet map",
    };
    f.write_str(s)
  }
}

/// A file path tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
  pub path: PathBuf,
  pub kind: ArtifactKind,
}

impl Artifact {
  pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
    Self {
      path: path.into(),
      kind,
    }
  }
}

/// Appends `.map` to a path without touching its extension.
pub fn map_path(path: &Path) -> PathBuf {
  let mut name = path.as_os_str().to_owned();
  name.push(".map");
  PathBuf::from(name)
}

/// One (module format, minification) output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildVariant {
  pub format: ModuleFormat,
  pub minify: bool,
  pub role: VariantRole,
  pub output_path: PathBuf,
}

impl BuildVariant {
  /// Creates a variant whose output path follows the naming rule.
  pub fn new(out_dir: &Path, base: &str, format: ModuleFormat, minify: bool, role: VariantRole) -> Self {
    Self {
      format,
      minify,
      role,
      output_path: out_dir.join(output_file_name(base, format, minify, role)),
    }
  }

  pub fn is_style_source(&self) -> bool {
    self.role == VariantRole::StyleSource
  }

  pub fn map_path(&self) -> PathBuf {
    map_path(&self.output_path)
  }

  fn script_artifacts(&self) -> Vec<Artifact> {
    vec![
      Artifact::new(&self.output_path, ArtifactKind::Script),
      Artifact::new(self.map_path(), ArtifactKind::ScriptMap),
    ]
  }

  /// Files this variant is expected to leave behind after reconciliation.
  pub fn deliverables(&self, side: &dyn SideArtifacts) -> Vec<Artifact> {
    match self.role {
      VariantRole::Distribution => self.script_artifacts(),
      VariantRole::StyleSource => side.side_artifacts(&self.output_path),
    }
  }

  /// Files this variant produces that must not survive reconciliation.
  pub fn byproducts(&self, side: &dyn SideArtifacts) -> Vec<Artifact> {
    match self.role {
      VariantRole::Distribution => side.side_artifacts(&self.output_path),
      VariantRole::StyleSource => self.script_artifacts(),
    }
  }
}

impl fmt::Display for BuildVariant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.format)?;
    if self.minify {
      f.write_str(".min")?;
    }
    if self.is_style_source() {
      f.write_str(" (style source)")?;
    }
    Ok(())
  }
}

/// `<base>[.<format>][.min].js`; the format suffix is dropped for the style source.
pub fn output_file_name(base: &str, format: ModuleFormat, minify: bool, role: VariantRole) -> String {
  let mut name = base.to_string();
  if role == VariantRole::Distribution {
    name.push('.');
    name.push_str(format.as_str());
  }
  if minify {
    name.push_str(".min");
  }
  name.push_str(".js");
  name
}

/// Matrix invariants violated before any compilation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("build matrix is empty")]
  EmptyMatrix,

  #[error("output path {0} is produced by more than one variant")]
  DuplicateOutput(PathBuf),

  #[error("build matrix has no style source variant")]
  MissingStyleSource,

  #[error("{0} is both a deliverable and a byproduct")]
  CanonicalCollision(PathBuf),

  #[error("invalid base name '{0}': must be a non-empty file name")]
  InvalidBaseName(String),
}
