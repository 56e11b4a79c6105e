//! Scoped-stylesheet adapter shared by every compilation pass.
//!
//! The adapter carries the fixed css-modules configuration (class-name pattern
//! and scoping mode) and hands it to the compiler the same way for every pass.
//! Attaching it has a side effect: each pass also writes a stylesheet and a
//! stylesheet map next to its script. That relationship is declared through
//! [`SideArtifacts`] so reconciliation never has to guess file names.

pub mod pattern;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::{ENV_CSS_PATTERN, ENV_CSS_SCOPE, HASH_TOKEN_LEN};
use crate::matrix::{Artifact, ArtifactKind, ModuleFormat, map_path};

pub use pattern::{StyleError, StylePattern, Token};

/// Files a plugin makes the compiler emit next to an output script.
pub trait SideArtifacts: Send + Sync {
  /// Returns the side artifacts a pass writing `output_path` leaves behind.
  fn side_artifacts(&self, output_path: &Path) -> Vec<Artifact>;
}

/// How class names in `.module.css` files are scoped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
  /// Rewrite every class name with the pattern.
  #[default]
  Local,
  /// Keep class names as written.
  Global,
}

impl ScopeMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ScopeMode::Local => "local",
      ScopeMode::Global => "global",
    }
  }

  fn loader(&self) -> &'static str {
    match self {
      ScopeMode::Local => "local-css",
      ScopeMode::Global => "global-css",
    }
  }
}

impl fmt::Display for ScopeMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTransformAdapter {
  pattern: StylePattern,
  scope: ScopeMode,
}

impl StyleTransformAdapter {
  /// Creates a locally scoped adapter for `pattern`.
  pub fn new(pattern: &str) -> Result<Self, StyleError> {
    Ok(Self {
      pattern: StylePattern::parse(pattern)?,
      scope: ScopeMode::Local,
    })
  }

  pub fn with_scope(mut self, scope: ScopeMode) -> Self {
    self.scope = scope;
    self
  }

  pub fn pattern(&self) -> &str {
    self.pattern.as_str()
  }

  pub fn scope(&self) -> ScopeMode {
    self.scope
  }

  /// Whether the same local name can differ between formats.
  ///
  /// Only `[format]` makes names format-dependent; `[hash]` is derived from
  /// the source path and local name alone.
  pub fn is_format_dependent(&self) -> bool {
    self.scope == ScopeMode::Local && self.pattern.uses(&Token::Format)
  }

  /// Whether class names depend on the css-modules plugin.
  ///
  /// Global scope keeps names unchanged, which stock esbuild does as well.
  pub fn requires_plugin(&self) -> bool {
    self.scope == ScopeMode::Local
  }

  /// Returns the scoped class name for `local` declared in `source`.
  pub fn class_name(&self, local: &str, source: &Path, format: ModuleFormat) -> String {
    if self.scope == ScopeMode::Global {
      return local.to_string();
    }

    let mut out = String::new();
    for token in self.pattern.tokens() {
      match token {
        Token::Literal(text) => out.push_str(text),
        Token::Local => out.push_str(local),
        Token::Hash => out.push_str(&hash_token(source, local)),
        Token::Name => out.push_str(&source_stem(source)),
        Token::Format => out.push_str(format.as_str()),
      }
    }
    out
  }

  /// Arguments attaching the stylesheet transform to an esbuild invocation.
  pub fn compiler_args(&self) -> Vec<String> {
    vec![format!("--loader:.module.css={}", self.scope.loader())]
  }

  /// Environment for wrapper builds that run the css-modules plugin.
  pub fn compiler_env(&self) -> Vec<(&'static str, String)> {
    vec![
      (ENV_CSS_PATTERN, self.pattern.as_str().to_string()),
      (ENV_CSS_SCOPE, self.scope.as_str().to_string()),
    ]
  }
}

impl SideArtifacts for StyleTransformAdapter {
  fn side_artifacts(&self, output_path: &Path) -> Vec<Artifact> {
    let stylesheet = output_path.with_extension("css");
    let stylesheet_map = map_path(&stylesheet);
    vec![
      Artifact::new(stylesheet, ArtifactKind::Stylesheet),
      Artifact::new(stylesheet_map, ArtifactKind::StylesheetMap),
    ]
  }
}

/// First `HASH_TOKEN_LEN` hex characters of SHA-256 over `<source>:<local>`.
fn hash_token(source: &Path, local: &str) -> String {
  // Normalise separators so Windows and Unix builds agree.
  let source = source.to_string_lossy().replace('\\', "/");
  let mut hasher = Sha256::new();
  hasher.update(source.as_bytes());
  hasher.update(b":");
  hasher.update(local.as_bytes());
  let digest = hex::encode(hasher.finalize());
  digest[..HASH_TOKEN_LEN].to_string()
}

fn source_stem(source: &Path) -> String {
  let stem = source.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
  // `Button.module.css` has stem `Button.module`; the pattern wants `Button`.
  stem.split('.').next().unwrap_or_default().to_string()
}
