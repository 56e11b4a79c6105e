//! Build matrix definition.
//!
//! The matrix is the cross-product of every module format with both
//! minification levels, followed by an esm style source per minification
//! level. Style sources exist only to emit the stylesheet under a
//! format-neutral name (`<base>.css`, `<base>.min.css`).

mod types;

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::style::SideArtifacts;

pub use types::{
  Artifact, ArtifactKind, BuildVariant, ConfigError, ModuleFormat, VariantRole, map_path, output_file_name,
};

/// Minification levels, non-minified first.
pub const MINIFY_LEVELS: [bool; 2] = [false, true];

/// Ordered sequence of variants. Order only affects task submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildMatrix {
  variants: Vec<BuildVariant>,
}

impl BuildMatrix {
  pub fn new(variants: Vec<BuildVariant>) -> Self {
    Self { variants }
  }

  pub fn variants(&self) -> &[BuildVariant] {
    &self.variants
  }

  pub fn iter(&self) -> std::slice::Iter<'_, BuildVariant> {
    self.variants.iter()
  }

  pub fn len(&self) -> usize {
    self.variants.len()
  }

  pub fn is_empty(&self) -> bool {
    self.variants.is_empty()
  }

  /// Variants whose stylesheets are kept.
  pub fn style_sources(&self) -> impl Iterator<Item = &BuildVariant> {
    self.variants.iter().filter(|v| v.is_style_source())
  }

  /// Paths that must survive reconciliation.
  pub fn canonical_paths(&self, side: &dyn SideArtifacts) -> BTreeSet<PathBuf> {
    self
      .variants
      .iter()
      .flat_map(|v| v.deliverables(side))
      .map(|a| a.path)
      .collect()
  }

  /// Checks the invariants dispatch relies on.
  ///
  /// Fails on an empty matrix, a repeated output path, a matrix without a
  /// style source, or a byproduct that shares a path with a deliverable.
  pub fn validate(&self, side: &dyn SideArtifacts) -> Result<(), ConfigError> {
    if self.variants.is_empty() {
      return Err(ConfigError::EmptyMatrix);
    }

    let mut seen = HashSet::new();
    for variant in &self.variants {
      if !seen.insert(&variant.output_path) {
        return Err(ConfigError::DuplicateOutput(variant.output_path.clone()));
      }
    }

    if self.style_sources().next().is_none() {
      return Err(ConfigError::MissingStyleSource);
    }

    let canonical = self.canonical_paths(side);
    for variant in &self.variants {
      if let Some(hit) = variant.byproducts(side).into_iter().find(|a| canonical.contains(&a.path)) {
        return Err(ConfigError::CanonicalCollision(hit.path));
      }
    }

    debug!(variants = self.variants.len(), "build matrix validated");
    Ok(())
  }
}

impl<'a> IntoIterator for &'a BuildMatrix {
  type Item = &'a BuildVariant;
  type IntoIter = std::slice::Iter<'a, BuildVariant>;

  fn into_iter(self) -> Self::IntoIter {
    self.variants.iter()
  }
}

/// Defines the full matrix for `base` inside `out_dir`.
///
/// Variants come out format-major (esm, esm.min, cjs, cjs.min, iife,
/// iife.min) with the two esm style sources (`<base>.js`, `<base>.min.js`)
/// last.
pub fn define_matrix(out_dir: &Path, base: &str) -> BuildMatrix {
  let mut variants = Vec::with_capacity((ModuleFormat::ALL.len() + 1) * MINIFY_LEVELS.len());

  for format in ModuleFormat::ALL {
    for minify in MINIFY_LEVELS {
      variants.push(BuildVariant::new(out_dir, base, format, minify, VariantRole::Distribution));
    }
  }

  for minify in MINIFY_LEVELS {
    variants.push(BuildVariant::new(
      out_dir,
      base,
      ModuleFormat::Esm,
      minify,
      VariantRole::StyleSource,
    ));
  }

  BuildMatrix::new(variants)
}

/// Checks that `base` can be used as a file-name stem.
pub fn validate_base_name(base: &str) -> Result<(), ConfigError> {
  let valid = !base.is_empty()
    && base != "."
    && base != ".."
    && !base.contains(['/', '\\'])
    && !base.chars().any(char::is_whitespace);
  if valid {
    Ok(())
  } else {
    Err(ConfigError::InvalidBaseName(base.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::style::StyleTransformAdapter;

  fn adapter() -> StyleTransformAdapter {
    StyleTransformAdapter::new("lib__[local]_[hash]").unwrap()
  }

  fn names(matrix: &BuildMatrix) -> Vec<String> {
    matrix
      .iter()
      .map(|v| v.output_path.file_name().unwrap().to_string_lossy().into_owned())
      .collect()
  }

  #[test]
  fn matrix_is_cross_product_plus_style_sources() {
    let matrix = define_matrix(Path::new("dist"), "lib");
    assert_eq!(matrix.len(), (ModuleFormat::ALL.len() + 1) * MINIFY_LEVELS.len());

    let unique: HashSet<_> = matrix.iter().map(|v| &v.output_path).collect();
    assert_eq!(unique.len(), matrix.len());
  }

  #[test]
  fn matrix_naming_rule() {
    let matrix = define_matrix(Path::new("dist"), "lib");
    assert_eq!(
      names(&matrix),
      vec![
        "lib.esm.js",
        "lib.esm.min.js",
        "lib.cjs.js",
        "lib.cjs.min.js",
        "lib.iife.js",
        "lib.iife.min.js",
        "lib.js",
        "lib.min.js",
      ]
    );
    assert!(matrix.iter().all(|v| v.output_path.starts_with("dist")));
  }

  #[test]
  fn style_sources_are_esm_at_both_minify_levels() {
    let matrix = define_matrix(Path::new("dist"), "lib");
    let sources: Vec<_> = matrix.style_sources().collect();
    assert_eq!(sources.len(), 2);
    assert!(sources.iter().all(|s| s.format == ModuleFormat::Esm));
    assert_eq!(sources[0].output_path, PathBuf::from("dist/lib.js"));
    assert_eq!(sources[1].output_path, PathBuf::from("dist/lib.min.js"));
    assert!(sources[1].minify);
  }

  #[test]
  fn default_matrix_validates() {
    let matrix = define_matrix(Path::new("dist"), "lib");
    assert_eq!(matrix.validate(&adapter()), Ok(()));
  }

  #[test]
  fn canonical_paths_keep_format_neutral_stylesheets() {
    let matrix = define_matrix(Path::new("dist"), "lib");
    let canonical = matrix.canonical_paths(&adapter());

    let stylesheets: Vec<_> = canonical
      .iter()
      .filter(|p| p.to_string_lossy().ends_with(".css"))
      .collect();
    assert_eq!(
      stylesheets,
      vec![&PathBuf::from("dist/lib.css"), &PathBuf::from("dist/lib.min.css")]
    );
    assert!(canonical.contains(&PathBuf::from("dist/lib.css.map")));
    assert!(canonical.contains(&PathBuf::from("dist/lib.min.css.map")));
    assert!(!canonical.contains(&PathBuf::from("dist/lib.js")));
    assert!(!canonical.contains(&PathBuf::from("dist/lib.min.js")));
    assert_eq!(canonical.len(), 6 * 2 + 2 * 2);
  }

  #[test]
  fn empty_matrix_rejected() {
    let matrix = BuildMatrix::new(vec![]);
    assert_eq!(matrix.validate(&adapter()), Err(ConfigError::EmptyMatrix));
  }

  #[test]
  fn duplicate_output_rejected() {
    let dir = Path::new("dist");
    let variant = BuildVariant::new(dir, "lib", ModuleFormat::Cjs, false, VariantRole::Distribution);
    let matrix = BuildMatrix::new(vec![
      variant.clone(),
      variant,
      BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource),
    ]);
    assert_eq!(
      matrix.validate(&adapter()),
      Err(ConfigError::DuplicateOutput(PathBuf::from("dist/lib.cjs.js")))
    );
  }

  #[test]
  fn missing_style_source_rejected() {
    let dir = Path::new("dist");
    let matrix = BuildMatrix::new(vec![BuildVariant::new(
      dir,
      "lib",
      ModuleFormat::Esm,
      false,
      VariantRole::Distribution,
    )]);
    assert_eq!(matrix.validate(&adapter()), Err(ConfigError::MissingStyleSource));
  }

  #[test]
  fn several_style_sources_accepted() {
    let dir = Path::new("dist");
    let matrix = BuildMatrix::new(vec![
      BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource),
      BuildVariant::new(dir, "lib", ModuleFormat::Esm, true, VariantRole::StyleSource),
    ]);
    assert_eq!(matrix.validate(&adapter()), Ok(()));
    assert_eq!(matrix.style_sources().count(), 2);
  }

  #[test]
  fn collision_between_deliverable_and_byproduct_rejected() {
    // A hand-built style source named like the esm distribution script:
    // its incidental script is the esm deliverable.
    let dir = Path::new("dist");
    let esm = BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::Distribution);
    let clash = BuildVariant {
      format: ModuleFormat::Cjs,
      minify: false,
      role: VariantRole::StyleSource,
      output_path: esm.output_path.clone(),
    };
    let matrix = BuildMatrix::new(vec![esm, clash]);
    assert!(matches!(
      matrix.validate(&adapter()),
      Err(ConfigError::DuplicateOutput(_)) | Err(ConfigError::CanonicalCollision(_))
    ));
  }

  #[test]
  fn collision_without_duplicate_output_rejected() {
    // Style source at lib.esm.mjs maps its stylesheet onto lib.esm.css, which
    // is also the esm distribution byproduct.
    let dir = Path::new("dist");
    let esm = BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::Distribution);
    let source = BuildVariant {
      format: ModuleFormat::Esm,
      minify: false,
      role: VariantRole::StyleSource,
      output_path: dir.join("lib.esm.mjs"),
    };
    let matrix = BuildMatrix::new(vec![esm, source]);
    assert_eq!(
      matrix.validate(&adapter()),
      Err(ConfigError::CanonicalCollision(PathBuf::from("dist/lib.esm.css")))
    );
  }

  #[test]
  fn base_name_validation() {
    assert!(validate_base_name("react-tooltip").is_ok());
    assert!(validate_base_name("").is_err());
    assert!(validate_base_name("..").is_err());
    assert!(validate_base_name("a/b").is_err());
    assert!(validate_base_name("my lib").is_err());
  }

  #[test]
  fn variant_display() {
    let dir = Path::new("dist");
    let min = BuildVariant::new(dir, "lib", ModuleFormat::Iife, true, VariantRole::Distribution);
    let source = BuildVariant::new(dir, "lib", ModuleFormat::Esm, false, VariantRole::StyleSource);
    assert_eq!(min.to_string(), "iife.min");
    assert_eq!(source.to_string(), "esm (style source)");
  }

  #[test]
  fn module_format_parse() {
    assert_eq!("ESM".parse::<ModuleFormat>(), Ok(ModuleFormat::Esm));
    assert_eq!("iife".parse::<ModuleFormat>(), Ok(ModuleFormat::Iife));
    assert!("umd".parse::<ModuleFormat>().is_err());
  }

  #[test]
  fn variant_serializes_with_lowercase_tags() {
    let source = BuildVariant::new(Path::new("dist"), "lib", ModuleFormat::Esm, false, VariantRole::StyleSource);
    let json = serde_json::to_value(&source).unwrap();
    assert_eq!(json["format"], "esm");
    assert_eq!(json["role"], "style_source");
    assert_eq!(json["output_path"], "dist/lib.js");
  }

  #[test]
  fn map_path_appends_suffix() {
    assert_eq!(
      map_path(Path::new("dist/lib.esm.min.js")),
      PathBuf::from("dist/lib.esm.min.js.map")
    );
  }
}
