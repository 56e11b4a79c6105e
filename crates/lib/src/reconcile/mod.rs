//! Artifact reconciliation.
//!
//! Every compilation pass drags a stylesheet along, and the style source pass
//! drags a duplicate script along. Once all passes have settled, this module
//! sweeps those byproducts from the output directory and keeps exactly the
//! deliverables: one script and map per distribution variant plus the single
//! stylesheet and map of the style source.
//!
//! The sweep is driven purely by names the matrix and the style adapter
//! declare. File contents are never read, and a byproduct left over from an
//! earlier run is removed just like one written this session.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::matrix::{Artifact, ArtifactKind, BuildMatrix};
use crate::style::SideArtifacts;

/// A byproduct that was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedFile {
  pub path: PathBuf,
  pub kind: ArtifactKind,
}

/// Result of a best-effort deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Removed,
  Absent,
  Failed(io::ErrorKind),
}

/// Deletes `path` if it exists. Never fails.
pub fn delete_if_exists(path: &Path) -> DeleteOutcome {
  match fs::remove_file(path) {
    Ok(()) => DeleteOutcome::Removed,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "byproduct already absent");
      DeleteOutcome::Absent
    }
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to delete byproduct");
      DeleteOutcome::Failed(e.kind())
    }
  }
}

/// Canonical and byproduct file sets for one matrix.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcilePlan {
  canonical: BTreeSet<PathBuf>,
  byproducts: Vec<Artifact>,
}

impl ReconcilePlan {
  pub fn new(matrix: &BuildMatrix, side: &dyn SideArtifacts) -> Self {
    let canonical = matrix.canonical_paths(side);
    let mut byproducts: Vec<Artifact> = Vec::new();
    for artifact in matrix.iter().flat_map(|v| v.byproducts(side)) {
      if !byproducts.contains(&artifact) {
        byproducts.push(artifact);
      }
    }
    Self { canonical, byproducts }
  }

  pub fn canonical(&self) -> &BTreeSet<PathBuf> {
    &self.canonical
  }

  pub fn byproducts(&self) -> &[Artifact] {
    &self.byproducts
  }

  pub fn is_canonical(&self, path: &Path) -> bool {
    self.canonical.contains(path)
  }

  /// Deletes every byproduct inside `out_dir` that is not canonical.
  pub fn sweep(&self, out_dir: &Path) -> Vec<RemovedFile> {
    sweep_artifacts(out_dir, &self.canonical, &self.byproducts)
  }
}

fn sweep_artifacts(out_dir: &Path, canonical: &BTreeSet<PathBuf>, byproducts: &[Artifact]) -> Vec<RemovedFile> {
  let mut removed = Vec::new();

  for artifact in byproducts {
    if canonical.contains(&artifact.path) {
      warn!(path = %artifact.path.display(), "byproduct matches a deliverable, keeping it");
      continue;
    }
    if !artifact.path.starts_with(out_dir) {
      warn!(
        path = %artifact.path.display(),
        out_dir = %out_dir.display(),
        "byproduct outside output directory, skipping"
      );
      continue;
    }

    if delete_if_exists(&artifact.path) == DeleteOutcome::Removed {
      debug!(path = %artifact.path.display(), kind = %artifact.kind, "removed byproduct");
      removed.push(RemovedFile {
        path: artifact.path.clone(),
        kind: artifact.kind,
      });
    }
  }

  removed
}

/// Removes every byproduct of `matrix` from `out_dir`.
///
/// Must only run after every compilation pass has settled. Deletion failures
/// are logged and swallowed; a deliverable is never deleted even if a
/// misconfigured matrix also names it as a byproduct.
pub fn reconcile(out_dir: &Path, matrix: &BuildMatrix, side: &dyn SideArtifacts) -> Vec<RemovedFile> {
  let plan = ReconcilePlan::new(matrix, side);
  let removed = plan.sweep(out_dir);
  info!(
    out_dir = %out_dir.display(),
    candidates = plan.byproducts().len(),
    removed = removed.len(),
    "reconciliation complete"
  );
  removed
}

/// State of the output directory after reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactCheck {
  /// Deliverables found on disk.
  pub present: Vec<PathBuf>,
  /// Deliverables not found on disk.
  pub missing: Vec<PathBuf>,
  /// Byproducts still on disk (deletion failed).
  pub leftover: Vec<PathBuf>,
}

impl ArtifactCheck {
  pub fn is_complete(&self) -> bool {
    self.missing.is_empty() && self.leftover.is_empty()
  }
}

/// Lists `out_dir` and compares it with the plan.
pub fn verify_artifacts(out_dir: &Path, plan: &ReconcilePlan) -> io::Result<ArtifactCheck> {
  let mut on_disk = BTreeSet::new();
  match fs::read_dir(out_dir) {
    Ok(entries) => {
      for entry in entries.flatten() {
        on_disk.insert(entry.path());
      }
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(e),
  }

  let mut check = ArtifactCheck::default();
  for path in plan.canonical() {
    if on_disk.contains(path) {
      check.present.push(path.clone());
    } else {
      check.missing.push(path.clone());
    }
  }
  for artifact in plan.byproducts() {
    if on_disk.contains(&artifact.path) && !plan.is_canonical(&artifact.path) {
      check.leftover.push(artifact.path.clone());
    }
  }

  if !check.missing.is_empty() {
    warn!(missing = check.missing.len(), "deliverables missing from output directory");
  }
  Ok(check)
}
