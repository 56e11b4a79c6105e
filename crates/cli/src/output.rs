//! Terminal output for distmatrix.
//!
//! Status lines go to stdout, problems to stderr. Artifact listings mark each
//! path as kept (`+`) or swept (`-`), relative to the output directory.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// What a run does with a file in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  Keep,
  Remove,
}

impl Disposition {
  fn mark(self) -> &'static str {
    match self {
      Disposition::Keep => "+",
      Disposition::Remove => "-",
    }
  }
}

/// Build times are sub-minute; whole milliseconds until a second, then tenths.
pub fn format_elapsed(elapsed: Duration) -> String {
  let millis = elapsed.as_millis();
  if millis < 1000 {
    format!("{millis}ms")
  } else {
    format!("{:.1}s", elapsed.as_secs_f64())
  }
}

/// `path` relative to `out_dir` when it lies inside it.
pub fn relative_to(path: &Path, out_dir: &Path) -> String {
  path.strip_prefix(out_dir).unwrap_or(path).display().to_string()
}

pub fn print_success(message: impl Display) {
  println!("{} {}", "✓".if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn print_info(message: impl Display) {
  println!("{} {}", "•".if_supports_color(Stream::Stdout, |s| s.blue()), message);
}

pub fn print_error(message: impl Display) {
  let message = message.to_string();
  eprintln!(
    "{} {}",
    "✗".if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: impl Display) {
  let message = message.to_string();
  eprintln!(
    "{} {}",
    "⚠".if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_stat(label: &str, value: impl Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// One line per artifact: its mark, then the path under `out_dir`.
pub fn print_artifact(disposition: Disposition, path: &Path, out_dir: &Path) {
  let mark = disposition.mark();
  let path = relative_to(path, out_dir);
  match disposition {
    Disposition::Keep => println!("  {} {}", mark.if_supports_color(Stream::Stdout, |s| s.green()), path),
    Disposition::Remove => println!(
      "  {} {}",
      mark.if_supports_color(Stream::Stdout, |s| s.red()),
      path.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}

/// A matrix row: the variant label and where its script lands.
pub fn print_variant(label: impl Display, output: &Path, out_dir: &Path) {
  println!(
    "  {:<10} {} {}",
    label.to_string(),
    "→".if_supports_color(Stream::Stdout, |s| s.dimmed()),
    relative_to(output, out_dir)
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
