//! distmatrix-lib: build orchestration for single-entry component libraries.
//!
//! This crate compiles one entry point into a matrix of distributable artifacts:
//! - `matrix`: the set of output variants and their naming rule
//! - `style`: the scoped-stylesheet adapter shared by every compilation pass
//! - `compile`: the compiler capability and the esbuild-backed implementation
//! - `dispatch`: concurrent fan-out of one compilation per variant
//! - `reconcile`: post-join sweep of stylesheet and script byproducts
//! - `pipeline`: the full validate, dispatch, reconcile, verify run

pub mod compile;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod reconcile;
pub mod style;
mod util;

pub use error::BuildError;
