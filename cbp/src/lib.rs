//! `cbp`: parses clang `-ftime-trace` output into a conservation-checked profiling tree, merges
//! trees across translation units, and prettifies the compiler-mangled identifiers inside it.
//!
//! The pipeline, end to end: [`trace::decode`] a Chrome-tracing JSON document into [`trace::Event`]s,
//! [`analyze::analyze_trace`] them into a [`tree::Tree`], optionally [`merge::create_merge_summary`]
//! several such trees together, then [`preprocess::preprocess`] the result for display. The
//! filesystem-facing entry points in [`aggregate`] wire `analyze` up to a single file, a target
//! directory, or a whole CMake build.

pub mod aggregate;
pub mod analyze;
pub mod config;
pub mod error;
pub mod filepath;
pub mod merge;
pub mod prettify;
pub mod preprocess;
pub mod replace;
pub mod time;
pub mod trace;
pub mod tree;

pub use config::Config;
pub use error::{Error, Result};
pub use tree::{Tree, TreeCategory, TreeKind};
