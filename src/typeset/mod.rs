//! Hand-off to the external formatting tools.
//!
//! The notes and slides go through a TeX engine (plus a bibliography pass
//! when the document cites anything); the portable export goes through a
//! Markdown converter. Tools are reached through the [`CommandRunner`] seam
//! so builds can be exercised without them.

mod cleanup;
mod pipeline;
mod runner;

pub use cleanup::{remove_files, remove_intermediates, TEX_INTERMEDIATES};
pub use pipeline::{BuildReport, Pipeline, TargetReport, TypesetOptions};
pub use runner::{CommandOutcome, CommandRunner, SystemRunner};
