//! Document model types shared by the scanner, the renderers and the CLI.
//!
//! A scan turns one source file into a [`ScannedDocument`]: three finished
//! output streams plus the metadata, graphics and citation facts that the
//! renderers wrap around them.

mod document;
mod graphics;

pub use document::{Diagnostic, DiagnosticKind, MetaText, Metadata, ScannedDocument};
pub use graphics::{GraphicEntry, GraphicsRegistry};
