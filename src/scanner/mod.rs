//! The markup interpreter.
//!
//! A [`Scanner`] reads a source document top to bottom exactly once. Each
//! line runs through the [`InlineEngine`], then the [`TableDetector`], then
//! the directive handlers, which open and close frames on the
//! [`EnvironmentStack`]. Every fragment ends up in the [`Multiplexer`], which
//! routes it to the notes, slides and portable buffers.

pub mod directive;
mod environment;
mod image;
mod inline;
mod line_scanner;
mod mux;
mod options;
mod state;
mod table_detector;

pub use directive::{Directive, Key};
pub use environment::{CloseOutcome, EnvKind, Environment, EnvironmentStack, ListItem};
pub use image::GraphicRequest;
pub use inline::{InlineContext, InlineEffects, InlineEngine, InlineOutcome};
pub use line_scanner::Scanner;
pub use mux::Multiplexer;
pub use options::{ScanOptions, GRAPHIC_EXTENSIONS, MAX_LIST_DEPTH};
pub use state::{ListKind, ScanState, Scope, TableType, TwoColumn};
pub use table_detector::{Detection, TableDetector, TableLine, TableStart};
