//! The three append-only output streams filled during a scan.

use serde::{Deserialize, Serialize};

/// An output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Long-form lecture notes (LaTeX article)
    Notes,
    /// Condensed slide deck (LaTeX beamer)
    Slides,
    /// Plain Markdown export of the notes
    Portable,
}

impl Target {
    /// All targets in render order.
    pub const ALL: [Target; 3] = [Target::Notes, Target::Slides, Target::Portable];

    /// Short lower-case name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Target::Notes => "notes",
            Target::Slides => "slides",
            Target::Portable => "portable",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered fragment sequences, one per target.
///
/// Notes and slides fragments carry their own line endings; portable lines
/// do not and are joined with `\n`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputBuffers {
    /// Fragments of the notes document body
    pub notes: Vec<String>,
    /// Fragments of the slides document body
    pub slides: Vec<String>,
    /// Lines of the portable export body
    pub portable: Vec<String>,
}

impl OutputBuffers {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments of one target.
    pub fn get(&self, target: Target) -> &[String] {
        match target {
            Target::Notes => &self.notes,
            Target::Slides => &self.slides,
            Target::Portable => &self.portable,
        }
    }

    /// Body text of one target.
    pub fn joined(&self, target: Target) -> String {
        match target {
            Target::Portable => self.portable.join("\n"),
            _ => self.get(target).concat(),
        }
    }

    /// Whether every buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.slides.is_empty() && self.portable.is_empty()
    }
}
