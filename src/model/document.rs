//! Document-level types produced by a scan.

use super::GraphicsRegistry;
use crate::render::{OutputBuffers, Target};
use serde::{Deserialize, Serialize};

/// A metadata value kept in two forms: typeset-safe for the TeX targets and
/// as written for the portable export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaText {
    /// Value after inline transforms (escaped for TeX)
    pub tex: String,
    /// Value exactly as written in the source
    pub plain: String,
}

impl MetaText {
    /// Create a metadata value from its two forms.
    pub fn new(tex: impl Into<String>, plain: impl Into<String>) -> Self {
        Self {
            tex: tex.into(),
            plain: plain.into(),
        }
    }
}

/// Lecture metadata set by the `T`, `X`, `N` and `Z` directives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Lecture title (`T`)
    pub title: Option<MetaText>,

    /// Course code (`X`)
    pub course_code: Option<MetaText>,

    /// Course name (`N`)
    pub course_name: Option<MetaText>,

    /// Lecture date (`Z`)
    pub date: Option<MetaText>,
}

impl Metadata {
    /// TeX form of the title, or empty.
    pub fn title_tex(&self) -> &str {
        self.title.as_ref().map(|m| m.tex.as_str()).unwrap_or("")
    }

    /// TeX form of the course code, or empty.
    pub fn course_code_tex(&self) -> &str {
        self.course_code.as_ref().map(|m| m.tex.as_str()).unwrap_or("")
    }

    /// TeX form of the course name, or empty.
    pub fn course_name_tex(&self) -> &str {
        self.course_name.as_ref().map(|m| m.tex.as_str()).unwrap_or("")
    }

    /// TeX form of the date, or empty.
    pub fn date_tex(&self) -> &str {
        self.date.as_ref().map(|m| m.tex.as_str()).unwrap_or("")
    }
}

/// Kind of a non-fatal inconsistency found while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Close requested with no open frame
    EmptyStack,
    /// Closed a frame kind that has no closing boilerplate
    NoClosingForm,
    /// Region end without a matching begin, or region left open
    UnbalancedRegion,
    /// List item indented past the supported depth
    ListTooDeep,
    /// Directive arguments that could not be understood
    MalformedDirective,
    /// Look-back to a previous line that carried no prose
    MissingLookBack,
    /// Unknown key in a configuration file
    UnknownConfigKey,
}

/// A reported, non-fatal problem with its source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source line (1-indexed, 0 for configuration files)
    pub line: usize,
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {:?}: {}", self.line, self.kind, self.message)
    }
}

/// Everything a finished scan hands to the renderers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannedDocument {
    /// Lecture metadata
    pub metadata: Metadata,

    /// Finished output streams
    pub buffers: OutputBuffers,

    /// Graphics referenced by `g` directives
    pub graphics: GraphicsRegistry,

    /// Whether any citation was seen
    pub has_citations: bool,

    /// Citation keys in first-seen order
    pub citation_keys: Vec<String>,

    /// Number of slides frames opened
    pub slide_count: usize,

    /// Lines added to the shared preamble by `[preamble]`
    pub preamble: String,

    /// False once raw TeX markup has been seen
    pub pure_markdown: bool,

    /// Last debug level set by a `D` directive
    pub debug_level: i32,

    /// Non-fatal problems, in source order
    pub diagnostics: Vec<Diagnostic>,
}

impl ScannedDocument {
    /// Joined body text of one target.
    pub fn body(&self, target: Target) -> String {
        self.buffers.joined(target)
    }

    /// Citation keys as a comma-separated list.
    pub fn citation_list(&self) -> String {
        self.citation_keys.join(",")
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
