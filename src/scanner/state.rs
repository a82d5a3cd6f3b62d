//! Per-scan mutable state.

use crate::error::{Error, Result};
use crate::render::Target;

/// Which output targets receive emitted fragments.
///
/// Notes-only and slides-only cannot both hold: the type has no such value,
/// and [`Scope::narrow`] refuses the transition that would need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Notes and slides
    #[default]
    Both,
    /// Notes only
    NotesOnly,
    /// Slides only
    SlidesOnly,
}

impl Scope {
    /// Whether fragments emitted under this scope reach `target`'s TeX buffer.
    pub fn includes(self, target: Target) -> bool {
        match (self, target) {
            (Scope::Both, Target::Notes | Target::Slides) => true,
            (Scope::NotesOnly, Target::Notes) => true,
            (Scope::SlidesOnly, Target::Slides) => true,
            _ => false,
        }
    }

    /// Restrict this scope further. Restricting notes-only to slides-only
    /// (or the reverse) is a fatal logic error in the source.
    pub fn narrow(self, to: Scope, line: usize) -> Result<Scope> {
        match (self, to) {
            (Scope::Both, to) => Ok(to),
            (current, Scope::Both) => Ok(current),
            (current, to) if current == to => Ok(current),
            _ => Err(Error::ScopeConflict { line }),
        }
    }
}

/// Table dialect currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableType {
    /// Not in a detected table
    #[default]
    None,
    /// Columns separated by runs of spaces, dashed rule under the header
    Simple,
    /// Rows delimited by `|`
    Pipe,
    /// Grid table framed by `+-` lines
    Block,
}

/// List environment flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Bulleted list (`-`)
    Itemize,
    /// Numbered list (`1.`)
    Enumerate,
    /// Term/definition list (`:`)
    Description,
}

/// Geometry of an open two-column layout (`tcb`).
#[derive(Debug, Clone, PartialEq)]
pub struct TwoColumn {
    /// Minipage height in cm
    pub height: String,
    /// Right column width as a fraction of the line width
    pub right_width: String,
}

/// Mutable state owned by one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Current source line (1-indexed; 0 before the first line)
    pub line_number: usize,

    /// Table dialect of the open detected table
    pub table_type: TableType,

    /// Whether a detected table is open
    pub in_table: bool,

    /// One-way latch: set once any citation is seen
    pub has_citations: bool,

    /// Citation keys in first-seen order
    pub citation_keys: Vec<String>,

    /// Kind of the most recent list item
    pub list_type: Option<ListKind>,

    /// Inside a `[bv]`/`[ev]` region
    pub leave_alone: bool,

    /// Verbosity requested by `D`
    pub debug_level: i32,

    /// No raw TeX seen so far
    pub pure_markdown: bool,

    /// Slides frames opened
    pub slide_count: usize,

    /// Open two-column layout
    pub two_column: Option<TwoColumn>,

    /// The following source line was already consumed as a table header
    pub header_consumed: bool,
}

impl ScanState {
    /// Fresh state for a new scan.
    pub fn new(debug_level: i32) -> Self {
        Self {
            debug_level,
            pure_markdown: true,
            ..Self::default()
        }
    }

    /// Record citation keys. Returns true the first time the latch closes.
    pub fn record_citations<I, S>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            if !self.citation_keys.contains(&key) {
                self.citation_keys.push(key);
            }
        }
        self.latch_citations()
    }

    /// Close the citations latch. Returns true if it was open.
    pub fn latch_citations(&mut self) -> bool {
        let first = !self.has_citations;
        self.has_citations = true;
        first
    }

    /// Leave any detected table.
    pub fn reset_table(&mut self) {
        self.table_type = TableType::None;
        self.in_table = false;
        self.header_consumed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_includes() {
        assert!(Scope::Both.includes(Target::Notes));
        assert!(Scope::Both.includes(Target::Slides));
        assert!(Scope::NotesOnly.includes(Target::Notes));
        assert!(!Scope::NotesOnly.includes(Target::Slides));
        assert!(!Scope::SlidesOnly.includes(Target::Notes));
        assert!(!Scope::Both.includes(Target::Portable));
    }

    #[test]
    fn test_scope_narrow() {
        assert_eq!(Scope::Both.narrow(Scope::NotesOnly, 1).unwrap(), Scope::NotesOnly);
        assert_eq!(Scope::SlidesOnly.narrow(Scope::Both, 1).unwrap(), Scope::SlidesOnly);
        assert_eq!(Scope::SlidesOnly.narrow(Scope::SlidesOnly, 1).unwrap(), Scope::SlidesOnly);
    }

    #[test]
    fn test_scope_conflict_is_fatal() {
        let err = Scope::NotesOnly.narrow(Scope::SlidesOnly, 42).unwrap_err();
        assert!(matches!(err, Error::ScopeConflict { line: 42 }));
        assert!(Scope::SlidesOnly.narrow(Scope::NotesOnly, 1).is_err());
    }

    #[test]
    fn test_citation_latch_closes_once() {
        let mut state = ScanState::new(0);
        assert!(state.record_citations(["smith2001"]));
        assert!(!state.record_citations(["doe2010", "smith2001"]));
        assert!(state.has_citations);
        assert_eq!(state.citation_keys, vec!["smith2001", "doe2010"]);
    }
}
