//! Output stream multiplexer.
//!
//! Every fragment a handler produces passes through [`Multiplexer::emit`],
//! which appends it to the notes and/or slides buffer according to the
//! current [`Scope`], and records the portable form of the originating source
//! line the first time that line emits outside a notes-only scope.

use super::state::Scope;
use crate::render::{OutputBuffers, Target};

/// Buffer positions at the start of a source line.
#[derive(Debug, Clone, Copy, Default)]
struct LineMark {
    line: usize,
    notes: usize,
    slides: usize,
}

/// Routes fragments into the three output buffers.
#[derive(Debug)]
pub struct Multiplexer {
    buffers: OutputBuffers,
    scope: Scope,
    tab_width: usize,
    base_indent: usize,
    current: LineMark,
    previous: LineMark,
    pending_portable: Option<String>,
}

impl Multiplexer {
    /// Create a multiplexer with empty buffers.
    pub fn new(tab_width: usize, base_indent: usize) -> Self {
        Self {
            buffers: OutputBuffers::new(),
            scope: Scope::Both,
            tab_width,
            base_indent,
            current: LineMark::default(),
            previous: LineMark::default(),
            pending_portable: None,
        }
    }

    /// Current scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Replace the current scope.
    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    /// Start a new source line. `portable` is the line's portable-export
    /// form, written on its first emission outside a notes-only scope.
    pub fn begin_line(&mut self, line: usize, portable: Option<String>) {
        self.previous = self.current;
        self.current = LineMark {
            line,
            notes: self.buffers.notes.len(),
            slides: self.buffers.slides.len(),
        };
        self.pending_portable = portable;
    }

    /// Emit a fragment under the current scope at nesting `depth`.
    pub fn emit(&mut self, fragment: &str, depth: usize) {
        self.emit_scoped(fragment, depth, self.scope);
    }

    /// Emit a fragment under an explicit scope.
    pub fn emit_scoped(&mut self, fragment: &str, depth: usize, scope: Scope) {
        if !fragment.is_empty() {
            let indent = " ".repeat(self.tab_width * (self.base_indent + depth));
            let text = format!("{}{}", indent, fragment);
            if scope.includes(Target::Notes) {
                self.buffers.notes.push(text.clone());
            }
            if scope.includes(Target::Slides) {
                self.buffers.slides.push(text);
            }
        }

        if scope != Scope::NotesOnly {
            if let Some(line) = self.pending_portable.take() {
                self.push_portable(line);
            }
        }
    }

    /// Append a line to the portable export, skipping consecutive duplicates.
    pub fn push_portable(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.buffers.portable.last() != Some(&line) {
            self.buffers.portable.push(line);
        }
    }

    /// Write the pending portable form now, even if nothing was emitted.
    pub fn flush_portable(&mut self) {
        if self.scope != Scope::NotesOnly {
            if let Some(line) = self.pending_portable.take() {
                self.push_portable(line);
            }
        }
    }

    /// Drop the pending portable form of the current line.
    pub fn discard_portable(&mut self) {
        self.pending_portable = None;
    }

    /// Remove the notes and slides fragments emitted by the previous source
    /// line. Returns the number of fragments removed.
    pub fn retract_previous_line(&mut self) -> usize {
        let notes = self.previous.notes..self.current.notes;
        let slides = self.previous.slides..self.current.slides;
        let removed = notes.len() + slides.len();

        log::trace!(
            "retracting {} fragment(s) of line {}",
            removed,
            self.previous.line
        );
        self.buffers.notes.drain(notes);
        self.buffers.slides.drain(slides);
        self.current.notes = self.previous.notes;
        self.current.slides = self.previous.slides;
        removed
    }

    /// Buffers written so far.
    pub fn buffers(&self) -> &OutputBuffers {
        &self.buffers
    }

    /// Finish and hand over the buffers.
    pub fn into_buffers(self) -> OutputBuffers {
        self.buffers
    }
}
