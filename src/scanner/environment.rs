//! Environment stack manager.
//!
//! Frames mirror the TeX environments that are open in the output. Opening a
//! frame emits its `\begin` form under the current scope; closing pops the
//! innermost frame and emits the matching `\end` form under the scope the
//! frame was opened in, so both targets stay balanced even when a region
//! boundary falls inside the environment.

use super::mux::Multiplexer;
use super::state::{ListKind, Scope};

/// Structural frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    /// Notes section / slides frame
    Section,
    /// Bulleted list
    Itemize,
    /// Numbered list
    Enumerate,
    /// Term/definition list
    Description,
    /// Table body
    Tabular,
    /// Centering block
    Center,
    /// Block quotation
    Quote,
    /// A single list item (emitted, never pushed)
    Item,
}

impl EnvKind {
    /// TeX environment name.
    pub fn name(self) -> &'static str {
        match self {
            EnvKind::Section => "section",
            EnvKind::Itemize => "itemize",
            EnvKind::Enumerate => "enumerate",
            EnvKind::Description => "description",
            EnvKind::Tabular => "tabular",
            EnvKind::Center => "center",
            EnvKind::Quote => "quote",
            EnvKind::Item => "item",
        }
    }

    /// Whether frames of this kind indent their contents.
    pub fn is_nesting(self) -> bool {
        !matches!(self, EnvKind::Section | EnvKind::Item)
    }

    /// The list flavour, for list kinds.
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            EnvKind::Itemize => Some(ListKind::Itemize),
            EnvKind::Enumerate => Some(ListKind::Enumerate),
            EnvKind::Description => Some(ListKind::Description),
            _ => None,
        }
    }
}

impl From<ListKind> for EnvKind {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Itemize => EnvKind::Itemize,
            ListKind::Enumerate => EnvKind::Enumerate,
            ListKind::Description => EnvKind::Description,
        }
    }
}

/// An open frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Frame kind
    pub kind: EnvKind,
    /// Content given at open time (title, column spec, attribution)
    pub content: String,
    /// Scope the frame was opened under
    pub scope: Scope,
    /// A companion frame was opened alongside and closes with this one
    pub companion: bool,
    /// A custom bullet label was set inside this list
    pub custom_label: bool,
}

/// What a close request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Popped a frame and emitted its closing form
    Closed(EnvKind),
    /// Popped a frame that has no closing form
    NoClosingForm(EnvKind),
    /// Nothing was open
    Empty,
}

/// A parsed list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Depth requested by the indentation
    pub depth: usize,
    /// List flavour
    pub kind: ListKind,
    /// Whether the marker named the flavour (rather than it being carried over)
    pub explicit: bool,
    /// Item text with the marker removed
    pub text: String,
    /// Custom bullet from `- [ x ] text`
    pub label: Option<String>,
}

impl ListItem {
    /// Parse an item line. `carried` is the flavour of the previous item.
    pub fn parse(line: &str, carried: Option<ListKind>) -> Self {
        let body = line.trim_start_matches(' ');
        let depth = depth_for_indent(line.len() - body.len());
        let body = body.trim_start();

        let (marker, rest) = body.split_once(' ').unwrap_or((body, ""));
        let explicit_kind = match marker {
            "-" => Some(ListKind::Itemize),
            ":" => Some(ListKind::Description),
            m if super::directive::is_numbered_marker(m) => Some(ListKind::Enumerate),
            _ => None,
        };

        let (kind, explicit, text) = match explicit_kind {
            Some(kind) => (kind, true, rest.trim()),
            None => (carried.unwrap_or(ListKind::Itemize), false, body.trim()),
        };

        let (label, text) = match kind {
            ListKind::Itemize => split_custom_label(text),
            _ => (None, text),
        };

        Self {
            depth,
            kind,
            explicit,
            text: text.to_string(),
            label,
        }
    }
}

/// Nesting depth for a count of leading spaces: <4 is 0, 4-8 is 1, 9-12 is
/// 2, and every further four spaces one more.
pub fn depth_for_indent(spaces: usize) -> usize {
    match spaces {
        0..=3 => 0,
        4..=8 => 1,
        n => 2 + (n - 9) / 4,
    }
}

fn split_custom_label(text: &str) -> (Option<String>, &str) {
    let Some(inner) = text.strip_prefix("[ ") else {
        return (None, text);
    };
    match inner.split_once(" ]") {
        Some((label, rest)) if !label.is_empty() && !label.contains(char::is_whitespace) => {
            (Some(label.to_string()), rest.trim_start())
        }
        _ => (None, text),
    }
}

/// LIFO stack of open frames.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentStack {
    frames: Vec<Environment>,
}

impl EnvironmentStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is open.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost frame.
    pub fn top(&self) -> Option<&Environment> {
        self.frames.last()
    }

    /// Open frames, outermost first.
    pub fn frames(&self) -> &[Environment] {
        &self.frames
    }

    /// Count of open frames that indent their contents.
    pub fn depth(&self) -> usize {
        self.frames.iter().filter(|f| f.kind.is_nesting()).count()
    }

    /// Zero-based depth of the innermost list, or `None` outside lists.
    pub fn list_depth(&self) -> Option<usize> {
        self.frames
            .iter()
            .filter(|f| f.kind.list_kind().is_some())
            .count()
            .checked_sub(1)
    }

    /// Whether a tabular frame is open.
    pub fn in_tabular(&self) -> bool {
        self.frames.iter().any(|f| f.kind == EnvKind::Tabular)
    }

    /// Open a frame and emit its opening form.
    pub fn open(&mut self, kind: EnvKind, content: &str, mux: &mut Multiplexer) {
        log::trace!("opening {} at depth {}", kind.name(), self.depth());
        let scope = mux.scope();
        let depth = self.depth();
        let mut companion = false;

        match kind {
            EnvKind::Section => {
                self.open_section(content, None, mux);
                return;
            }
            EnvKind::Item => {
                mux.emit(&format!("\\item {}\n", content), depth);
                return;
            }
            EnvKind::Itemize | EnvKind::Enumerate | EnvKind::Description => {
                mux.emit(&format!("\\begin{{{}}}{}\n", kind.name(), content), depth);
            }
            EnvKind::Tabular => {
                self.open(EnvKind::Center, "", mux);
                let spec = if content.starts_with(['{', '[']) {
                    content.to_string()
                } else {
                    format!("{{{}}}", content)
                };
                mux.emit(&format!("\\begin{{tabular}}{}\n\\toprule\n", spec), depth + 1);
                companion = true;
            }
            EnvKind::Center | EnvKind::Quote => {
                let mut text = format!("\\begin{{{}}}\n", kind.name());
                if !content.is_empty() {
                    text.push_str(content);
                    text.push('\n');
                }
                mux.emit(&text, depth);
            }
        }

        self.frames.push(Environment {
            kind,
            content: content.to_string(),
            scope,
            companion,
            custom_label: false,
        });
    }

    /// Close everything, then open a section: a numbered heading in the
    /// notes and a fresh frame in the slides.
    pub fn open_section(&mut self, title: &str, style: Option<&str>, mux: &mut Multiplexer) -> Vec<CloseOutcome> {
        let closed = self.close_all("closed by new section", mux);
        let scope = mux.scope();

        if scope.includes(crate::render::Target::Notes) {
            mux.emit_scoped(
                &format!("\n\\section{{{}}}\n\\normalsize\n", title),
                0,
                Scope::NotesOnly,
            );
        }
        if scope.includes(crate::render::Target::Slides) {
            let style = match (style, scope) {
                (Some(style), _) => style,
                (None, Scope::SlidesOnly) => "[noframenumbering]",
                (None, _) => "",
            };
            mux.emit_scoped(
                &format!("\\end{{frame}}\n\n\\begin{{frame}}{}\\frametitle{{{}}}\n", style, title),
                0,
                Scope::SlidesOnly,
            );
        }

        self.frames.push(Environment {
            kind: EnvKind::Section,
            content: title.to_string(),
            scope,
            companion: false,
            custom_label: false,
        });
        closed
    }

    /// Pop the innermost frame and emit its closing form, annotated with
    /// `reason` as a TeX comment.
    pub fn close(&mut self, reason: &str, mux: &mut Multiplexer) -> CloseOutcome {
        let Some(frame) = self.frames.pop() else {
            return CloseOutcome::Empty;
        };
        log::trace!("closing {} ({})", frame.kind.name(), reason);
        let depth = self.depth();

        let text = match frame.kind {
            EnvKind::Section | EnvKind::Item => return CloseOutcome::NoClosingForm(frame.kind),
            EnvKind::Tabular => format!("\\bottomrule\n\\end{{tabular}} % {}\n", reason),
            EnvKind::Itemize if frame.custom_label => format!(
                "\\end{{itemize}} % {}\n\\renewcommand\\labelitemi{{-}}\n",
                reason
            ),
            kind => format!("\\end{{{}}} % {}\n", kind.name(), reason),
        };
        mux.emit_scoped(&text, depth, frame.scope);

        if frame.companion {
            self.close(reason, mux);
        }
        CloseOutcome::Closed(frame.kind)
    }

    /// Drain the stack, innermost first.
    pub fn close_all(&mut self, reason: &str, mux: &mut Multiplexer) -> Vec<CloseOutcome> {
        let mut outcomes = Vec::with_capacity(self.frames.len());
        while !self.frames.is_empty() {
            outcomes.push(self.close(reason, mux));
        }
        outcomes
    }

    /// Add a list item, opening and closing list frames until the innermost
    /// list sits at the item's depth.
    pub fn add_item(&mut self, item: &ListItem, mux: &mut Multiplexer) {
        if self.list_depth().is_none() {
            self.open(item.kind.into(), "  % auto-opened by list detector", mux);
        }

        while let Some(current) = self.list_depth() {
            if current < item.depth {
                self.open(item.kind.into(), "  % auto-opened by auto-indenter", mux);
            } else if current > item.depth {
                if self.close("auto-closed by auto-indenter", mux) == CloseOutcome::Empty {
                    break;
                }
            } else {
                break;
            }
        }

        if item.explicit {
            let top_kind = self.top().and_then(|f| f.kind.list_kind());
            if top_kind.is_some_and(|kind| kind != item.kind) {
                self.close("list type changed", mux);
                self.open(item.kind.into(), "  % reopened for new list type", mux);
            }
        }

        let depth = self.depth();
        if let Some(label) = &item.label {
            mux.emit(&format!("\\renewcommand\\labelitemi{{{}}}\n", label), depth);
            if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.kind == EnvKind::Itemize) {
                frame.custom_label = true;
            }
        }
        mux.emit(&format!("\\item {}\n", item.text), depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(mux: &Multiplexer) -> String {
        mux.buffers().notes.concat()
    }

    #[test]
    fn test_depth_for_indent() {
        assert_eq!(depth_for_indent(0), 0);
        assert_eq!(depth_for_indent(3), 0);
        assert_eq!(depth_for_indent(4), 1);
        assert_eq!(depth_for_indent(8), 1);
        assert_eq!(depth_for_indent(9), 2);
        assert_eq!(depth_for_indent(12), 2);
        assert_eq!(depth_for_indent(13), 3);
    }

    #[test]
    fn test_parse_items() {
        let item = ListItem::parse("    - nested", None);
        assert_eq!(item.depth, 1);
        assert_eq!(item.kind, ListKind::Itemize);
        assert_eq!(item.text, "nested");

        let item = ListItem::parse("1. first", None);
        assert_eq!(item.kind, ListKind::Enumerate);
        assert!(item.explicit);

        let item = ListItem::parse("- [ > ] arrow", None);
        assert_eq!(item.label.as_deref(), Some(">"));
        assert_eq!(item.text, "arrow");

        let item = ListItem::parse("plain", Some(ListKind::Enumerate));
        assert_eq!(item.kind, ListKind::Enumerate);
        assert!(!item.explicit);
    }

    #[test]
    fn test_open_close_balanced() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.open(EnvKind::Quote, "Attribution", &mut mux);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.close("manually closed", &mut mux), CloseOutcome::Closed(EnvKind::Quote));
        assert!(stack.is_empty());
        assert_eq!(
            notes(&mux),
            "\\begin{quote}\nAttribution\n\\end{quote} % manually closed\n"
        );
    }

    #[test]
    fn test_close_empty_and_section() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        assert_eq!(stack.close("x", &mut mux), CloseOutcome::Empty);

        stack.open_section("Intro", None, &mut mux);
        assert_eq!(stack.close("x", &mut mux), CloseOutcome::NoClosingForm(EnvKind::Section));
    }

    #[test]
    fn test_section_diverges() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.open_section("Intro", Some("[plain]"), &mut mux);
        assert_eq!(notes(&mux), "\n\\section{Intro}\n\\normalsize\n");
        assert_eq!(
            mux.buffers().slides.concat(),
            "\\end{frame}\n\n\\begin{frame}[plain]\\frametitle{Intro}\n"
        );
    }

    #[test]
    fn test_slides_only_section_gets_default_style() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        mux.set_scope(Scope::SlidesOnly);
        stack.open_section("Extra", None, &mut mux);
        assert!(mux.buffers().notes.is_empty());
        assert!(mux.buffers().slides[0].contains("\\begin{frame}[noframenumbering]"));
    }

    #[test]
    fn test_tabular_closes_companion_center() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.open(EnvKind::Tabular, "{ l r }", &mut mux);
        assert_eq!(stack.len(), 2);
        assert!(stack.in_tabular());
        stack.close("end of table", &mut mux);
        assert!(stack.is_empty());
        let out = notes(&mux);
        assert!(out.contains("\\begin{center}\n"));
        assert!(out.contains("  \\begin{tabular}{ l r }\n\\toprule\n"));
        assert!(out.contains("\\end{center} % end of table\n"));
    }

    #[test]
    fn test_close_uses_opening_scope() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.open(EnvKind::Itemize, "", &mut mux);
        mux.set_scope(Scope::NotesOnly);
        stack.close("done", &mut mux);
        assert_eq!(mux.buffers().slides.len(), 2);
    }

    #[test]
    fn test_add_item_nesting() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.add_item(&ListItem::parse("- a", None), &mut mux);
        stack.add_item(&ListItem::parse("    - b", None), &mut mux);
        assert_eq!(stack.list_depth(), Some(1));
        stack.add_item(&ListItem::parse("- c", None), &mut mux);
        assert_eq!(stack.list_depth(), Some(0));
        stack.close_all("end", &mut mux);
        assert!(stack.is_empty());

        let out = notes(&mux);
        assert_eq!(out.matches("\\begin{itemize}").count(), 2);
        assert_eq!(out.matches("\\end{itemize}").count(), 2);
        assert!(out.contains("    \\item b\n"));
    }

    #[test]
    fn test_add_item_switches_kind() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.add_item(&ListItem::parse("- a", None), &mut mux);
        stack.add_item(&ListItem::parse("1. b", None), &mut mux);
        assert_eq!(stack.top().map(|f| f.kind), Some(EnvKind::Enumerate));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_custom_label_restored_on_close() {
        let mut stack = EnvironmentStack::new();
        let mut mux = Multiplexer::new(2, 0);
        stack.add_item(&ListItem::parse("- [ * ] star", None), &mut mux);
        stack.close("end", &mut mux);
        let out = notes(&mux);
        assert!(out.contains("\\renewcommand\\labelitemi{*}\n"));
        assert!(out.ends_with("\\renewcommand\\labelitemi{-}\n"));
    }
}
