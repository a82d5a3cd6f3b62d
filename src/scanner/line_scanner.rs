//! Single-pass line scanner and directive dispatcher.

use chrono::Datelike;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::directive::{portable_form, split_frame_style, Directive, Key, Size};
use super::environment::{CloseOutcome, EnvKind, EnvironmentStack, ListItem};
use super::image::GraphicRequest;
use super::inline::{InlineContext, InlineEngine};
use super::mux::Multiplexer;
use super::options::{ScanOptions, MAX_LIST_DEPTH};
use super::state::{ListKind, Scope, ScanState, TwoColumn};
use super::table_detector::{format_row, Detection, TableDetector, TableLine, TableStart};
use crate::error::{Error, Result};
use crate::model::{Diagnostic, DiagnosticKind, GraphicsRegistry, MetaText, Metadata, ScannedDocument};

/// Default left column width and height for a malformed `tcb`.
const DEFAULT_COLUMN_WIDTH: f64 = 0.45;
const DEFAULT_COLUMN_HEIGHT: &str = "5";

/// Interprets a source document into the three output streams.
pub struct Scanner {
    options: ScanOptions,
    engine: InlineEngine,
    detector: TableDetector,
    tex_markup: Regex,
}

impl Scanner {
    /// Create a scanner.
    pub fn new(options: ScanOptions) -> Self {
        Self {
            engine: InlineEngine::new(options.emphasis),
            detector: TableDetector::new(),
            tex_markup: Regex::new(r"\\\w+|\$[^$]+\$").expect("TeX markup pattern is valid"),
            options,
        }
    }

    /// Scanner options.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan a whole document.
    ///
    /// Structural problems are collected as diagnostics; only resource,
    /// date and scope errors stop the scan.
    pub fn scan(&self, source: &str) -> Result<ScannedDocument> {
        let text: String = if self.options.normalize_unicode {
            source.nfc().collect()
        } else {
            source.to_string()
        };
        let lines: Vec<&str> = text.lines().collect();
        log::info!("scanning {} lines", lines.len());

        let mut ctx = ScanContext::new(self);
        for (i, raw) in lines.iter().enumerate() {
            let previous = i.checked_sub(1).map(|j| lines[j]);
            let next = lines.get(i + 1).copied();
            ctx.process_line(raw, previous, next)?;
        }
        Ok(ctx.finish())
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}

/// State of one in-flight scan.
struct ScanContext<'s> {
    scanner: &'s Scanner,
    state: ScanState,
    stack: EnvironmentStack,
    mux: Multiplexer,
    metadata: Metadata,
    graphics: GraphicsRegistry,
    preamble: String,
    diagnostics: Vec<Diagnostic>,
    /// Open scope regions: requested scope and the scope to restore
    regions: Vec<(Scope, Scope)>,
    previous_was_prose: bool,
}

impl<'s> ScanContext<'s> {
    fn new(scanner: &'s Scanner) -> Self {
        let options = &scanner.options;
        Self {
            scanner,
            state: ScanState::new(options.debug_level),
            stack: EnvironmentStack::new(),
            mux: Multiplexer::new(options.tab_width, options.base_indent),
            metadata: Metadata::default(),
            graphics: GraphicsRegistry::new(),
            preamble: String::new(),
            diagnostics: Vec::new(),
            regions: Vec::new(),
            previous_was_prose: false,
        }
    }

    fn line(&self) -> usize {
        self.state.line_number
    }

    fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(self.line(), kind, message);
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn inline_context(&self) -> InlineContext {
        InlineContext {
            in_table: self.state.in_table || self.stack.in_tabular(),
            leave_alone: self.state.leave_alone,
        }
    }

    fn process_line(&mut self, raw: &str, previous: Option<&str>, next: Option<&str>) -> Result<()> {
        self.state.line_number += 1;
        let line_no = self.line();
        let previous_was_prose = std::mem::take(&mut self.previous_was_prose);

        if self.state.header_consumed {
            self.state.header_consumed = false;
            self.mux.begin_line(line_no, Some(raw.trim_end().to_string()));
            self.mux.flush_portable();
            return Ok(());
        }

        self.detect_tex(raw);
        self.mux.begin_line(line_no, portable_form(raw));

        let outcome = self.scanner.engine.apply(raw, &self.inline_context());
        if self.state.debug_level > 0 && outcome.line != raw {
            log::debug!("({}) formatted line: {}", line_no, outcome.line);
        }
        self.record_citations(outcome.effects.citations);
        if outcome.effects.center_image {
            self.stack.open(EnvKind::Center, "", &mut self.mux);
        }
        let line = outcome.line;

        let table_line = TableLine {
            raw,
            previous,
            previous_was_prose,
            next,
        };
        match self.scanner.detector.detect(&table_line, self.state.table_type) {
            Detection::Open(start) => {
                self.open_table(start, &line);
                return Ok(());
            }
            Detection::Rule => {
                self.mux.flush_portable();
                return Ok(());
            }
            Detection::Close => {
                self.close_frame("end of block table", false);
                self.state.reset_table();
                self.mux.flush_portable();
                return Ok(());
            }
            Detection::Pass => {}
        }

        let directive = Directive::parse(raw);
        let value = Directive::parse(&line).value;
        self.dispatch(&directive, value, &line, previous, previous_was_prose)
    }

    fn detect_tex(&mut self, raw: &str) {
        if self.scanner.tex_markup.is_match(raw) {
            if self.state.pure_markdown {
                log::debug!("({}) found TeX markup: {}", self.line(), raw);
            }
            self.state.pure_markdown = false;
        }
        if raw.contains("\\cite") {
            self.state.latch_citations();
        }
    }

    fn record_citations(&mut self, keys: Vec<String>) {
        if keys.is_empty() {
            return;
        }
        if self.state.record_citations(keys) {
            log::info!("({}) document has citations", self.line());
        }
    }

    fn dispatch(
        &mut self,
        directive: &Directive<'_>,
        value: &str,
        line: &str,
        previous: Option<&str>,
        previous_was_prose: bool,
    ) -> Result<()> {
        let depth = self.stack.depth();

        match directive.key {
            Key::Title => self.metadata.title = Some(MetaText::new(value, directive.value)),
            Key::CourseCode => self.metadata.course_code = Some(MetaText::new(value, directive.value)),
            Key::CourseName => self.metadata.course_name = Some(MetaText::new(value, directive.value)),
            Key::Debug => {
                let level = directive.value.parse::<i32>().map_err(|_| Error::InvalidDebugLevel {
                    line: self.line(),
                    value: directive.value.to_string(),
                })?;
                self.state.debug_level = level;
                log::info!("debug level set to {}", level);
            }
            Key::Date => {
                self.check_year(directive.value)?;
                self.metadata.date = Some(MetaText::new(value, directive.value));
            }
            Key::Section => self.open_section(value),
            Key::SlidesHeading => {
                self.with_scope(Scope::SlidesOnly, |ctx| {
                    ctx.open_section(value);
                    Ok(())
                })?;
            }
            Key::Itemize => self.open_list(ListKind::Itemize),
            Key::Enumerate => self.open_list(ListKind::Enumerate),
            Key::Description => self.open_list(ListKind::Description),
            Key::Item => self.add_item(ListItem::parse(line, self.state.list_type)),
            Key::Definition => self.add_definition(value, previous, previous_was_prose),
            Key::Close => self.close_frame("manually closed", true),
            Key::Graphic => self.add_graphic(directive.value)?,
            Key::PageBreak => {
                self.with_scope(Scope::NotesOnly, |ctx| {
                    ctx.close_all("closed by page break");
                    ctx.mux.emit("\n\\newpage\n", 0);
                    Ok(())
                })?;
            }
            Key::Quote => self.stack.open(EnvKind::Quote, value, &mut self.mux),
            Key::Table => {
                self.stack.open(EnvKind::Tabular, value, &mut self.mux);
            }
            Key::ScopedLine(scope, size) => {
                self.with_scope(scope, |ctx| {
                    let text = match size.command() {
                        Some(command) => format!("{}\n{}\n", command, value),
                        None if size == Size::Unchanged => format!("{}\n", value),
                        None => String::new(),
                    };
                    ctx.mux.emit(&text, depth);
                    Ok(())
                })?;
            }
            Key::RegionBegin(scope) => {
                let saved = self.mux.scope();
                let narrowed = saved.narrow(scope, self.line())?;
                self.regions.push((scope, saved));
                self.mux.set_scope(narrowed);
            }
            Key::RegionEnd(scope) => self.end_region(scope, value, depth),
            Key::VerbatimBegin => self.state.leave_alone = true,
            Key::VerbatimEnd => self.state.leave_alone = false,
            Key::Preamble => {
                self.preamble.push_str(directive.value);
                self.preamble.push('\n');
            }
            Key::ColumnsBegin => self.begin_columns(directive.value, depth),
            Key::ColumnsSplit => {
                let columns = self.two_column_or_default();
                self.mux.emit(" \\end{minipage}\n", depth);
                self.mux.emit(
                    &format!(
                        "   \\begin{{minipage}}[b][{}cm][t]{{{}\\linewidth}}\n",
                        columns.height, columns.right_width
                    ),
                    depth,
                );
                self.state.two_column = Some(columns);
            }
            Key::ColumnsEnd => {
                self.mux.emit(" \\end{minipage}\n\n", depth);
                self.state.two_column = None;
            }
            Key::Percent | Key::Comment => {}
            Key::Text => self.text_line(line, depth),
        }
        Ok(())
    }

    /// Run `f` with the scope narrowed to `scope`, restoring it afterwards.
    fn with_scope<F>(&mut self, scope: Scope, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let saved = self.mux.scope();
        let narrowed = saved.narrow(scope, self.line())?;
        self.mux.set_scope(narrowed);
        let result = f(self);
        self.mux.set_scope(saved);
        result
    }

    fn end_region(&mut self, scope: Scope, value: &str, depth: usize) {
        match self.regions.last() {
            Some(&(open, saved)) if open == scope => {
                if !value.is_empty() {
                    self.mux.emit(&format!("{}\n", value), depth);
                }
                self.regions.pop();
                self.mux.set_scope(saved);
            }
            _ => self.report(
                DiagnosticKind::UnbalancedRegion,
                format!("end of {:?} region that is not open", scope),
            ),
        }
    }

    fn check_year(&self, value: &str) -> Result<()> {
        let after_comma = value.split_once(',').map_or(value, |(_, rest)| rest).trim();
        let declared = after_comma
            .split(|c: char| !c.is_ascii_digit())
            .rfind(|token| token.len() == 4)
            .and_then(|token| token.parse::<i32>().ok());
        let actual = self
            .scanner
            .options
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year());

        match declared {
            Some(year) if year == actual => {
                log::debug!("the year in the source file ({}) agrees with the system date", year);
                Ok(())
            }
            _ => Err(Error::YearMismatch {
                declared: after_comma.to_string(),
                actual,
            }),
        }
    }

    fn open_section(&mut self, value: &str) {
        let scope = self.mux.scope();
        if scope == Scope::NotesOnly {
            log::warn!(
                "({}) section inside a notes-only region opens no slides frame",
                self.line()
            );
        }
        let (title, style) = split_frame_style(value);
        if self.state.debug_level > 1 {
            log::info!("section: {}", title);
        }

        let outcomes = self.stack.open_section(title, style, &mut self.mux);
        self.after_closes(&outcomes, false);
        if scope != Scope::NotesOnly {
            self.state.slide_count += 1;
        }
        self.state.list_type = None;
    }

    fn open_list(&mut self, kind: ListKind) {
        self.stack.open(kind.into(), "", &mut self.mux);
        self.state.list_type = Some(kind);
    }

    fn add_item(&mut self, mut item: ListItem) {
        if item.depth > MAX_LIST_DEPTH {
            self.report(
                DiagnosticKind::ListTooDeep,
                format!(
                    "list item nested at depth {}, deepest supported is {}",
                    item.depth, MAX_LIST_DEPTH
                ),
            );
            item.depth = MAX_LIST_DEPTH;
        }
        self.state.list_type = Some(item.kind);
        self.stack.add_item(&item, &mut self.mux);
    }

    fn add_definition(&mut self, value: &str, previous: Option<&str>, previous_was_prose: bool) {
        let text = match previous {
            Some(term) if previous_was_prose => {
                let term = self.scanner.engine.transform(term.trim(), &self.inline_context());
                self.mux.retract_previous_line();
                format!("[{}] {}", term, value)
            }
            _ => {
                self.report(
                    DiagnosticKind::MissingLookBack,
                    "definition has no term on the previous line",
                );
                value.to_string()
            }
        };

        self.add_item(ListItem {
            depth: self.stack.list_depth().unwrap_or(0),
            kind: ListKind::Description,
            explicit: true,
            text,
            label: None,
        });
    }

    fn add_graphic(&mut self, value: &str) -> Result<()> {
        let request = GraphicRequest::parse(value);
        let (file, size) = request.resolve(&self.scanner.options.graphics_dir)?;
        self.graphics.record(file.clone(), size);

        let depth = self.stack.depth();
        let scope = self.mux.scope();
        self.mux.discard_portable();
        for (fragment_scope, fragment) in request.fragments(scope) {
            self.mux.emit_scoped(&fragment, depth, fragment_scope);
        }
        if scope != Scope::NotesOnly {
            self.mux.push_portable(format!("![]({})", file));
        }
        Ok(())
    }

    fn begin_columns(&mut self, value: &str, depth: usize) {
        let mut parts = value.split_whitespace();
        let width = parts.next().and_then(|w| w.parse::<f64>().ok());
        let height = parts.next();

        let (width, height) = match (width, height) {
            (Some(width), Some(height)) if (0.0..1.0).contains(&width) => (width, height.to_string()),
            _ => {
                self.report(
                    DiagnosticKind::MalformedDirective,
                    format!("tcb expects '<width> <height>', got '{}'", value),
                );
                (DEFAULT_COLUMN_WIDTH, DEFAULT_COLUMN_HEIGHT.to_string())
            }
        };

        let columns = TwoColumn {
            height,
            right_width: format!("{:.2}", 1.0 - width - 0.10),
        };
        self.mux.emit(
            &format!(
                "   \\begin{{minipage}}[b][{}cm][t]{{{}\\linewidth}}\n",
                columns.height, width
            ),
            depth,
        );
        self.state.two_column = Some(columns);
    }

    fn two_column_or_default(&mut self) -> TwoColumn {
        match self.state.two_column.take() {
            Some(columns) => columns,
            None => {
                self.report(DiagnosticKind::MalformedDirective, "tcs without a preceding tcb");
                TwoColumn {
                    height: DEFAULT_COLUMN_HEIGHT.to_string(),
                    right_width: format!("{:.2}", 1.0 - DEFAULT_COLUMN_WIDTH - 0.10),
                }
            }
        }
    }

    fn open_table(&mut self, start: TableStart, line: &str) {
        if start.header_from_previous {
            self.mux.retract_previous_line();
        }
        self.state.table_type = start.kind;
        self.state.in_table = true;
        self.state.header_consumed = start.consumes_next;
        self.stack.open(EnvKind::Tabular, &start.spec, &mut self.mux);

        let depth = self.stack.depth();
        let ctx = self.inline_context();
        if let Some(cells) = &start.header {
            let mut transformed = Vec::with_capacity(cells.len());
            for cell in cells {
                let outcome = self.scanner.engine.apply(cell, &ctx);
                self.record_citations(outcome.effects.citations);
                transformed.push(outcome.line);
            }
            self.mux.emit(&format!("{}\n\\midrule\n", format_row(&transformed)), depth);
        }
        if start.row_is_body {
            self.table_row(line, depth);
        }
        self.mux.flush_portable();
    }

    fn table_row(&mut self, line: &str, depth: usize) {
        let cells = self.scanner.detector.split_row(self.state.table_type, line);
        self.mux.emit(&format!("{}\n", format_row(&cells)), depth);
    }

    fn text_line(&mut self, line: &str, depth: usize) {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start_matches(' ').len();
        let marker = trimmed.split(' ').next().unwrap_or_default();

        // indented items are list items whatever frame is open
        if indent >= 4 && (marker == "-" || super::directive::is_numbered_marker(marker)) {
            self.add_item(ListItem::parse(line, self.state.list_type));
        } else if self.state.in_table && !trimmed.is_empty() {
            self.table_row(line, depth);
        } else if !trimmed.is_empty() {
            self.mux.emit(&format!("{}\n", trimmed), depth);
            self.previous_was_prose = true;
        } else {
            self.close_frame("closed by blank line", false);
            self.mux.flush_portable();
        }
    }

    fn close_frame(&mut self, reason: &str, explicit: bool) {
        let outcome = self.stack.close(reason, &mut self.mux);
        self.after_closes(&[outcome], explicit);
    }

    fn close_all(&mut self, reason: &str) {
        let outcomes = self.stack.close_all(reason, &mut self.mux);
        self.after_closes(&outcomes, false);
    }

    fn after_closes(&mut self, outcomes: &[CloseOutcome], explicit: bool) {
        for outcome in outcomes {
            match *outcome {
                CloseOutcome::Closed(kind) => {
                    if self.state.debug_level > 2 {
                        log::info!("({}) popped {}", self.line(), kind.name());
                    }
                }
                CloseOutcome::NoClosingForm(kind) if explicit => self.report(
                    DiagnosticKind::NoClosingForm,
                    format!("{} has no closing form", kind.name()),
                ),
                CloseOutcome::NoClosingForm(kind) => {
                    log::debug!("({}) popped {} without closing form", self.line(), kind.name());
                }
                CloseOutcome::Empty if explicit => {
                    self.report(DiagnosticKind::EmptyStack, "no environment to close")
                }
                CloseOutcome::Empty => log::trace!("({}) nothing to close", self.line()),
            }
        }

        if !self.stack.in_tabular() && self.state.in_table {
            self.state.reset_table();
        }
        self.state.list_type = self
            .stack
            .frames()
            .iter()
            .rev()
            .find_map(|f| f.kind.list_kind());
    }

    fn finish(mut self) -> ScannedDocument {
        while let Some((scope, saved)) = self.regions.pop() {
            self.report(
                DiagnosticKind::UnbalancedRegion,
                format!("{:?} region still open at end of document", scope),
            );
            self.mux.set_scope(saved);
        }
        self.mux.set_scope(Scope::Both);
        if self.state.two_column.is_some() {
            self.report(DiagnosticKind::MalformedDirective, "two-column layout not ended with tce");
        }

        self.close_all("auto-closed at end of document");
        log::info!(
            "scanned {} lines, {} slides, {} graphics",
            self.state.line_number,
            self.state.slide_count,
            self.graphics.len()
        );

        ScannedDocument {
            metadata: self.metadata,
            buffers: self.mux.into_buffers(),
            graphics: self.graphics,
            has_citations: self.state.has_citations,
            citation_keys: self.state.citation_keys,
            slide_count: self.state.slide_count,
            preamble: self.preamble,
            pure_markdown: self.state.pure_markdown,
            debug_level: self.state.debug_level,
            diagnostics: self.diagnostics,
        }
    }
}
