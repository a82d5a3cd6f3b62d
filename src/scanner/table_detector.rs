//! Table detection for the three markdown table dialects.
//!
//! Detection is a small state machine: while no table is open, each line is
//! checked against the simple (dashed rule under a header), pipe (`|`-led
//! rows) and block (`+-` framed grid) dialects. Once a table is open the
//! detector only tells rule lines apart from body rows, and for block tables
//! recognises the closing frame line.

use regex::Regex;

use super::state::TableType;

/// A line with its neighbours, as seen by the detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLine<'a> {
    /// Current source line, before inline transforms
    pub raw: &'a str,
    /// Previous source line
    pub previous: Option<&'a str>,
    /// The previous line was emitted as prose
    pub previous_was_prose: bool,
    /// Next source line
    pub next: Option<&'a str>,
}

/// A table opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStart {
    /// Dialect
    pub kind: TableType,
    /// Column specification, e.g. `[t]{ l r }`
    pub spec: String,
    /// Raw header cells, if the table has a header
    pub header: Option<Vec<String>>,
    /// The header came from the previous line, whose output must be retracted
    pub header_from_previous: bool,
    /// The next line was consumed as the header and must be skipped
    pub consumes_next: bool,
    /// The current line is itself the first body row
    pub row_is_body: bool,
}

/// Detector verdict for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Not a table control line
    Pass,
    /// A table starts on this line
    Open(TableStart),
    /// Rule line inside an open table; emit nothing
    Rule,
    /// Closing frame of a block table
    Close,
}

/// Column alignment from a separator segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// `l`
    Left,
    /// `r`
    Right,
}

impl Alignment {
    /// Alignment of one dash segment: `:-` left, `-:` right, default left.
    pub fn of(segment: &str) -> Self {
        let segment = segment.trim();
        if segment.starts_with(":-") {
            Alignment::Left
        } else if segment.ends_with("-:") {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    fn letter(self) -> char {
        match self {
            Alignment::Left => 'l',
            Alignment::Right => 'r',
        }
    }
}

/// Build `[t]{ l r ... }` from column alignments.
pub fn column_spec(columns: &[Alignment]) -> String {
    let mut spec = String::from("[t]{");
    for column in columns {
        spec.push(' ');
        spec.push(column.letter());
    }
    spec.push_str(" }");
    spec
}

/// Recognises table dialects line by line.
pub struct TableDetector {
    simple_rule: Regex,
    dash_segment: Regex,
    cell_gap: Regex,
}

impl TableDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self {
            simple_rule: Regex::new(r"^\s*:?-{2,}:?(?:\s+:?-{2,}:?)*\s*$")
                .expect("simple table rule pattern is valid"),
            dash_segment: Regex::new(r":?-{2,}:?").expect("dash segment pattern is valid"),
            cell_gap: Regex::new(r"\s{2,}").expect("cell gap pattern is valid"),
        }
    }

    /// Classify `line` given the dialect of the open table.
    pub fn detect(&self, line: &TableLine<'_>, open: TableType) -> Detection {
        let raw = line.raw;
        match open {
            TableType::None => self.detect_start(line),
            TableType::Block if raw.starts_with("+-") => Detection::Close,
            TableType::Block if raw.starts_with("+=") => Detection::Rule,
            TableType::Simple if self.simple_rule.is_match(raw) => Detection::Rule,
            TableType::Pipe | TableType::Block if is_separator_row(raw) => Detection::Rule,
            _ => Detection::Pass,
        }
    }

    fn detect_start(&self, line: &TableLine<'_>) -> Detection {
        let raw = line.raw;

        if raw.starts_with("+-") {
            let spec = column_spec(&self.alignments(raw, '+'));
            let header = line.next.and_then(|next| self.pipe_cells(next));
            log::debug!("found block table: {}", spec);
            return Detection::Open(TableStart {
                kind: TableType::Block,
                spec,
                consumes_next: line.next.is_some_and(|n| n.starts_with('|')),
                header,
                header_from_previous: false,
                row_is_body: false,
            });
        }

        if raw.starts_with('|') {
            return Detection::Open(self.pipe_start(line));
        }

        if self.simple_rule.is_match(raw) {
            let columns: Vec<Alignment> = self
                .dash_segment
                .find_iter(raw)
                .map(|m| Alignment::of(m.as_str()))
                .collect();
            if columns.len() < 2 {
                // a lone dashed line is a rule, not a table
                return Detection::Pass;
            }
            let header = match line.previous {
                Some(prev) if line.previous_was_prose => Some(self.simple_cells(prev)),
                _ => None,
            };
            log::debug!("found simple table with {} columns", columns.len());
            return Detection::Open(TableStart {
                kind: TableType::Simple,
                spec: column_spec(&columns),
                header_from_previous: header.is_some(),
                header,
                consumes_next: false,
                row_is_body: false,
            });
        }

        Detection::Pass
    }

    fn pipe_start(&self, line: &TableLine<'_>) -> TableStart {
        let raw = line.raw;
        let next_is_rule = line.next.is_some_and(is_separator_row);

        let (spec_line, header, consumes_next, row_is_body) = if next_is_rule {
            // header row, then the rule that gives alignments
            let rule = line.next.unwrap_or_default();
            (rule, self.pipe_cells(raw), true, false)
        } else if is_separator_row(raw) {
            // rule first, header follows (possibly an empty `| |` row)
            let header = line.next.and_then(|next| self.pipe_cells(next));
            let consumes = line.next.is_some_and(|n| n.starts_with('|'));
            (raw, header, consumes, false)
        } else {
            (raw, None, false, true)
        };

        let columns = if is_separator_row(spec_line) {
            self.alignments(spec_line, '|')
        } else {
            vec![Alignment::Left; split_pipe_row(raw).len()]
        };
        log::debug!("found pipe table with {} columns", columns.len());

        TableStart {
            kind: TableType::Pipe,
            spec: column_spec(&columns),
            header,
            header_from_previous: false,
            consumes_next,
            row_is_body,
        }
    }

    fn alignments(&self, rule: &str, delimiter: char) -> Vec<Alignment> {
        rule.split(delimiter)
            .map(str::trim)
            .filter(|segment| segment.contains('-'))
            .map(Alignment::of)
            .collect()
    }

    fn pipe_cells(&self, row: &str) -> Option<Vec<String>> {
        if row.chars().all(|c| c == '|' || c.is_whitespace()) || !row.starts_with('|') {
            return None;
        }
        Some(split_pipe_row(row))
    }

    fn simple_cells(&self, row: &str) -> Vec<String> {
        self.cell_gap
            .split(row.trim())
            .map(|cell| cell.trim().to_string())
            .collect()
    }

    /// Split a body row of the open table into cells.
    pub fn split_row(&self, kind: TableType, row: &str) -> Vec<String> {
        match kind {
            TableType::Simple => self.simple_cells(row),
            _ => split_pipe_row(row),
        }
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// A `|`/`+` framed line made only of dashes, colons and frame characters.
pub fn is_separator_row(line: &str) -> bool {
    let line = line.trim();
    line.contains("--")
        && line
            .chars()
            .all(|c| matches!(c, '|' | '+' | '-' | ':' | '=' | ' '))
}

/// Cells of a `| a | b |` row with the outer pipes removed.
pub fn split_pipe_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// A header or body row in TeX form.
pub fn format_row(cells: &[String]) -> String {
    format!("{} \\\\", cells.join(" & "))
}
