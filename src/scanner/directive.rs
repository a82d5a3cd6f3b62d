//! Line-initial directive keys.

use super::state::Scope;

/// Font size command for one-line scoped emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// No size change (`[so]`, `[no]`)
    Unchanged,
    /// `\small`
    Small,
    /// `\footnotesize`
    Footnote,
    /// `\Large`
    Large,
    /// `\normalsize`
    Normal,
    /// `\scriptsize`
    Script,
}

impl Size {
    /// The TeX command that selects this size, if any.
    pub fn command(self) -> Option<&'static str> {
        match self {
            Size::Unchanged => None,
            Size::Small => Some("\\small"),
            Size::Footnote => Some("\\footnotesize"),
            Size::Large => Some("\\Large"),
            Size::Normal => Some("\\normalsize"),
            Size::Script => Some("\\scriptsize"),
        }
    }
}

/// What a line's first token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `T` lecture title
    Title,
    /// `X` course code
    CourseCode,
    /// `N` course name
    CourseName,
    /// `D` debug level
    Debug,
    /// `Z` date with year check
    Date,
    /// `s`, `#`, `##`, ... new section
    Section,
    /// `[soh]` slides-only heading
    SlidesHeading,
    /// `i` open itemize
    Itemize,
    /// `n` open enumerate
    Enumerate,
    /// `d` open description
    Description,
    /// `-` or `1.` list item
    Item,
    /// `:` description item, term on the previous line
    Definition,
    /// `e` close the innermost environment
    Close,
    /// `g` graphic inclusion
    Graphic,
    /// `p` forced page break
    PageBreak,
    /// `q` open quote
    Quote,
    /// `t` open table with explicit column spec
    Table,
    /// One-line emission restricted to a scope
    ScopedLine(Scope, Size),
    /// Start of a scope region
    RegionBegin(Scope),
    /// End of a scope region
    RegionEnd(Scope),
    /// `[bv]` begin leave-alone region
    VerbatimBegin,
    /// `[ev]` end leave-alone region
    VerbatimEnd,
    /// `[preamble]` extra preamble line
    Preamble,
    /// `tcb` two-column begin
    ColumnsBegin,
    /// `tcs` two-column split
    ColumnsSplit,
    /// `tce` two-column end
    ColumnsEnd,
    /// `%` separator or TeX comment
    Percent,
    /// `#%` and other `#`-led comments
    Comment,
    /// Anything else: prose, blank, indented or table rows
    Text,
}

impl Key {
    /// Classify a line's first token.
    pub fn classify(token: &str) -> Self {
        match token {
            "T" => Key::Title,
            "X" => Key::CourseCode,
            "N" => Key::CourseName,
            "D" => Key::Debug,
            "Z" => Key::Date,
            "s" => Key::Section,
            "[soh]" => Key::SlidesHeading,
            "i" => Key::Itemize,
            "n" => Key::Enumerate,
            "d" => Key::Description,
            "-" | "1." => Key::Item,
            ":" => Key::Definition,
            "e" => Key::Close,
            "g" => Key::Graphic,
            "p" => Key::PageBreak,
            "q" => Key::Quote,
            "t" => Key::Table,
            "[so]" | "[slidesonly]" => Key::ScopedLine(Scope::SlidesOnly, Size::Unchanged),
            "[sos]" => Key::ScopedLine(Scope::SlidesOnly, Size::Small),
            "[sof]" => Key::ScopedLine(Scope::SlidesOnly, Size::Footnote),
            "[sol]" => Key::ScopedLine(Scope::SlidesOnly, Size::Large),
            "[son]" => Key::ScopedLine(Scope::SlidesOnly, Size::Normal),
            "[sot]" => Key::ScopedLine(Scope::SlidesOnly, Size::Script),
            "[sob]" | "[slidesonlybegin]" => Key::RegionBegin(Scope::SlidesOnly),
            "[soe]" | "[slidesonlyend]" => Key::RegionEnd(Scope::SlidesOnly),
            "[no]" | "[notesonly]" => Key::ScopedLine(Scope::NotesOnly, Size::Unchanged),
            "[nos]" => Key::ScopedLine(Scope::NotesOnly, Size::Small),
            "[nob]" | "[notesonlybegin]" => Key::RegionBegin(Scope::NotesOnly),
            "[noe]" | "[notesonlyend]" => Key::RegionEnd(Scope::NotesOnly),
            "[bv]" => Key::VerbatimBegin,
            "[ev]" => Key::VerbatimEnd,
            "[preamble]" => Key::Preamble,
            "tcb" => Key::ColumnsBegin,
            "tcs" => Key::ColumnsSplit,
            "tce" => Key::ColumnsEnd,
            "%" => Key::Percent,
            t if !t.is_empty() && t.chars().all(|c| c == '#') => Key::Section,
            t if t.starts_with('#') => Key::Comment,
            t if is_numbered_marker(t) => Key::Item,
            _ => Key::Text,
        }
    }

    /// Whether the key only steers the scanner and never has a portable form.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Key::Debug
                | Key::Itemize
                | Key::Enumerate
                | Key::Description
                | Key::Close
                | Key::PageBreak
                | Key::Table
                | Key::RegionBegin(_)
                | Key::RegionEnd(_)
                | Key::VerbatimBegin
                | Key::VerbatimEnd
                | Key::Preamble
                | Key::ColumnsBegin
                | Key::ColumnsSplit
                | Key::ColumnsEnd
                | Key::Percent
                | Key::Comment
        )
    }
}

/// `1.`, `12.` and similar enumerate markers.
pub fn is_numbered_marker(token: &str) -> bool {
    token
        .strip_suffix('.')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

/// A line split into its key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Classified key
    pub key: Key,
    /// First space-delimited token
    pub token: &'a str,
    /// Remainder of the line, trimmed
    pub value: &'a str,
}

impl<'a> Directive<'a> {
    /// Split `line` at its first space.
    pub fn parse(line: &'a str) -> Self {
        let (token, rest) = line.split_once(' ').unwrap_or((line, ""));
        Self {
            key: Key::classify(token),
            token,
            value: rest.trim(),
        }
    }
}

/// Split a trailing `[style]` off a section title.
pub fn split_frame_style(title: &str) -> (&str, Option<&str>) {
    let trimmed = title.trim_end();
    if trimmed.ends_with(']') {
        if let Some(open) = trimmed.rfind('[') {
            return (trimmed[..open].trim_end(), Some(&trimmed[open..]));
        }
    }
    (trimmed, None)
}

/// Portable-export form of a raw source line, or `None` when the line is a
/// processing instruction with no counterpart in the export.
pub fn portable_form(raw: &str) -> Option<String> {
    let directive = Directive::parse(raw);
    match directive.key {
        key if key.is_control() => None,
        Key::Section | Key::SlidesHeading => {
            let (title, _) = split_frame_style(directive.value);
            let level = match directive.token {
                t if t.starts_with('#') => t,
                _ => "#",
            };
            Some(format!("{} {}", level, title))
        }
        Key::ScopedLine(..) => Some(directive.value.to_string()),
        Key::Quote => Some(format!("> {}", directive.value)),
        Key::Graphic => None,
        _ => Some(raw.trim_end().to_string()),
    }
}
