//! Author and formatting settings read from `snp.ini`.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Diagnostic, DiagnosticKind};

/// Name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "snp.ini";

/// Author, layout and tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// First author
    pub author1: String,
    /// First author's e-mail
    pub email1: String,
    /// Optional second author
    pub author2: String,
    /// Second author's e-mail
    pub email2: String,
    /// Institution
    pub affiliation: String,
    /// Spaces per indentation level in the generated TeX
    pub tab: usize,
    /// Initial indentation level
    pub indent: usize,
    /// Emphasis delimiter for bold (doubled) and italic (single)
    pub bold: char,
    /// Italic delimiter as configured (emphasis uses `bold` for both)
    pub italic: char,
    /// Bibliography database for the portable export
    pub bibliography: Option<String>,
    /// Stylesheet included when converting the portable export to HTML
    pub stylesheet: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            author1: String::new(),
            email1: String::new(),
            author2: String::new(),
            email2: String::new(),
            affiliation: String::new(),
            tab: 2,
            indent: 0,
            bold: '*',
            italic: '*',
            bibliography: None,
            stylesheet: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if it is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<Diagnostic>)> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok((Self::default(), Vec::new()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse `Key = Value` lines. Reading stops at the first blank line.
    pub fn parse(content: &str) -> Result<(Self, Vec<Diagnostic>)> {
        let mut settings = Self::default();
        let mut diagnostics = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                break;
            }
            if line.trim_start().starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once(" = ").ok_or_else(|| {
                Error::Config(format!("line {} of {}: expected 'Key = Value'", idx + 1, SETTINGS_FILE))
            })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "Author1" => settings.author1 = value.to_string(),
                "Author2" => settings.author2 = value.to_string(),
                "Email1" => settings.email1 = value.to_string(),
                "Email2" => settings.email2 = value.to_string(),
                "Affiliation" => settings.affiliation = value.to_string(),
                "Tab" => settings.tab = parse_number(key, value)?,
                "Indent" => settings.indent = parse_number(key, value)?,
                "bold" => settings.bold = parse_delimiter(key, value)?,
                "italic" => settings.italic = parse_delimiter(key, value)?,
                "Bibliography" => settings.bibliography = Some(value.to_string()),
                "Stylesheet" => settings.stylesheet = Some(value.to_string()),
                // Terminal styling is left to the CLI.
                "ErrorText" => {}
                _ => {
                    log::warn!("No match for key in {}! Key is: {}", SETTINGS_FILE, key);
                    diagnostics.push(Diagnostic::new(
                        0,
                        DiagnosticKind::UnknownConfigKey,
                        format!("unknown key '{}' in {}", key, SETTINGS_FILE),
                    ));
                }
            }
        }

        Ok((settings, diagnostics))
    }

    /// Whether a second author is configured.
    pub fn has_second_author(&self) -> bool {
        !self.author2.is_empty()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a non-negative number, got '{}'", key, value)))
}

fn parse_delimiter(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::Config(format!("{} must be a single character, got '{}'", key, value))),
    }
}
