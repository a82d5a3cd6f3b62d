//! Scanning options and configuration.

use std::path::PathBuf;

use crate::config::Settings;

/// Deepest list nesting level an item can request (0-based).
pub const MAX_LIST_DEPTH: usize = 2;

/// Extensions tried, in order, when resolving a `g` directive.
pub const GRAPHIC_EXTENSIONS: &[&str] = &["", ".pdf", ".jpg", ".jpeg", ".png"];

/// Options for scanning a source document.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Spaces per indentation level in the generated TeX
    pub tab_width: usize,

    /// Indentation applied to every fragment
    pub base_indent: usize,

    /// Emphasis delimiter (`**bold**`, `*italic*`)
    pub emphasis: char,

    /// Directory that `g` directives resolve against
    pub graphics_dir: PathBuf,

    /// Year the `Z` directive is checked against (system clock if `None`)
    pub reference_year: Option<i32>,

    /// Initial debug level (overridden by `D`)
    pub debug_level: i32,

    /// Normalize input to Unicode NFC before scanning
    pub normalize_unicode: bool,
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take tab width, initial indent and emphasis delimiter from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tab_width: settings.tab,
            base_indent: settings.indent,
            emphasis: settings.bold,
            ..Self::default()
        }
    }

    /// Set the indentation width.
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }

    /// Set the emphasis delimiter.
    pub fn with_emphasis(mut self, delimiter: char) -> Self {
        self.emphasis = delimiter;
        self
    }

    /// Set the directory graphics are resolved in.
    pub fn with_graphics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.graphics_dir = dir.into();
        self
    }

    /// Pin the year used by the `Z` check.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Set the initial debug level.
    pub fn with_debug_level(mut self, level: i32) -> Self {
        self.debug_level = level;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tab_width: 2,
            base_indent: 0,
            emphasis: '*',
            graphics_dir: PathBuf::from("."),
            reference_year: None,
            debug_level: 0,
            normalize_unicode: true,
        }
    }
}
