//! LaTeX boilerplate blocks read from the `TeXOptions` file.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::{Diagnostic, DiagnosticKind};

/// Name of the template file inside the config directory.
pub const TEMPLATES_FILE: &str = "TeXOptions";

const DEFAULT_PREAMBLE_COMMON: &str = "\\usepackage{fontspec}
\\usepackage{graphicx}
\\usepackage{booktabs}
\\usepackage{amsmath}
\\usepackage[backend=biber,natbib=true]{biblatex}
\\usepackage{hyperref}
";

const DEFAULT_BEGIN_DOCUMENT: &str = "\\begin{document}\n";

const DEFAULT_NOTES_PREAMBLE: &str = "\\documentclass[a4paper,11pt]{article}
\\usepackage{fancyhdr}
\\pagestyle{fancy}
\\fancyhf{}
\\cfoot{\\thepage}
";

const DEFAULT_NOTES_BEGIN_DOCUMENT: &str = "\\maketitle\n\\thispagestyle{fancy}\n";

const DEFAULT_SLIDES_BEGIN_DOC: &str = "\\documentclass[aspectratio=169]{beamer}\n";

const DEFAULT_SLIDES_PREAMBLE: &str = "\\begin{frame}\n\\titlepage\n";

const DEFAULT_NUP_TOP: &str = "\\documentclass[a4paper]{article}
\\usepackage{pdfpages}
\\begin{document}
\\includepdf[pages=-,nup=1x2,landscape]";

const DEFAULT_NUP_BOTTOM: &str = "\\end{document}\n";

/// Boilerplate wrapped around the scanned bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexTemplates {
    /// Packages shared by notes and slides (`TeXPreambleCommon`)
    pub preamble_common: String,
    /// Shared `\begin{document}` block (`TeXBeginDocument`)
    pub begin_document: String,
    /// Notes document class and packages (`notesTeXPreamble`)
    pub notes_preamble: String,
    /// Notes front matter after `\begin{document}` (`notesTeXBeginDocument`)
    pub notes_begin_document: String,
    /// Slides title frame opener (`slidesTeXPreamble`)
    pub slides_preamble: String,
    /// Slides document class (`slidesTeXBeginDoc`)
    pub slides_begin_document: String,
    /// Two-up wrapper before the PDF name (`nupTop`)
    pub nup_top: String,
    /// Two-up wrapper after the PDF name (`nupBottom`)
    pub nup_bottom: String,
}

impl Default for TexTemplates {
    fn default() -> Self {
        Self {
            preamble_common: DEFAULT_PREAMBLE_COMMON.to_string(),
            begin_document: DEFAULT_BEGIN_DOCUMENT.to_string(),
            notes_preamble: DEFAULT_NOTES_PREAMBLE.to_string(),
            notes_begin_document: DEFAULT_NOTES_BEGIN_DOCUMENT.to_string(),
            slides_preamble: DEFAULT_SLIDES_PREAMBLE.to_string(),
            slides_begin_document: DEFAULT_SLIDES_BEGIN_DOC.to_string(),
            nup_top: DEFAULT_NUP_TOP.to_string(),
            nup_bottom: DEFAULT_NUP_BOTTOM.to_string(),
        }
    }
}

impl TexTemplates {
    /// Load templates from `path`, falling back to defaults if it is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<Diagnostic>)> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No templates at {}, using defaults", path.display());
            return Ok((Self::default(), Vec::new()));
        }
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parse blocks introduced by `Name:` lines. Blocks that are absent keep
    /// their default text.
    pub fn parse(content: &str) -> (Self, Vec<Diagnostic>) {
        let mut templates = Self::default();
        let mut diagnostics = Vec::new();
        let mut current: Option<&str> = None;
        let mut block = String::new();

        for line in content.lines() {
            if let Some(name) = block_name(line) {
                if let Some(prev) = current {
                    templates.assign(prev, std::mem::take(&mut block), &mut diagnostics);
                }
                block.clear();
                current = Some(name);
            } else if current.is_some() {
                block.push_str(line);
                block.push('\n');
            }
        }
        if let Some(prev) = current {
            templates.assign(prev, block, &mut diagnostics);
        }

        (templates, diagnostics)
    }

    fn assign(&mut self, name: &str, text: String, diagnostics: &mut Vec<Diagnostic>) {
        match name {
            "TeXPreambleCommon" => self.preamble_common = text,
            "TeXBeginDocument" => self.begin_document = text,
            "notesTeXPreamble" => self.notes_preamble = text,
            "notesTeXBeginDocument" => self.notes_begin_document = text,
            "slidesTeXPreamble" => self.slides_preamble = text,
            "slidesTeXBeginDoc" => self.slides_begin_document = text,
            "nupTop" => self.nup_top = text.trim().to_string(),
            "nupBottom" => self.nup_bottom = text,
            _ => {
                log::warn!("Unknown block '{}' in {}", name, TEMPLATES_FILE);
                diagnostics.push(Diagnostic::new(
                    0,
                    DiagnosticKind::UnknownConfigKey,
                    format!("unknown block '{}' in {}", name, TEMPLATES_FILE),
                ));
            }
        }
    }
}

/// `Name:` on a line of its own introduces a block.
fn block_name(line: &str) -> Option<&str> {
    let name = line.trim().strip_suffix(':')?;
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some(name)
    } else {
        None
    }
}
