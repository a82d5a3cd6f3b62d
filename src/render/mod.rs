//! Renderers that wrap the scanned bodies into complete documents.
//!
//! Each output target has its own renderer: the notes article, the beamer
//! slides and the portable Markdown export. A fourth, small wrapper produces
//! the two-up variant of the notes PDF.

mod buffers;
mod notes;
mod portable;
mod slides;
mod twoup;

pub use buffers::{OutputBuffers, Target};
pub use notes::NotesRenderer;
pub use portable::PortableRenderer;
pub use slides::SlidesRenderer;
pub use twoup::{two_up, two_up_file_name};

use std::path::{Path, PathBuf};

use crate::config::{Settings, TexTemplates};
use crate::error::Result;
use crate::model::ScannedDocument;

/// Everything a renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Scan result
    pub document: &'a ScannedDocument,
    /// Author settings
    pub settings: &'a Settings,
    /// LaTeX boilerplate
    pub templates: &'a TexTemplates,
}

impl<'a> RenderContext<'a> {
    /// Bundle the renderer inputs.
    pub fn new(document: &'a ScannedDocument, settings: &'a Settings, templates: &'a TexTemplates) -> Self {
        Self {
            document,
            settings,
            templates,
        }
    }

    /// Shared preamble: common packages, `[preamble]` lines, PDF metadata and
    /// the shared begin-document block.
    pub fn common_preamble(&self) -> String {
        let meta = &self.document.metadata;
        let mut out = String::new();
        out.push_str(&self.templates.preamble_common);
        out.push_str(&self.document.preamble);
        out.push_str("\\hypersetup{\n");
        out.push_str(&format!(
            "    pdftitle    = {{{}: {}}},\n",
            meta.course_code_tex(),
            meta.course_name_tex()
        ));
        out.push_str(&format!("    pdfsubject  = {{{}}},\n", meta.title_tex()));
        out.push_str(&format!(
            "    pdfkeywords = {{{} {}}},\n",
            meta.course_name_tex(),
            meta.title_tex()
        ));
        out.push_str(&format!(
            "    pdfauthor   = {{{}, {}}}\n}}\n",
            self.settings.author1, self.settings.affiliation
        ));
        out.push_str(&self.templates.begin_document);
        out
    }

    /// `\date{...}` line, or empty when no date was given.
    pub fn date_line(&self) -> String {
        match &self.document.metadata.date {
            Some(date) => format!("\\date{{{}}}\n", date.tex),
            None => String::new(),
        }
    }
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Target the file belongs to
    pub target: Target,
    /// File name relative to the output directory
    pub file_name: String,
    /// Full file content
    pub content: String,
}

impl Artifact {
    /// File name without its extension (what the typesetter is given).
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem)
    }

    /// Write the artifact into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        log::info!("wrote {} ({} bytes)", path.display(), self.content.len());
        Ok(path)
    }
}

/// A renderer for one output target.
pub trait TargetRenderer: Send + Sync {
    /// The target this renderer produces.
    fn target(&self) -> Target;

    /// Output file name for the lower-cased input stem `base`.
    fn file_name(&self, base: &str) -> String;

    /// Render the full document.
    fn render(&self, ctx: &RenderContext<'_>) -> String;

    /// Render into an [`Artifact`].
    fn artifact(&self, ctx: &RenderContext<'_>, base: &str) -> Artifact {
        Artifact {
            target: self.target(),
            file_name: self.file_name(base),
            content: self.render(ctx),
        }
    }
}

/// Lower-cased file stem of the input, used to name every output.
pub fn output_base(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "lecture".to_string())
}

/// One renderer per target, in [`Target::ALL`] order.
pub fn renderers() -> [&'static dyn TargetRenderer; 3] {
    [&NotesRenderer, &SlidesRenderer, &PortableRenderer]
}

/// Render all three targets.
pub fn render_all(ctx: &RenderContext<'_>, base: &str) -> Vec<Artifact> {
    renderers().iter().map(|r| r.artifact(ctx, base)).collect()
}
