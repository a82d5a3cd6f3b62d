//! # snp
//!
//! Simple Notes Processor: turns one lecture source file written in a
//! compact line-oriented markup into long-form notes (LaTeX article), a
//! slide deck (LaTeX beamer), and a portable Markdown export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use snp::{render, scan_file};
//!
//! fn main() -> snp::Result<()> {
//!     let doc = scan_file("lecture01.sn")?;
//!     println!("{} slides", doc.slide_count);
//!     println!("{}", doc.body(render::Target::Notes));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Single pass**: every line is read once and routed to all targets
//! - **Scoped content**: notes-only and slides-only lines and regions
//! - **Tables**: simple, pipe and block Markdown tables become `tabular`
//! - **Citations**: `[@key]` and `@key` forms, collected for the bibliography
//! - **Concurrent typesetting**: the three targets are formatted in parallel

pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod render;
pub mod scanner;
pub mod typeset;

// Re-export commonly used types
pub use config::{Config, Settings, TexTemplates};
pub use detect::{check_input, find_source_file, is_source_name};
pub use error::{Error, Result};
pub use model::{
    Diagnostic, DiagnosticKind, GraphicEntry, GraphicsRegistry, MetaText, Metadata,
    ScannedDocument,
};
pub use render::{output_base, render_all, Artifact, OutputBuffers, RenderContext, Target};
pub use scanner::{ScanOptions, Scanner, Scope};
pub use typeset::{
    BuildReport, CommandOutcome, CommandRunner, Pipeline, SystemRunner, TargetReport,
    TypesetOptions,
};

use std::path::{Path, PathBuf};

/// Scan source text with default options.
///
/// # Example
///
/// ```
/// let doc = snp::scan_str("T Introduction\ns Overview\n- first point\n").unwrap();
/// assert_eq!(doc.slide_count, 1);
/// ```
pub fn scan_str(source: &str) -> Result<ScannedDocument> {
    Scanner::default().scan(source)
}

/// Scan a source file, resolving graphics next to it.
///
/// # Example
///
/// ```no_run
/// let doc = snp::scan_file("lecture01.sn").unwrap();
/// println!("{} graphics", doc.graphics.len());
/// ```
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<ScannedDocument> {
    Snp::new().scan_file(path).map(|result| result.document)
}

/// Builder for scanning a source file and producing its outputs.
///
/// # Example
///
/// ```no_run
/// use snp::{Config, Snp, SystemRunner, TypesetOptions};
///
/// let config = Config::load_dir("/home/me/.config/snp")?;
/// let result = Snp::new().with_config(config).scan_file("lecture01.sn")?;
/// let report = result.build(".", &SystemRunner, TypesetOptions::new())?;
/// assert!(report.all_ok());
/// # Ok::<(), snp::Error>(())
/// ```
pub struct Snp {
    config: Config,
    scan_options: Option<ScanOptions>,
    graphics_dir: Option<PathBuf>,
    reference_year: Option<i32>,
}

impl Snp {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            scan_options: None,
            graphics_dir: None,
            reference_year: None,
        }
    }

    /// Use loaded settings and templates.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use explicit scan options instead of ones derived from the settings.
    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = Some(options);
        self
    }

    /// Resolve graphics in `dir` instead of the source file's directory.
    pub fn with_graphics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.graphics_dir = Some(dir.into());
        self
    }

    /// Pin the year the `Z` directive is checked against.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    fn options_for(&self, source_dir: &Path) -> ScanOptions {
        let mut options = self
            .scan_options
            .clone()
            .unwrap_or_else(|| ScanOptions::from_settings(&self.config.settings));
        options = options.with_graphics_dir(self.graphics_dir.clone().unwrap_or_else(|| source_dir.to_path_buf()));
        if let Some(year) = self.reference_year {
            options = options.with_reference_year(year);
        }
        options
    }

    /// Scan source text. Graphics resolve against the current directory
    /// unless a graphics directory was set.
    pub fn scan_str(self, source: &str, base: impl Into<String>) -> Result<SnpResult> {
        let options = self.options_for(Path::new("."));
        let document = Scanner::new(options).scan(source)?;
        Ok(SnpResult {
            document,
            config: self.config,
            base: base.into(),
        })
    }

    /// Read and scan a source file.
    pub fn scan_file<P: AsRef<Path>>(self, path: P) -> Result<SnpResult> {
        let path = path.as_ref();
        check_input(path)?;
        let source = std::fs::read_to_string(path)?;

        let source_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let options = self.options_for(source_dir);
        let document = Scanner::new(options).scan(&source)?;
        Ok(SnpResult {
            document,
            config: self.config,
            base: output_base(path),
        })
    }
}

impl Default for Snp {
    fn default() -> Self {
        Self::new()
    }
}

/// A scanned document together with the configuration it renders with.
pub struct SnpResult {
    /// The scan result
    pub document: ScannedDocument,
    /// Settings and templates
    pub config: Config,
    /// Lower-cased stem every output file is named after
    pub base: String,
}

impl SnpResult {
    /// Renderer inputs.
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.document, &self.config.settings, &self.config.templates)
    }

    /// Render notes, slides and the portable export.
    pub fn artifacts(&self) -> Vec<Artifact> {
        render_all(&self.render_context(), &self.base)
    }

    /// Render every target into `dir` and typeset them with `runner`.
    pub fn build<P: AsRef<Path>>(
        &self,
        dir: P,
        runner: &dyn CommandRunner,
        options: TypesetOptions,
    ) -> Result<BuildReport> {
        Pipeline::new(runner, options).build(dir.as_ref(), &self.render_context(), &self.base)
    }

    /// The scan result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document).map_err(|e| Error::Render(e.to_string()))
    }
}
