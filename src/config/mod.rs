//! Configuration loaded from the user's config directory.
//!
//! Two files live there: `snp.ini` with author and layout [`Settings`], and
//! `TeXOptions` with the LaTeX boilerplate blocks ([`TexTemplates`]). Either
//! may be absent, in which case built-in defaults apply.

mod settings;
mod templates;

pub use settings::{Settings, SETTINGS_FILE};
pub use templates::{TexTemplates, TEMPLATES_FILE};

use std::path::Path;

use crate::error::Result;
use crate::model::Diagnostic;

/// Settings and templates together.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from `snp.ini`
    pub settings: Settings,
    /// Blocks from `TeXOptions`
    pub templates: TexTemplates,
    /// Unknown keys and blocks found while loading
    pub diagnostics: Vec<Diagnostic>,
}

impl Config {
    /// Load both files from `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        log::debug!("Reading configuration from files in '{}'", dir.display());

        let (settings, mut diagnostics) = Settings::load(dir.join(SETTINGS_FILE))?;
        let (templates, template_diags) = TexTemplates::load(dir.join(TEMPLATES_FILE))?;
        diagnostics.extend(template_diags);

        Ok(Self {
            settings,
            templates,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "Author1 = Grace Hopper\nTab = 3\n").unwrap();
        fs::write(dir.path().join(TEMPLATES_FILE), "nupBottom:\n\\end{document}\n").unwrap();

        let config = Config::load_dir(dir.path()).unwrap();
        assert_eq!(config.settings.author1, "Grace Hopper");
        assert_eq!(config.settings.tab, 3);
        assert_eq!(config.templates.nup_bottom, "\\end{document}\n");
    }

    #[test]
    fn test_load_empty_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_dir(dir.path()).unwrap();
        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.templates, TexTemplates::default());
    }
}
