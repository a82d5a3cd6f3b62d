//! The `g` graphics directive: `name[n1,n2,extra]`.

use std::path::Path;

use super::options::GRAPHIC_EXTENSIONS;
use super::state::Scope;
use crate::error::{Error, Result};
use crate::render::Target;

/// A parsed `g` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicRequest {
    /// File name as written (extension optional)
    pub name: String,
    /// Scale for the notes
    pub notes_scale: Option<String>,
    /// Scale for the slides
    pub slides_scale: Option<String>,
    /// Extra `\includegraphics` options, passed through verbatim
    pub extra: Option<String>,
}

impl GraphicRequest {
    /// Parse the directive value. The bracketed arguments may also lead,
    /// as in `[50] name`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let (name, args) = match (value.find('['), value.rfind(']')) {
            (Some(0), Some(close)) => (value[close + 1..].trim(), &value[1..close]),
            (Some(open), Some(close)) if open < close => (value[..open].trim(), &value[open + 1..close]),
            _ => (value, ""),
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let (notes_scale, slides_scale, extra) = match parts.as_slice() {
            [""] => (None, None, None),
            [one] => (Some(one.to_string()), Some(one.to_string()), None),
            [notes, slides] => (Some(notes.to_string()), Some(slides.to_string()), None),
            [notes, slides, rest @ ..] => (
                Some(notes.to_string()),
                Some(slides.to_string()),
                Some(rest.join(",")),
            ),
            [] => (None, None, None),
        };

        Self {
            name: name.to_string(),
            notes_scale: notes_scale.filter(|s| !s.is_empty()),
            slides_scale: slides_scale.filter(|s| !s.is_empty()),
            extra: extra.filter(|s| !s.is_empty()),
        }
    }

    /// Find the file in `dir`, trying the bare name and then each known
    /// extension. Returns the resolved file name and its size in bytes.
    pub fn resolve(&self, dir: &Path) -> Result<(String, u64)> {
        if !self.name.is_empty() {
            for ext in GRAPHIC_EXTENSIONS {
                let file_name = format!("{}{}", self.name, ext);
                let path = dir.join(&file_name);
                if let Ok(meta) = std::fs::metadata(&path) {
                    if meta.is_file() {
                        log::debug!("resolved graphic '{}' to {}", self.name, path.display());
                        return Ok((file_name, meta.len()));
                    }
                }
            }
        }
        Err(Error::GraphicNotFound(self.name.clone()))
    }

    fn include(&self, scale: Option<&str>) -> String {
        let mut options: Vec<String> = Vec::new();
        if let Some(scale) = scale {
            options.push(format!("scale={}", scale));
        }
        if let Some(extra) = &self.extra {
            options.push(extra.clone());
        }
        if options.is_empty() {
            format!("\\includegraphics{{{}}}\n", self.name)
        } else {
            format!("\\includegraphics[{}]{{{}}}\n", options.join(","), self.name)
        }
    }

    /// Inclusion fragments with the scope each is emitted under. Distinct
    /// notes and slides scales split a both-targets emission in two.
    pub fn fragments(&self, scope: Scope) -> Vec<(Scope, String)> {
        let notes = self.include(self.notes_scale.as_deref());
        let slides = self.include(self.slides_scale.as_deref());

        match scope {
            Scope::Both if notes == slides => vec![(Scope::Both, notes)],
            Scope::Both => vec![(Scope::NotesOnly, notes), (Scope::SlidesOnly, slides)],
            scope if scope.includes(Target::Notes) => vec![(scope, notes)],
            scope => vec![(scope, slides)],
        }
    }
}
