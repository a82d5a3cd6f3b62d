//! Two-up variant of the notes: two notes pages per landscape sheet.

use crate::config::TexTemplates;

/// File name of the two-up wrapper for the notes stem `notes_stem`.
pub fn two_up_file_name(notes_stem: &str) -> String {
    format!("{}-2up.tex", notes_stem)
}

/// Wrapper document that includes `<notes_stem>.pdf` two pages per sheet.
pub fn two_up(templates: &TexTemplates, notes_stem: &str) -> String {
    format!("{}{{{}.pdf}}\n{}", templates.nup_top, notes_stem, templates.nup_bottom)
}
