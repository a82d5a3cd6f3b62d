//! The long-form notes article.

use super::{RenderContext, Target, TargetRenderer};

/// Renders `<base>-notes.tex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotesRenderer;

impl NotesRenderer {
    fn author(ctx: &RenderContext<'_>) -> String {
        let s = ctx.settings;
        let mut author = format!("\\author{{{}\\\\\\href{{mailto:{}}}{{{}}}", s.author1, s.email1, s.email1);
        if s.has_second_author() {
            author.push_str(&format!(
                "\\\\  \\\\ {}\\\\ \\href{{mailto:{}}}{{{}}}",
                s.author2, s.email2, s.email2
            ));
        }
        author.push_str("}\n\n");
        author
    }
}

impl TargetRenderer for NotesRenderer {
    fn target(&self) -> Target {
        Target::Notes
    }

    fn file_name(&self, base: &str) -> String {
        format!("{}-notes.tex", base)
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let doc = ctx.document;
        let meta = &doc.metadata;
        let mut out = String::new();

        out.push_str(&ctx.templates.notes_preamble);
        out.push_str(&format!(
            "\\title{{{}: {}\\\\{}}}\n",
            meta.course_code_tex(),
            meta.course_name_tex(),
            meta.title_tex()
        ));
        out.push_str(&Self::author(ctx));
        out.push_str(&format!("\\lfoot{{{} ({})}}\n", meta.course_code_tex(), meta.date_tex()));
        out.push_str(&format!("\\rfoot{{{}}}\n", meta.title_tex()));
        out.push_str(&ctx.date_line());
        out.push_str(&ctx.common_preamble());
        out.push_str(&ctx.templates.notes_begin_document);

        out.push_str(&doc.body(Target::Notes));

        if doc.has_citations {
            out.push_str("\n\\printbibliography\n");
        }
        out.push_str("\\end{document}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TexTemplates};
    use crate::model::{MetaText, ScannedDocument};

    fn document() -> ScannedDocument {
        let mut doc = ScannedDocument::default();
        doc.metadata.title = Some(MetaText::new("Intro", "Intro"));
        doc.metadata.course_code = Some(MetaText::new("CS101", "CS101"));
        doc.metadata.course_name = Some(MetaText::new("Computing", "Computing"));
        doc.buffers.notes.push("Body text\n".into());
        doc
    }

    #[test]
    fn test_notes_layout() {
        let doc = document();
        let settings = Settings {
            author1: "Ada".into(),
            email1: "ada@example.org".into(),
            ..Settings::default()
        };
        let templates = TexTemplates::default();
        let out = NotesRenderer.render(&RenderContext::new(&doc, &settings, &templates));

        assert!(out.starts_with("\\documentclass"));
        assert!(out.contains("\\title{CS101: Computing\\\\Intro}\n"));
        assert!(out.contains("\\author{Ada\\\\\\href{mailto:ada@example.org}{ada@example.org}}\n"));
        assert!(out.contains("Body text\n\\end{document}\n"));
        assert!(!out.contains("\\printbibliography"));
        assert!(!out.contains("\\date{"));
    }

    #[test]
    fn test_notes_bibliography_when_cited() {
        let mut doc = document();
        doc.has_citations = true;
        let settings = Settings::default();
        let templates = TexTemplates::default();
        let out = NotesRenderer.render(&RenderContext::new(&doc, &settings, &templates));
        assert!(out.ends_with("\n\\printbibliography\n\\end{document}\n"));
    }
}
