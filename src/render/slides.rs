//! The beamer slide deck.

use super::{RenderContext, Target, TargetRenderer};

/// Renders `<base>-slides.tex`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlidesRenderer;

impl SlidesRenderer {
    fn author(ctx: &RenderContext<'_>) -> String {
        let s = ctx.settings;
        if s.has_second_author() {
            format!(
                "\\author{{\n\\small\n\\texorpdfstring{{\n  \\begin{{columns}}\n    \\column{{0.45\\linewidth}}\n      \\centering\n      {}\\newline\\href{{mailto:{}}}{{{}}}\n    \\column{{0.45\\linewidth}}\n      \\centering\n      {}\\newline\\href{{mailto:{}}}{{{}}}\n  \\end{{columns}}\n }}{{{} and {}}}\n}}\n\n",
                s.author1, s.email1, s.email1, s.author2, s.email2, s.email2, s.author1, s.author2
            )
        } else {
            format!(
                "\\author{{{}\n\\newline$<$\\href{{mailto:{}}}{{{}}}$>$}}\n\n",
                s.author1, s.email1, s.email1
            )
        }
    }
}

impl TargetRenderer for SlidesRenderer {
    fn target(&self) -> Target {
        Target::Slides
    }

    fn file_name(&self, base: &str) -> String {
        format!("{}-slides.tex", base)
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let doc = ctx.document;
        let meta = &doc.metadata;
        let mut out = String::new();

        out.push_str(&ctx.templates.slides_begin_document);
        out.push_str(&format!("\\title{{{}}}\n", meta.title_tex()));
        out.push_str(&format!(
            "\\subtitle{{{} {}}}\n",
            meta.course_code_tex(),
            meta.course_name_tex()
        ));
        out.push_str(&Self::author(ctx));
        out.push_str(&format!("\\institute{{{}}}\n\n\n", ctx.settings.affiliation));
        out.push_str(&ctx.common_preamble());
        out.push_str(&ctx.date_line());
        // opens the title frame; the first section closes it
        out.push_str(&ctx.templates.slides_preamble);

        out.push_str(&doc.body(Target::Slides));
        out.push_str("\\end{frame}\n\\end{document}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TexTemplates};
    use crate::model::{MetaText, ScannedDocument};

    #[test]
    fn test_slides_layout() {
        let mut doc = ScannedDocument::default();
        doc.metadata.title = Some(MetaText::new("Intro", "Intro"));
        doc.metadata.date = Some(MetaText::new("March 12, 2016", "March 12, 2016"));
        doc.buffers
            .slides
            .push("\\end{frame}\n\n\\begin{frame}\\frametitle{One}\n".into());
        let settings = Settings {
            author1: "Ada".into(),
            affiliation: "Analytical Society".into(),
            ..Settings::default()
        };
        let templates = TexTemplates::default();
        let out = SlidesRenderer.render(&RenderContext::new(&doc, &settings, &templates));

        assert!(out.starts_with("\\documentclass[aspectratio=169]{beamer}\n\\title{Intro}\n"));
        assert!(out.contains("\\institute{Analytical Society}\n"));
        assert!(out.contains("\\date{March 12, 2016}\n\\begin{frame}\n\\titlepage\n"));
        assert!(out.ends_with("\\frametitle{One}\n\\end{frame}\n\\end{document}\n"));
        assert_eq!(out.matches("\\begin{frame}").count(), out.matches("\\end{frame}").count());
    }

    #[test]
    fn test_two_author_block() {
        let doc = ScannedDocument::default();
        let settings = Settings {
            author1: "Ada".into(),
            author2: "Charles".into(),
            ..Settings::default()
        };
        let templates = TexTemplates::default();
        let out = SlidesRenderer.render(&RenderContext::new(&doc, &settings, &templates));
        assert!(out.contains("\\begin{columns}"));
        assert!(out.contains("{Ada and Charles}"));
    }
}
