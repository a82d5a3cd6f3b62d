//! The portable Markdown export.

use super::{RenderContext, Target, TargetRenderer};

/// Renders `<base>-notes.md`: YAML front matter, the portable lines and a
/// references heading when the document cites anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableRenderer;

impl PortableRenderer {
    /// YAML front matter for the export.
    pub fn front_matter(ctx: &RenderContext<'_>) -> String {
        let meta = &ctx.document.metadata;
        let plain = |m: &Option<crate::model::MetaText>| m.as_ref().map(|m| m.plain.clone()).unwrap_or_default();
        let mut lines = vec!["---".to_string()];

        let title = format!(
            "{} {} ({})",
            plain(&meta.course_code),
            plain(&meta.course_name),
            plain(&meta.title)
        );
        lines.push(format!("title: \"{}\"", escape_yaml(title.trim())));

        let mut author = ctx.settings.author1.clone();
        if ctx.settings.has_second_author() {
            author.push_str(" and ");
            author.push_str(&ctx.settings.author2);
        }
        if !author.is_empty() {
            lines.push(format!("author: \"{}\"", escape_yaml(&author)));
        }
        if let Some(date) = &meta.date {
            lines.push(format!("date: \"{}\"", escape_yaml(&date.plain)));
        }
        if let Some(bibliography) = &ctx.settings.bibliography {
            lines.push(format!("bibliography: \"{}\"", escape_yaml(bibliography)));
        }

        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

impl TargetRenderer for PortableRenderer {
    fn target(&self) -> Target {
        Target::Portable
    }

    fn file_name(&self, base: &str) -> String {
        format!("{}-notes.md", base)
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = Self::front_matter(ctx);
        out.push('\n');
        out.push_str(&ctx.document.body(Target::Portable));
        out.push('\n');
        if ctx.document.has_citations {
            out.push_str("\n# References\n");
        }
        out
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
