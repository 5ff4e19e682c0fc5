//! Prose rendering for command-view segments.

use comrak::{markdown_to_html, Options};

pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark to HTML. Raw HTML in the input is escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakRenderer;

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.render.r#unsafe = false;
        options.render.escape = true;
        markdown_to_html(markdown, &options)
    }
}

/// Returns the text unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl MarkdownRenderer for PlainRenderer {
    fn render(&self, markdown: &str) -> String {
        markdown.to_string()
    }
}
