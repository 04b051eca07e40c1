//! Markdown to HTML conversion for post bodies.

use pulldown_cmark::{html, Options, Parser};

/// A configured markdown converter. Smart punctuation, footnotes,
/// strikethrough, tables, and task lists are enabled.
#[derive(Clone, Copy, Debug)]
pub struct Markdown {
    options: Options,
}

impl Default for Markdown {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        Markdown { options }
    }
}

impl Markdown {
    pub fn new() -> Markdown {
        Markdown::default()
    }

    /// Converts `markdown` into an HTML string.
    pub fn to_html(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markdown, self.options));
        out
    }
}
