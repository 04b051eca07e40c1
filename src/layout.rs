//! Layouts and the layout chain renderer.
//!
//! A layout is a template that wraps content. It can itself declare a parent
//! layout through its `layout` front matter field, so rendering walks a chain:
//! each layout's output becomes the `content` of the next, until a layout has
//! no parent or names one that doesn't exist.

use crate::document::Document;
use crate::template::{self, Payload, Templater};
use crate::value::Metadata;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use tera::Value;

#[derive(Clone, Debug)]
pub struct Layout {
    /// The lookup key: the file name without its extension.
    pub name: String,

    /// The file extension including the leading dot, or empty.
    pub extension: String,

    pub document: Document,
}

impl Layout {
    pub fn new(name: &str, extension: &str, document: Document) -> Layout {
        Layout {
            name: name.to_owned(),
            extension: extension.to_owned(),
            document,
        }
    }

    /// The name of the parent layout, if one is declared.
    pub fn parent(&self) -> Option<&str> {
        self.document.layout()
    }
}

/// The layout table, keyed by layout name.
#[derive(Clone, Debug, Default)]
pub struct Layouts(HashMap<String, Layout>);

impl Layouts {
    pub fn new() -> Layouts {
        Layouts::default()
    }

    /// Adds `layout`, replacing any layout already registered under its name.
    pub fn insert(&mut self, layout: Layout) {
        if let Some(previous) = self.0.insert(layout.name.clone(), layout) {
            debug!("Layout '{}' replaced by a later file", previous.name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Renders `layout` against `payload`, then each ancestor in turn with the
/// previous output as `content`. Executes exactly one template per layout
/// visited. A layout named twice in one chain is an [`Error::Cycle`]. A
/// layout referencing a variable the payload lacks is skipped, along with its
/// ancestors, and the content so far is returned.
pub fn render_chain(
    layouts: &Layouts,
    templater: &dyn Templater,
    layout: &Layout,
    payload: &mut Payload,
) -> Result<String> {
    let mut visited: Vec<&str> = Vec::new();
    let mut current = layout;
    loop {
        if visited.contains(&current.name.as_str()) {
            let mut chain: Vec<String> = visited.iter().map(|s| s.to_string()).collect();
            chain.push(current.name.clone());
            return Err(Error::Cycle(chain));
        }
        visited.push(&current.name);

        let body = &current.document.body;
        let output = match template::render_lenient(templater, &current.name, body, payload)? {
            Some(output) => output,
            None => return Ok(content_of(payload)),
        };
        let parent_name = match current.parent() {
            None => return Ok(output),
            Some(name) => name,
        };
        current = match layouts.get(parent_name) {
            None => {
                debug!(
                    "Layout '{}' names missing parent '{}'",
                    current.name, parent_name
                );
                return Ok(output);
            }
            Some(parent) => parent,
        };
        payload.insert("content", Value::String(output));
    }
}

fn content_of(payload: &Payload) -> String {
    payload
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Wraps `body` in the layout `metadata` declares, if any. An unknown layout
/// is logged and `body` is returned unwrapped.
pub fn wrap(
    layouts: &Layouts,
    templater: &dyn Templater,
    metadata: &Metadata,
    body: String,
    payload: &mut Payload,
) -> Result<String> {
    let name = match metadata.get_str("layout") {
        None => return Ok(body),
        Some(name) => name,
    };
    match layouts.get(name) {
        None => {
            warn!("Layout '{}' not found; rendering without it", name);
            Ok(body)
        }
        Some(layout) => {
            payload.insert("content", Value::String(body));
            render_chain(layouts, templater, layout, payload)
        }
    }
}

/// The result of a fallible layout rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering through a layout chain.
#[derive(Debug)]
pub enum Error {
    /// Returned when a chain of `layout` fields loops back on itself. Holds
    /// the layout names in visiting order, ending with the repeated one.
    Cycle(Vec<String>),

    /// Returned when a layout template fails.
    Template(template::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Cycle(chain) => write!(f, "Layout cycle: {}", chain.join(" -> ")),
            Error::Template(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Cycle(_) => None,
            Error::Template(err) => Some(err),
        }
    }
}

impl From<template::Error> for Error {
    /// Converts [`template::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::split;
    use crate::template::TeraTemplater;
    use std::cell::Cell;

    /// Counts template executions.
    struct Counting {
        inner: TeraTemplater,
        count: Cell<usize>,
    }

    impl Counting {
        fn new() -> Counting {
            Counting {
                inner: TeraTemplater::new(),
                count: Cell::new(0),
            }
        }
    }

    impl Templater for Counting {
        fn render(&self, name: &str, source: &str, payload: &Payload) -> template::Result<String> {
            self.count.set(self.count.get() + 1);
            self.inner.render(name, source, payload)
        }
    }

    fn layouts(entries: &[(&str, &str)]) -> Layouts {
        let mut layouts = Layouts::new();
        for (name, source) in entries {
            layouts.insert(Layout::new(name, ".html", split(source)));
        }
        layouts
    }

    fn content(body: &str) -> Payload {
        Payload::new().with("content", Value::from(body))
    }

    #[test]
    fn test_root_layout_renders_once() -> Result<()> {
        let layouts = layouts(&[("default", "<body>{{ content }}</body>")]);
        let templater = Counting::new();
        let out = render_chain(
            &layouts,
            &templater,
            layouts.get("default").unwrap(),
            &mut content("x"),
        )?;
        assert_eq!("<body>x</body>", out);
        assert_eq!(1, templater.count.get());
        Ok(())
    }

    #[test]
    fn test_chain_renders_each_layout_once() -> Result<()> {
        let layouts = layouts(&[
            ("post", "---\nlayout: page\n---\n<article>{{ content }}</article>"),
            ("page", "---\nlayout: base\n---\n<main>{{ content }}</main>"),
            ("base", "<html>{{ content }}</html>"),
        ]);
        let templater = Counting::new();
        let out = render_chain(
            &layouts,
            &templater,
            layouts.get("post").unwrap(),
            &mut content("x"),
        )?;
        assert_eq!("<html><main><article>x</article></main></html>", out);
        assert_eq!(3, templater.count.get());
        Ok(())
    }

    #[test]
    fn test_missing_parent_terminates() -> Result<()> {
        let layouts = layouts(&[("post", "---\nlayout: nowhere\n---\n<p>{{ content }}</p>")]);
        let out = render_chain(
            &layouts,
            &TeraTemplater::new(),
            layouts.get("post").unwrap(),
            &mut content("x"),
        )?;
        assert_eq!("<p>x</p>", out);
        Ok(())
    }

    #[test]
    fn test_cycle_is_an_error() {
        let layouts = layouts(&[
            ("a", "---\nlayout: b\n---\na{{ content }}"),
            ("b", "---\nlayout: a\n---\nb{{ content }}"),
        ]);
        let templater = Counting::new();
        match render_chain(
            &layouts,
            &templater,
            layouts.get("a").unwrap(),
            &mut content("x"),
        ) {
            Err(Error::Cycle(chain)) => assert_eq!(vec!["a", "b", "a"], chain),
            other => panic!("wanted a cycle error; found {:?}", other),
        }
        assert_eq!(2, templater.count.get());
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let layouts = layouts(&[("a", "---\nlayout: a\n---\n{{ content }}")]);
        assert!(matches!(
            render_chain(
                &layouts,
                &TeraTemplater::new(),
                layouts.get("a").unwrap(),
                &mut content("x"),
            ),
            Err(Error::Cycle(_))
        ));
    }

    #[test]
    fn test_wrap() -> Result<()> {
        let layouts = layouts(&[("default", "<body>{{ content }}</body>")]);
        let templater = TeraTemplater::new();

        let with = split("---\nlayout: default\n---\n");
        let out = wrap(&layouts, &templater, &with.metadata, "x".to_owned(), &mut Payload::new())?;
        assert_eq!("<body>x</body>", out);

        let unknown = split("---\nlayout: missing\n---\n");
        let out = wrap(&layouts, &templater, &unknown.metadata, "x".to_owned(), &mut Payload::new())?;
        assert_eq!("x", out);

        let without = split("no front matter");
        let out = wrap(&layouts, &templater, &without.metadata, "x".to_owned(), &mut Payload::new())?;
        assert_eq!("x", out);
        Ok(())
    }

    #[test]
    fn test_undefined_variable_stops_chain() -> Result<()> {
        let layouts = layouts(&[
            ("post", "---\nlayout: base\n---\n<article>{{ content }}</article>"),
            ("base", "---\nlayout: outer\n---\n<title>{{ page.title }}</title>{{ content }}"),
            ("outer", "<html>{{ content }}</html>"),
        ]);
        let templater = Counting::new();
        let out = render_chain(
            &layouts,
            &templater,
            layouts.get("post").unwrap(),
            &mut content("x"),
        )?;
        assert_eq!("<article>x</article>", out);
        assert_eq!(2, templater.count.get());
        Ok(())
    }

    #[test]
    fn test_later_layout_wins() {
        let mut layouts = Layouts::new();
        layouts.insert(Layout::new("default", ".html", split("first")));
        layouts.insert(Layout::new("default", ".htm", split("second")));
        assert_eq!(1, layouts.len());
        assert_eq!("second", layouts.get("default").unwrap().document.body);
    }
}
