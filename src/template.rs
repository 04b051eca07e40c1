//! Template execution. Every template in the pipeline (content bodies, layout
//! bodies, and URL patterns) is compiled and executed through the
//! [`Templater`] trait against a [`Payload`]. The production implementation,
//! [`TeraTemplater`], is backed by [`tera`].

use log::warn;
use std::fmt;
use tera::{Context, Map, Tera, Value};

/// The data context a template is executed against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Payload {
        Payload::default()
    }

    /// Inserts `value` under `key`, replacing any previous value.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style [`Payload::insert`].
    pub fn with<K: Into<String>>(mut self, key: K, value: Value) -> Payload {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Compiles a template source and executes it against a payload.
pub trait Templater {
    /// Renders `source` against `payload`. `name` identifies the template in
    /// errors.
    fn render(&self, name: &str, source: &str, payload: &Payload) -> Result<String>;
}

/// A [`Templater`] backed by [`tera`]. Output is not HTML-escaped since
/// content is already HTML by the time it is threaded through layouts.
#[derive(Clone, Debug, Default)]
pub struct TeraTemplater {
    autoescape: bool,
}

impl TeraTemplater {
    pub fn new() -> TeraTemplater {
        TeraTemplater::default()
    }
}

impl Templater for TeraTemplater {
    fn render(&self, name: &str, source: &str, payload: &Payload) -> Result<String> {
        let context = Context::from_serialize(payload.as_map()).map_err(|err| Error {
            name: name.to_owned(),
            err,
        })?;
        Tera::one_off(source, &context, self.autoescape).map_err(|err| Error {
            name: name.to_owned(),
            err,
        })
    }
}

/// Renders like [`Templater::render`], except that a reference to a variable
/// the payload doesn't define is logged and yields `None`. Any other failure
/// is returned.
pub fn render_lenient(
    templater: &dyn Templater,
    name: &str,
    source: &str,
    payload: &Payload,
) -> Result<Option<String>> {
    match templater.render(name, source, payload) {
        Ok(output) => Ok(Some(output)),
        Err(err) if err.is_undefined_variable() => {
            warn!("{}; leaving it unrendered", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// An error compiling or executing a template.
#[derive(Debug)]
pub struct Error {
    /// The template that failed.
    pub name: String,

    /// The underlying [`tera`] error.
    pub err: tera::Error,
}

impl Error {
    /// Reports whether the template referenced a variable missing from its
    /// payload.
    pub fn is_undefined_variable(&self) -> bool {
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&self.err);
        while let Some(err) = source {
            if err.to_string().contains("not found in context") {
                return true;
            }
            source = err.source();
        }
        false
    }
}

impl fmt::Display for Error {
    /// Displays the template name followed by the full [`tera`] error chain.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rendering template '{}': {}", self.name, self.err)?;
        let mut source = std::error::Error::source(&self.err);
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_fields() -> Result<()> {
        let mut page = Map::new();
        page.insert("title".to_owned(), Value::from("Hi"));
        let payload = Payload::new()
            .with("content", Value::from("<p>x</p>"))
            .with("page", Value::Object(page));
        let out = TeraTemplater::new().render(
            "t",
            "<h1>{{ page.title }}</h1>{{ content }}",
            &payload,
        )?;
        assert_eq!("<h1>Hi</h1><p>x</p>", out);
        Ok(())
    }

    #[test]
    fn test_insert_overwrites() {
        let mut payload = Payload::new().with("content", Value::from("old"));
        payload.insert("content", Value::from("new"));
        assert_eq!(Some(&Value::from("new")), payload.get("content"));
    }

    #[test]
    fn test_undefined_variable_is_lenient() -> Result<()> {
        let templater = TeraTemplater::new();
        let payload = Payload::new().with("content", Value::from("x"));
        assert_eq!(
            None,
            render_lenient(&templater, "t", "<title>{{ page.title }}</title>", &payload)?
        );
        assert_eq!(
            Some("x".to_owned()),
            render_lenient(&templater, "t", "{{ content }}", &payload)?
        );
        assert!(render_lenient(&templater, "t", "{% if %}", &payload).is_err());
        Ok(())
    }

    #[test]
    fn test_unparsable_template_fails() {
        let err = TeraTemplater::new()
            .render("broken", "{% if %}", &Payload::new())
            .unwrap_err();
        assert_eq!("broken", err.name);
        assert!(!err.is_undefined_variable());
        assert!(err.to_string().starts_with("Rendering template 'broken'"));
    }
}
