//! Defines the [`Post`] type and its [`Error`]. A post's identity (date, slug,
//! and extension) comes from its file name, which must look like
//! `YYYY-MM-DD-slug.ext`. See [`Post::summary`] for the projection of a post
//! that templates see.

use crate::document::Document;
use crate::template::Payload;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tera::{Map, Value};

/// The URL pattern for posts.
pub const URL_TEMPLATE: &str =
    "/{{ categories }}/{{ year }}/{{ month }}/{{ day }}/{{ slug }}.html";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A dated piece of content read from the posts directory.
#[derive(Clone, Debug)]
pub struct Post {
    /// The parsed source file.
    pub document: Document,

    /// The post date: the `date` front matter field if present, otherwise the
    /// date in the file name.
    pub date: NaiveDate,

    /// The source file name.
    pub name: String,

    pub slug: String,

    /// The source file extension, without the leading dot.
    pub extension: String,

    pub categories: Vec<String>,

    pub tags: Vec<String>,

    /// The generated URL. Populated during the render phase.
    pub url: Option<String>,

    /// The rendered output. Populated during the render phase.
    pub output: String,
}

impl Post {
    /// Builds a [`Post`] from its file name and parsed contents.
    pub fn new(name: &str, document: Document) -> Result<Post> {
        let (date, slug, extension) = match_name(name)?;
        let date = match document.metadata.get("date") {
            None => parse_date(date)?,
            Some(Value::String(s)) => parse_date(s)?,
            Some(other) => return Err(Error::InvalidDate(other.to_string())),
        };
        let slug = slug.to_owned();
        let extension = extension.to_owned();
        let categories = document.metadata.get_strings("categories");
        let tags = document.metadata.get_strings("tags");

        Ok(Post {
            document,
            date,
            name: name.to_owned(),
            slug,
            extension,
            categories,
            tags,
            url: None,
            output: String::new(),
        })
    }

    /// The `title` front matter field, or the slug in title case.
    pub fn title(&self) -> String {
        match self.document.metadata.get_str("title") {
            Some(title) => title.to_owned(),
            None => titleize(&self.slug),
        }
    }

    /// The `published` front matter field; `false` if absent.
    pub fn published(&self) -> bool {
        self.document.metadata.get_bool("published", false)
    }

    /// The values [`URL_TEMPLATE`] is executed against.
    pub fn placeholders(&self) -> Payload {
        Payload::new()
            .with("categories", Value::from(self.categories.join("/")))
            .with("year", Value::from(self.date.year()))
            .with("month", Value::from(self.date.month()))
            .with("day", Value::from(self.date.day()))
            .with("slug", Value::from(self.slug.as_str()))
    }

    /// Projects the post into the fields templates see for it: `title`,
    /// `url`, `date`, `slug`, `tags`, `categories`, and `published`.
    pub fn summary(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("title".to_owned(), Value::from(self.title()));
        m.insert(
            "url".to_owned(),
            Value::from(self.url.clone().unwrap_or_default()),
        );
        m.insert(
            "date".to_owned(),
            Value::from(self.date.format(DATE_FORMAT).to_string()),
        );
        m.insert("slug".to_owned(), Value::from(self.slug.as_str()));
        m.insert("tags".to_owned(), Value::from(self.tags.clone()));
        m.insert("categories".to_owned(), Value::from(self.categories.clone()));
        m.insert("published".to_owned(), Value::Bool(self.published()));
        m
    }
}

/// Splits a post file name into its date, slug, and extension.
///
/// ```
/// assert_eq!(
///     ("18-11-2013", "first-item", "md"),
///     kiln::post::match_name("18-11-2013-first-item.md").unwrap(),
/// );
/// ```
pub fn match_name(name: &str) -> Result<(&str, &str, &str)> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+-[0-9]+-[0-9]+)-([a-zA-Z0-9\-]+)\.([a-zA-Z0-9]+)$")
            .expect("post name pattern is valid")
    });
    match pattern.captures(name) {
        Some(c) => match (c.get(1), c.get(2), c.get(3)) {
            (Some(date), Some(slug), Some(ext)) => {
                Ok((date.as_str(), slug.as_str(), ext.as_str()))
            }
            _ => Err(Error::InvalidName(name.to_owned())),
        },
        None => Err(Error::InvalidName(name.to_owned())),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|err| Error::ParseDate {
        value: s.to_owned(),
        err,
    })
}

/// Converts a slug into a human-readable title: `"first-item"` becomes
/// `"First Item"`.
pub fn titleize(slug: &str) -> String {
    slug.split('-')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let mut chars = chunk.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a file name doesn't match `YYYY-MM-DD-slug.ext`.
    InvalidName(String),

    /// Returned when a date isn't a valid `YYYY-MM-DD` date.
    ParseDate {
        value: String,
        err: chrono::ParseError,
    },

    /// Returned when the `date` front matter field isn't a string.
    InvalidDate(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidName(name) => {
                write!(f, "Could not match post name `{}`", name)
            }
            Error::ParseDate { value, err } => {
                write!(f, "Invalid date `{}`: {}", value, err)
            }
            Error::InvalidDate(value) => {
                write!(f, "Invalid date `{}`: expected YYYY-MM-DD", value)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidName(_) => None,
            Error::ParseDate { value: _, err } => Some(err),
            Error::InvalidDate(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::split;

    #[test]
    fn test_match_name() -> Result<()> {
        assert_eq!(
            ("18-11-2013", "first-item", "md"),
            match_name("18-11-2013-first-item.md")?
        );
        assert_eq!(
            ("2020-01-02", "10-tips", "markdown"),
            match_name("2020-01-02-10-tips.markdown")?
        );
        Ok(())
    }

    #[test]
    fn test_match_name_rejects() {
        for name in &[
            "hello.md",
            "2020-01-hello.md",
            "2020-01-02-hello",
            "2020-01-02-hello world.md",
            "2020-01-02-.md",
        ] {
            match match_name(name) {
                Err(Error::InvalidName(n)) => assert_eq!(*name, n),
                other => panic!("wanted InvalidName for {}; found {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_new_post() -> Result<()> {
        let post = Post::new(
            "2020-01-02-hello-world.md",
            split("---\ncategories: [blog, rust]\ntags: [intro]\n---\nbody"),
        )?;
        assert_eq!(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), post.date);
        assert_eq!("hello-world", post.slug);
        assert_eq!("md", post.extension);
        assert_eq!(vec!["blog", "rust"], post.categories);
        assert_eq!(vec!["intro"], post.tags);
        assert_eq!("Hello World", post.title());
        assert!(!post.published());
        Ok(())
    }

    #[test]
    fn test_front_matter_overrides() -> Result<()> {
        let post = Post::new(
            "2020-01-02-hello.md",
            split("---\ntitle: Greetings\ndate: 2021-03-04\npublished: true\n---\n"),
        )?;
        assert_eq!(NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(), post.date);
        assert_eq!("Greetings", post.title());
        assert!(post.published());
        assert!(post.categories.is_empty());
        assert!(post.tags.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_dates_are_fatal() {
        assert!(matches!(
            Post::new("2020-13-40-hello.md", split("body")),
            Err(Error::ParseDate { .. })
        ));
        assert!(matches!(
            Post::new("18-11-2013-first-item.md", split("body")),
            Err(Error::ParseDate { .. })
        ));
        assert!(matches!(
            Post::new("2020-01-02-hello.md", split("---\ndate: yesterday\n---\n")),
            Err(Error::ParseDate { .. })
        ));
        assert!(matches!(
            Post::new("2020-01-02-hello.md", split("---\ndate: 5\n---\n")),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn test_titleize() {
        assert_eq!("First Item", titleize("first-item"));
        assert_eq!("A B", titleize("-a--b-"));
        assert_eq!("", titleize(""));
    }

    #[test]
    fn test_placeholders() -> Result<()> {
        let post = Post::new(
            "2020-01-02-hello.md",
            split("---\ncategories: [a, b]\n---\n"),
        )?;
        let p = post.placeholders();
        assert_eq!(Some(&Value::from("a/b")), p.get("categories"));
        assert_eq!(Some(&Value::from(2020)), p.get("year"));
        assert_eq!(Some(&Value::from(1)), p.get("month"));
        assert_eq!(Some(&Value::from(2)), p.get("day"));
        Ok(())
    }
}
