//! Defines the [`Page`] type: any file under the source root, outside the
//! reserved directories, that begins with front matter.

use crate::document::Document;
use crate::post::titleize;
use crate::template::Payload;
use tera::{Map, Value};

/// The URL pattern for pages. A page keeps its location and file name.
pub const URL_TEMPLATE: &str = "/{{ path }}/{{ basename }}{{ ext }}";

#[derive(Clone, Debug)]
pub struct Page {
    pub document: Document,

    /// The directory containing the page relative to the source root, with
    /// `/` separators; `.` for the root itself.
    pub relative_directory: String,

    /// The file name without its extension.
    pub basename: String,

    /// The file extension including the leading dot, or empty.
    pub extension: String,

    /// The generated URL. Populated during the render phase.
    pub url: Option<String>,

    /// The rendered output. Populated during the render phase.
    pub output: String,
}

impl Page {
    pub fn new(relative_directory: &str, name: &str, document: Document) -> Page {
        let (basename, extension) = split_extension(name);
        Page {
            document,
            relative_directory: relative_directory.to_owned(),
            basename: basename.to_owned(),
            extension: extension.to_owned(),
            url: None,
            output: String::new(),
        }
    }

    pub fn is_index(&self) -> bool {
        self.basename == "index"
    }

    /// The `title` front matter field, or the basename in title case.
    pub fn title(&self) -> String {
        match self.document.metadata.get_str("title") {
            Some(title) => title.to_owned(),
            None => titleize(&self.basename),
        }
    }

    /// The values [`URL_TEMPLATE`] is executed against.
    pub fn placeholders(&self) -> Payload {
        Payload::new()
            .with("path", Value::from(self.relative_directory.as_str()))
            .with("basename", Value::from(self.basename.as_str()))
            .with("ext", Value::from(self.extension.as_str()))
    }

    /// The fields templates see for the page alongside its front matter.
    pub fn summary(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("title".to_owned(), Value::from(self.title()));
        m.insert(
            "url".to_owned(),
            Value::from(self.url.clone().unwrap_or_default()),
        );
        m.insert("path".to_owned(), Value::from(self.relative_directory.as_str()));
        m.insert("basename".to_owned(), Value::from(self.basename.as_str()));
        m.insert("index".to_owned(), Value::Bool(self.is_index()));
        m
    }
}

/// Splits a file name at its final `.`, keeping the dot with the extension.
/// A name whose only dot is the leading one (e.g. `.htaccess`) has no
/// extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::split;

    #[test]
    fn test_split_extension() {
        assert_eq!(("index", ".html"), split_extension("index.html"));
        assert_eq!(("archive.tar", ".gz"), split_extension("archive.tar.gz"));
        assert_eq!(("README", ""), split_extension("README"));
        assert_eq!((".htaccess", ""), split_extension(".htaccess"));
    }

    #[test]
    fn test_new_page() {
        let page = Page::new("about", "index.html", split("---\ntitle: About\n---\nhi"));
        assert_eq!("index", page.basename);
        assert_eq!(".html", page.extension);
        assert_eq!("about", page.relative_directory);
        assert!(page.is_index());
        assert_eq!("hi", page.document.body);

        let page = Page::new(".", "feed.xml", split("---\n---\n"));
        assert!(!page.is_index());
    }

    #[test]
    fn test_title() {
        let page = Page::new(".", "about-us.html", split("---\n---\n"));
        assert_eq!("About Us", page.title());
        assert_eq!(Some(&Value::from("About Us")), page.summary().get("title"));

        let page = Page::new(".", "about-us.html", split("---\ntitle: Team\n---\n"));
        assert_eq!("Team", page.title());
    }
}
