//! Defines the [`Document`] type, the metadata-plus-body pair shared by posts,
//! pages, and layouts, and the front matter splitter that produces it.
//!
//! A source file may begin with a front matter block:
//!
//! ```md
//! ---
//! title: Hello, world!
//! layout: default
//! ---
//! # Hello
//! ```
//!
//! The block is decoded as YAML into the document's [`Metadata`]; everything
//! after the closing fence (trimmed) is the body. A file without a block is all
//! body.

use crate::value::Metadata;
use log::warn;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const FENCE: &str = "---";

/// A parsed source file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// The decoded front matter; empty if the file had none.
    pub metadata: Metadata,

    /// The content after the front matter, trimmed.
    pub body: String,
}

impl Document {
    /// Splits `input` into a [`Document`]. `origin` names the source in log
    /// messages.
    pub fn parse(origin: &str, input: &str) -> Document {
        match frontmatter_indices(input) {
            None => Document {
                metadata: Metadata::new(),
                body: input.trim().to_owned(),
            },
            Some((yaml_start, yaml_stop, body_start)) => Document {
                metadata: decode(origin, &input[yaml_start..yaml_stop]),
                body: input[body_start..].trim().to_owned(),
            },
        }
    }

    /// Returns the name of the layout this document declares, if any.
    pub fn layout(&self) -> Option<&str> {
        self.metadata.get_str("layout")
    }
}

/// Splits `input` into a [`Document`] without naming its origin.
pub fn split(input: &str) -> Document {
    Document::parse("<input>", input)
}

/// Reports whether the file at `path` begins with a front matter fence.
pub fn has_front_matter(path: &Path) -> io::Result<bool> {
    let mut first = Vec::new();
    BufReader::new(File::open(path)?).read_until(b'\n', &mut first)?;
    Ok(std::str::from_utf8(&first).map_or(false, is_fence))
}

// A fence line is exactly `---`, ignoring its `\n` or `\r\n` terminator.
fn is_fence(line: &str) -> bool {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line) == FENCE
}

// Returns (yaml_start, yaml_stop, body_start), or `None` if `input` has no
// complete front matter block.
fn frontmatter_indices(input: &str) -> Option<(usize, usize, usize)> {
    let mut lines = input.split_inclusive('\n');
    let first = lines.next()?;
    if !is_fence(first) {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            return Some((yaml_start, offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

fn decode(origin: &str, yaml: &str) -> Metadata {
    if yaml.trim().is_empty() {
        return Metadata::new();
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(value) => match Metadata::from_yaml(&value) {
            Some(metadata) => metadata,
            None => {
                warn!("Front matter in '{}' is not a mapping", origin);
                Metadata::new()
            }
        },
        Err(e) => {
            warn!("Failed to parse front matter in '{}': {}", origin, e);
            Metadata::new()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_with_front_matter() {
        let doc = split("---\ntitle: Hi\nlayout: default\n---\n\n# Body\n\n");
        assert_eq!(Some("Hi"), doc.metadata.get_str("title"));
        assert_eq!(Some("default"), doc.layout());
        assert_eq!("# Body", doc.body);
    }

    #[test]
    fn test_split_crlf() {
        let doc = split("---\r\ntitle: Hi\r\n---\r\nbody\r\n");
        assert_eq!(Some("Hi"), doc.metadata.get_str("title"));
        assert_eq!("body", doc.body);
    }

    #[test]
    fn test_split_without_front_matter() {
        let doc = split("  just some text\n---\n");
        assert!(doc.metadata.is_empty());
        assert_eq!("just some text\n---", doc.body);
    }

    #[test]
    fn test_split_missing_closing_fence() {
        let doc = split("---\ntitle: Hi\nbody");
        assert!(doc.metadata.is_empty());
        assert_eq!("---\ntitle: Hi\nbody", doc.body);
    }

    #[test]
    fn test_fence_must_be_whole_line() {
        let doc = split("----\ntitle: Hi\n---\nbody");
        assert!(doc.metadata.is_empty());
        assert_eq!("----\ntitle: Hi\n---\nbody", doc.body);
    }

    #[test]
    fn test_fence_rejects_trailing_whitespace() {
        let doc = split("--- \ntitle: Hi\n---\nbody");
        assert!(doc.metadata.is_empty());
        assert_eq!("--- \ntitle: Hi\n---\nbody", doc.body);

        let doc = split("---\ntitle: Hi\n---\t\nbody");
        assert!(doc.metadata.is_empty());
        assert!(!is_fence("---\t\n"));
        assert!(is_fence("---\r\n"));
        assert!(is_fence("---"));
    }

    #[test]
    fn test_empty_front_matter() {
        let doc = split("---\n---\nbody");
        assert!(doc.metadata.is_empty());
        assert_eq!("body", doc.body);
    }

    #[test]
    fn test_malformed_front_matter_keeps_body() {
        let doc = split("---\ntitle: [unclosed\n---\nbody");
        assert!(doc.metadata.is_empty());
        assert_eq!("body", doc.body);
    }

    #[test]
    fn test_split_is_idempotent_on_body() {
        let doc = split("---\ntitle: Hi\n---\n# Heading\n\nText.\n");
        let again = split(&doc.body);
        assert!(again.metadata.is_empty());
        assert_eq!(doc.body, again.body);
    }

    #[test]
    fn test_has_front_matter() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let with = dir.path().join("with.html");
        let without = dir.path().join("without.html");
        let binary = dir.path().join("image.png");
        std::fs::write(&with, "---\ntitle: x\n---\nbody")?;
        std::fs::write(&without, "<p>body</p>")?;
        std::fs::write(&binary, [0x89, 0x50, 0xff, 0xfe, b'\n'])?;
        assert!(has_front_matter(&with)?);
        assert!(!has_front_matter(&without)?);
        assert!(!has_front_matter(&binary)?);
        Ok(())
    }
}
