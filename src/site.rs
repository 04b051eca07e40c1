//! Defines the [`Site`] aggregate and its read and render phases. Writing is
//! handled by [`crate::write::Writer`].
//!
//! Reading discovers three kinds of source files under the source root:
//!
//! 1. Layouts, in the layouts directory, keyed by file stem.
//! 2. Posts, in the posts directory, named `YYYY-MM-DD-slug.ext`.
//! 3. Pages: any other file that begins with front matter, outside of the
//!    destination, posts, and layouts directories.
//!
//! Names starting with `.`, `_`, or `#` or ending with `~` are skipped
//! everywhere, along with everything beneath them.
//!
//! Rendering builds one shared payload describing the whole site and renders
//! each post and page against its own copy of it.

use crate::config::Config;
use crate::document::{has_front_matter, Document};
use crate::layout::{self, wrap, Layout, Layouts};
use crate::markdown::Markdown;
use crate::page::{self, split_extension, Page};
use crate::post::{self, Post};
use crate::template::{self, Payload, Templater};
use crate::url;
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tera::{Map, Value};
use walkdir::{DirEntry, WalkDir};

/// The collaborators used to render content: a template engine and a markdown
/// converter.
pub struct Engine<'a> {
    pub templater: &'a dyn Templater,
    pub markdown: &'a Markdown,
}

/// Everything discovered under a source root, and the state of its build.
pub struct Site {
    /// The absolute source root.
    pub source: PathBuf,

    /// The absolute destination root.
    pub dest: PathBuf,

    /// The layouts directory.
    pub layouts_directory: PathBuf,

    /// The posts directory.
    pub posts_directory: PathBuf,

    /// The project configuration file, which is never treated as a page.
    pub config_file: PathBuf,

    pub layouts: Layouts,

    /// Posts in chronological order, oldest first.
    pub posts: Vec<Post>,

    pub pages: Vec<Page>,

    /// Post positions (into `posts`) by category, in the order the posts were
    /// added.
    pub categories: BTreeMap<String, Vec<usize>>,

    /// Post positions (into `posts`) by tag, in the order the posts were
    /// added.
    pub tags: BTreeMap<String, Vec<usize>>,

    /// When the build started.
    pub time: DateTime<Local>,
}

impl Site {
    pub fn new(config: &Config) -> Site {
        Site {
            source: config.source_directory.clone(),
            dest: config.dest_directory.clone(),
            layouts_directory: config.layouts_directory.clone(),
            posts_directory: config.posts_directory.clone(),
            config_file: config.config_file.clone(),
            layouts: Layouts::new(),
            posts: Vec::new(),
            pages: Vec::new(),
            categories: BTreeMap::new(),
            tags: BTreeMap::new(),
            time: Local::now(),
        }
    }

    /// Reads layouts, then posts, then pages.
    pub fn read(&mut self) -> Result<()> {
        self.read_layouts()?;
        self.read_posts()?;
        self.read_pages()?;
        debug!(
            "Read {} layouts, {} posts, {} pages",
            self.layouts.len(),
            self.posts.len(),
            self.pages.len()
        );
        Ok(())
    }

    fn read_layouts(&mut self) -> Result<()> {
        for path in files(&self.layouts_directory)? {
            let name = file_name(&path)?;
            let (stem, extension) = split_extension(&name);
            let document = read_document(&path)?;
            self.layouts.insert(Layout::new(stem, extension, document));
        }
        Ok(())
    }

    fn read_posts(&mut self) -> Result<()> {
        let mut posts = Vec::new();
        for path in files(&self.posts_directory)? {
            let name = file_name(&path)?;
            let document = read_document(&path)?;
            let post = Post::new(&name, document).map_err(|err| Error::Post {
                path: path.clone(),
                err,
            })?;
            posts.push(post);
        }

        // Stable, so posts sharing a date keep file name order.
        posts.sort_by(|a, b| a.date.cmp(&b.date));
        for post in posts {
            self.add_post(post);
        }
        Ok(())
    }

    fn read_pages(&mut self) -> Result<()> {
        let source = &self.source;
        let excluded = [
            self.dest.as_path(),
            self.posts_directory.as_path(),
            self.layouts_directory.as_path(),
        ];
        let walker = WalkDir::new(source)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !(is_reserved(e) || excluded.iter().any(|dir| *dir == e.path()))
            });
        for result in walker {
            let entry = result?;
            if !entry.file_type().is_file() || entry.path() == self.config_file.as_path() {
                continue;
            }
            let path = entry.path();
            let has_block = has_front_matter(path).map_err(|err| Error::Io {
                path: path.to_owned(),
                err,
            })?;
            if !has_block {
                continue;
            }

            let relative_directory = match path.parent().and_then(|p| p.strip_prefix(source).ok()) {
                Some(dir) if dir.as_os_str().is_empty() => String::from("."),
                Some(dir) => dir
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<String>>()
                    .join("/"),
                None => String::from("."),
            };
            let name = file_name(path)?;
            let document = read_document(path)?;
            self.pages.push(Page::new(&relative_directory, &name, document));
        }
        Ok(())
    }

    /// Appends `post` and indexes it under each of its categories and tags.
    pub fn add_post(&mut self, post: Post) {
        let position = self.posts.len();
        for category in &post.categories {
            self.categories
                .entry(category.clone())
                .or_insert_with(Vec::new)
                .push(position);
        }
        for tag in &post.tags {
            self.tags
                .entry(tag.clone())
                .or_insert_with(Vec::new)
                .push(position);
        }
        self.posts.push(post);
    }

    /// The posts filed under `category`, in the order they were added.
    pub fn posts_in_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Post> + 'a {
        self.indexed(self.categories.get(category))
    }

    /// The posts tagged `tag`, in the order they were added.
    pub fn posts_with_tag<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a Post> + 'a {
        self.indexed(self.tags.get(tag))
    }

    fn indexed<'a>(&'a self, positions: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a Post> + 'a {
        positions
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.posts.get(i))
    }

    /// The post after the one at `position`, chronologically.
    pub fn next(&self, position: usize) -> Option<&Post> {
        self.posts.get(position + 1)
    }

    /// The post before the one at `position`, chronologically.
    pub fn previous(&self, position: usize) -> Option<&Post> {
        match position {
            0 => None,
            _ => self.posts.get(position - 1),
        }
    }

    /// Generates URLs for every post and page, then renders every post and
    /// then every page through its layout chain.
    pub fn render(&mut self, engine: &Engine) -> Result<()> {
        for post in self.posts.iter_mut() {
            post.url = Some(url::generate(
                engine.templater,
                post::URL_TEMPLATE,
                &post.placeholders(),
            )?);
        }
        for page in self.pages.iter_mut() {
            page.url = Some(url::generate(
                engine.templater,
                page::URL_TEMPLATE,
                &page.placeholders(),
            )?);
        }

        let projections = self.projections();
        let payload = self.payload(&projections);

        let layouts = &self.layouts;
        for (post, projection) in self.posts.iter_mut().zip(projections) {
            debug!("Rendering post '{}'", post.name);
            let mut page = post.document.metadata.clone();
            page.extend(projection);
            let mut payload = payload.clone();
            payload.insert("page", page.to_value());

            let body = template::render_lenient(
                engine.templater,
                &post.name,
                &post.document.body,
                &payload,
            )?
            .unwrap_or_else(|| post.document.body.clone());
            let body = engine.markdown.to_html(&body);
            post.output = wrap(
                layouts,
                engine.templater,
                &post.document.metadata,
                body,
                &mut payload,
            )?;
        }

        for page in self.pages.iter_mut() {
            let name = format!("{}/{}{}", page.relative_directory, page.basename, page.extension);
            debug!("Rendering page '{}'", name);
            let mut metadata = page.document.metadata.clone();
            metadata.extend(page.summary());
            let mut payload = payload.clone();
            payload.insert("page", metadata.to_value());

            let body =
                template::render_lenient(engine.templater, &name, &page.document.body, &payload)?
                    .unwrap_or_else(|| page.document.body.clone());
            page.output = wrap(
                layouts,
                engine.templater,
                &page.document.metadata,
                body,
                &mut payload,
            )?;
        }
        Ok(())
    }

    // Each post's summary enriched with its neighbours' summaries (null at
    // either end), with the post's own front matter filling in keys the
    // summary doesn't define.
    fn projections(&self) -> Vec<Map<String, Value>> {
        (0..self.posts.len())
            .map(|i| {
                let post = &self.posts[i];
                let mut m = post.summary();
                let neighbour =
                    |p: Option<&Post>| p.map_or(Value::Null, |p| Value::Object(p.summary()));
                m.insert("next".to_owned(), neighbour(self.next(i)));
                m.insert("previous".to_owned(), neighbour(self.previous(i)));
                for (k, v) in post.document.metadata.as_map() {
                    if !m.contains_key(k) {
                        m.insert(k.clone(), v.clone());
                    }
                }
                m
            })
            .collect()
    }

    fn payload(&self, projections: &[Map<String, Value>]) -> Payload {
        let index = |positions: &BTreeMap<String, Vec<usize>>| -> Value {
            let mut m = Map::new();
            for (name, positions) in positions {
                let posts = positions
                    .iter()
                    .filter_map(|&i| projections.get(i))
                    .map(|p| Value::Object(p.clone()))
                    .collect();
                m.insert(name.clone(), Value::Array(posts));
            }
            Value::Object(m)
        };

        let mut site = Map::new();
        site.insert("time".to_owned(), Value::from(self.time.to_rfc3339()));
        site.insert(
            "source".to_owned(),
            Value::from(self.source.to_string_lossy().into_owned()),
        );
        site.insert(
            "posts".to_owned(),
            Value::Array(projections.iter().cloned().map(Value::Object).collect()),
        );
        site.insert("categories".to_owned(), index(&self.categories));
        site.insert("tags".to_owned(), index(&self.tags));
        Payload::new().with("site", Value::Object(site))
    }
}

fn is_reserved(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || name.starts_with('#') || name.ends_with('~')
}

// Lists the regular files under `dir`, recursively, sorted by file name and
// skipping reserved names. A missing directory has no files.
fn files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        warn!("Directory '{}' does not exist", dir.display());
        return Ok(files);
    }
    let walker = WalkDir::new(dir)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_reserved(e));
    for result in walker {
        let entry = result?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))
}

fn read_document(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })?;
    Ok(Document::parse(&path.to_string_lossy(), &contents))
}

/// The result of a fallible read or render operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or rendering a [`Site`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when a directory can't be walked.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned when a post can't be parsed.
    Post { path: PathBuf, err: post::Error },

    /// Returned when content or a URL template fails.
    Template(template::Error),

    /// Returned when a layout chain fails.
    Layout(layout::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::Post { path, err } => {
                write!(f, "Parsing post '{}': {}", path.display(), err)
            }
            Error::Template(err) => err.fmt(f),
            Error::Layout(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(_) => None,
            Error::Post { path: _, err } => Some(err),
            Error::Template(err) => Some(err),
            Error::Layout(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking directories.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<template::Error> for Error {
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<layout::Error> for Error {
    fn from(err: layout::Error) -> Error {
        Error::Layout(err)
    }
}
