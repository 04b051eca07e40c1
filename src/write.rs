//! The write phase: persists every rendered post and page under the
//! destination root at its generated URL.

use crate::site::Site;
use log::debug;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Writes rendered output beneath `dest`.
pub struct Writer<'a> {
    /// The destination root. A URL `/a/b.html` is written to `{dest}/a/b.html`.
    pub dest: &'a Path,
}

impl Writer<'_> {
    /// Writes every post and then every page of a rendered [`Site`]. Existing
    /// files are overwritten.
    pub fn write_site(&self, site: &Site) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let posts = site.posts.iter().map(|p| (p.url.as_deref(), p.output.as_str()));
        let pages = site.pages.iter().map(|p| (p.url.as_deref(), p.output.as_str()));
        for (url, output) in posts.chain(pages) {
            let url = url.ok_or(Error::Unrendered)?;
            self.write_file(&mut seen_dirs, url, output)?;
        }
        Ok(())
    }

    fn write_file(&self, seen_dirs: &mut HashSet<PathBuf>, url: &str, output: &str) -> Result<()> {
        let path = self.path_for(url);
        if let Some(dir) = path.parent() {
            if seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                    path: dir.to_owned(),
                    err,
                })?;
            }
        }
        debug!("Writing '{}'", path.display());
        std::fs::write(&path, output).map_err(|err| Error::Io { path, err })
    }

    /// The file path for `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let mut path = self.dest.to_owned();
        for segment in url.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }
}

/// The result of a fallible write operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing output files.
#[derive(Debug)]
pub enum Error {
    /// Returned when a directory or file can't be written.
    Io { path: PathBuf, err: io::Error },

    /// Returned when asked to write a site that hasn't been rendered.
    Unrendered,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Unrendered => write!(f, "Site must be rendered before it is written"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::Unrendered => None,
        }
    }
}
