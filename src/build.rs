//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: reading the source tree
//! ([`Site::read`]), rendering posts and pages through their layouts
//! ([`Site::render`]), and writing the results to disk ([`Writer::write_site`]).

use crate::config::Config;
use crate::site::{Engine, Error as SiteError, Site};
use crate::write::{Error as WriteError, Writer};
use log::info;
use std::fmt;
use std::time::Instant;

/// Builds the site described by `config`. Stops at the first fatal error;
/// files written before it remain on disk.
pub fn build_site(config: &Config, engine: &Engine) -> Result<Site> {
    info!("Generate [{}]", config.source_directory.display());
    let start = Instant::now();

    let mut site = Site::new(config);
    site.read()?;
    site.render(engine)?;
    Writer {
        dest: &config.dest_directory,
    }
    .write_site(&site)?;

    info!(
        "Done! [{:?}] {} posts, {} pages",
        start.elapsed(),
        site.posts.len(),
        site.pages.len()
    );
    Ok(site)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site: failures while reading or rendering,
/// and failures while writing.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors reading or rendering.
    Site(SiteError),

    /// Returned for errors writing output files.
    Write(WriteError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Site(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Site(err) => Some(err),
            Error::Write(err) => Some(err),
        }
    }
}

impl From<SiteError> for Error {
    /// Converts [`SiteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SiteError) -> Error {
        Error::Site(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
