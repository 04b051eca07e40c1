//! The library code for the `kiln` static site generator. A build runs in
//! three phases, each completing before the next starts:
//!
//! 1. Reading ([`site::Site::read`]): layouts, dated posts, and pages are
//!    parsed from the source tree. Every file is split into front matter and
//!    body ([`document`]).
//! 2. Rendering ([`site::Site::render`]): every post and page gets a URL
//!    ([`url`]) and is rendered against a payload describing the whole site.
//!    Post bodies are templated and then converted from markdown; page bodies
//!    are only templated. Each result is then wrapped in its chain of layouts
//!    ([`layout`]).
//! 3. Writing ([`write`]): each rendered item is written to its URL under the
//!    destination directory.
//!
//! [`build::build_site`] runs all three. The binary can then serve the output
//! with a small development server ([`serve`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod document;
pub mod layout;
pub mod markdown;
pub mod page;
pub mod post;
pub mod serve;
pub mod site;
pub mod template;
pub mod url;
pub mod value;
pub mod write;
