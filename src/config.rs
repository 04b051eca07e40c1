//! Resolves the build configuration: the source root, plus an optional
//! `kiln.yaml` project file in it that can rename the destination, posts, and
//! layouts directories and change the dev server port.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the optional project file in the source root.
pub const PROJECT_FILE: &str = "kiln.yaml";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    dest: PathBuf,
    posts: PathBuf,
    layouts: PathBuf,
    port: u16,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            dest: PathBuf::from("_site"),
            posts: PathBuf::from("_posts"),
            layouts: PathBuf::from("_layouts"),
            port: 8080,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source_directory: PathBuf,
    pub dest_directory: PathBuf,
    pub posts_directory: PathBuf,
    pub layouts_directory: PathBuf,
    pub config_file: PathBuf,
    pub port: u16,
}

impl Config {
    /// Loads the configuration for the site rooted at `dir`. Fails if `dir`
    /// can't be resolved or the project file is malformed.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let source = dir
            .canonicalize()
            .with_context(|| format!("Resolving source directory `{}`", dir.display()))?;
        if !source.is_dir() {
            return Err(anyhow!("Source `{}` is not a directory", source.display()));
        }

        let path = source.join(PROJECT_FILE);
        let project = if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Opening project file `{}`", path.display()))?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("Loading configuration `{}`", path.display()))?
        } else {
            Project::default()
        };
        Ok(Config::from_project(source, project))
    }

    /// Builds a configuration with default directory names, with `dest`
    /// resolved against `source`. Does not touch the file system.
    pub fn from_paths(source: &Path, dest: &Path) -> Config {
        Config::from_project(
            source.to_owned(),
            Project {
                dest: dest.to_owned(),
                ..Project::default()
            },
        )
    }

    fn from_project(source: PathBuf, project: Project) -> Config {
        Config {
            dest_directory: source.join(project.dest),
            posts_directory: source.join(project.posts),
            layouts_directory: source.join(project.layouts),
            config_file: source.join(PROJECT_FILE),
            port: project.port,
            source_directory: source,
        }
    }
}
