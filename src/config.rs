//! Loads the project configuration from a `folio.yaml` file.

use crate::manifest::{Emit, Options};
use crate::slug::{normalize_route, Mount};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "folio.yaml";

/// The site's author, as it appears in the feed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(6)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Routes {
    blog_base: String,
    blog_directory: PathBuf,
    listing_base: String,
    works_base: String,
    works_directory: PathBuf,
    tags_base: String,
}

impl Default for Routes {
    fn default() -> Self {
        Routes {
            blog_base: "/blog".to_owned(),
            blog_directory: PathBuf::from("blog"),
            listing_base: "/my2cents".to_owned(),
            works_base: "/works".to_owned(),
            works_directory: PathBuf::from("works"),
            tags_base: "/tags".to_owned(),
        }
    }
}

fn default_content_directory() -> PathBuf {
    PathBuf::from("content")
}

fn default_theme_directory() -> PathBuf {
    PathBuf::from("theme")
}

#[derive(Deserialize)]
struct Project {
    pub title: String,
    pub site_url: Url,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(default = "default_content_directory")]
    pub content_directory: PathBuf,

    #[serde(default = "default_theme_directory")]
    pub theme_directory: PathBuf,

    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub routes: Routes,

    #[serde(default)]
    pub emit: Emit,

    #[serde(default)]
    pub feed: bool,
}

/// The resolved configuration for one build. All directories are absolute or
/// relative to the working directory, never to the project file.
#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub site_url: Url,
    pub author: Option<Author>,
    pub content_directory: PathBuf,
    pub theme_directory: PathBuf,
    pub output_directory: PathBuf,
    pub feed: bool,
    pub options: Options,
}

impl Config {
    /// Looks for a `folio.yaml` in `dir` and then in each of its ancestors,
    /// and loads the first one found. The output directory defaults to
    /// `_site` next to the project file.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        let page_size = NonZeroUsize::new(project.page_size.0)
            .ok_or_else(|| anyhow!("`page_size` must be greater than zero"))?;

        // Routes are joined onto the site URL, which only works as intended
        // when the URL ends in a slash.
        let mut site_url = project.site_url;
        if !site_url.path().ends_with('/') {
            let path = format!("{}/", site_url.path());
            site_url.set_path(&path);
        }

        let routes = project.routes;
        Ok(Config {
            title: project.title,
            site_url,
            author: project.author,
            content_directory: project_root.join(project.content_directory),
            theme_directory: project_root.join(project.theme_directory),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("_site"),
            },
            feed: project.feed,
            options: Options {
                page_size,
                blog: Mount {
                    route: normalize_route(&routes.blog_base),
                    source_root: routes.blog_directory,
                },
                works: Mount {
                    route: normalize_route(&routes.works_base),
                    source_root: routes.works_directory,
                },
                listing_base: normalize_route(&routes.listing_base),
                tags_base: normalize_route(&routes.tags_base),
                emit: project.emit,
            },
        })
    }
}
