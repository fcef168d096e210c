//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: discovering the content
//! ([`crate::node`]), planning the pages ([`crate::pipeline`]), rendering
//! them ([`crate::render`]), copying the theme's static directory into the
//! output directory, and generating the Atom feed.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::manifest::Manifest;
use crate::node::{discover, ContentNode, Error as DiscoverError, CONTENT_EXTENSIONS};
use crate::pipeline::{self, Error as PipelineError};
use crate::render::{Error as RenderError, Renderer, Site};
use crate::schema::Schema;
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Builds the site from a [`Config`] object. This calls into
/// [`discover`], [`pipeline::run`], [`Renderer::render`], and [`write_feed`]
/// which do the heavy-lifting. This function also copies the static assets
/// from the theme directory to the output directory.
pub fn build_site(config: &Config) -> Result<()> {
    let nodes = discover_nodes(config)?;
    let output = pipeline::run(&nodes, &Schema::site(), &config.options)?;

    // Load the templates before touching the output directory so a broken
    // theme doesn't leave an empty site behind.
    let renderer = Renderer::load(
        &config.theme_directory,
        Site {
            title: config.title.clone(),
            url: config.site_url.to_string(),
        },
    )?;

    rmdir(&config.output_directory)?;
    std::fs::create_dir_all(&config.output_directory)?;
    renderer.render(&output.manifest, &output.collections, &config.output_directory)?;
    info!(
        "rendered {} pages to `{}`",
        output.manifest.len(),
        config.output_directory.display()
    );

    let static_source_directory = config.theme_directory.join("static");
    if static_source_directory.is_dir() {
        copy_dir(
            &static_source_directory,
            &config.output_directory.join("static"),
        )?;
    }

    if config.feed && !config.options.emit.posts {
        warn!("skipping the feed: post pages aren't emitted, so its links would be dead");
    } else if config.feed {
        write_feed(
            &FeedConfig {
                title: config.title.clone(),
                id: config.site_url.to_string(),
                author: config.author.clone(),
                site_url: config.site_url.clone(),
            },
            &output.collections.dated,
            File::create(config.output_directory.join("feed.atom"))?,
        )?;
    }

    Ok(())
}

/// Discovers the content and plans the pages without rendering anything.
pub fn build_manifest(config: &Config) -> Result<Manifest> {
    let nodes = discover_nodes(config)?;
    let output = pipeline::run(&nodes, &Schema::site(), &config.options)?;
    Ok(output.manifest)
}

fn discover_nodes(config: &Config) -> Result<Vec<ContentNode>> {
    let nodes = discover(&config.content_directory, CONTENT_EXTENSIONS)?;
    info!(
        "discovered {} content nodes in `{}`",
        nodes.len(),
        config.content_directory.display()
    );
    Ok(nodes)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&src.join(entry.file_name()), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(src.join(entry.file_name()), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during discovery,
/// planning, rendering, cleaning the output directory, writing the feed, and
/// other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors reading content files.
    Discover(DiscoverError),

    /// Returned when the content can't be turned into a manifest.
    Pipeline(PipelineError),

    /// Returned for errors loading templates or writing pages to disk.
    Render(RenderError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Discover(err) => err.fmt(f),
            Error::Pipeline(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Discover(err) => Some(err),
            Error::Pipeline(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<DiscoverError> for Error {
    /// Converts [`DiscoverError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: DiscoverError) -> Error {
        Error::Discover(err)
    }
}

impl From<PipelineError> for Error {
    /// Converts [`PipelineError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PipelineError) -> Error {
        Error::Pipeline(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
