//! Slug derivation. A [`Slug`] is the normalized path fragment for a content
//! node, derived from where its source file lives inside its collection's
//! source root. Routes are built by joining a collection's [`Mount`] with the
//! slug, unless the node overrides its route with an explicit `path`.

use std::{
    collections::HashMap,
    fmt,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{collection::Entry, node::ContentNode, schema::Document};

/// A normalized path fragment. Always begins with `/`; the empty slug is `/`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Derives the slug for `source_path` relative to `root`. The root prefix and
/// the extension are stripped, an `index` file takes the name of its
/// directory, and each remaining segment is slugified. For example, both
/// `blog/Hello World.md` and `blog/hello-world/index.md` have the slug
/// `/hello-world` under the root `blog`. A path outside of `root` is slugified
/// in full.
pub fn derive(source_path: &Path, root: &Path) -> Slug {
    let relative = source_path.strip_prefix(root).unwrap_or(source_path);
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(::slug::slugify(s.to_string_lossy())),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    if segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }
    Slug(format!("/{}", segments.join("/")))
}

/// Collapses repeated and trailing separators, resolves `.` and `..`
/// segments, and makes sure the route begins with `/` (e.g., `works//x/`
/// becomes `/works/x` and `/works/../x` becomes `/x`). `..` never climbs above
/// the root. Two routes that land on the same output directory always
/// normalize to the same string.
pub fn normalize_route(route: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in route.trim().split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Where a collection's content lives in the content tree (`source_root`,
/// relative to the content root) and where its pages are mounted in the site
/// (`route`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Mount {
    pub route: String,
    pub source_root: PathBuf,
}

impl Mount {
    pub fn new(route: &str, source_root: &str) -> Mount {
        Mount {
            route: route.to_owned(),
            source_root: PathBuf::from(source_root),
        }
    }

    /// Returns the route for `slug` under this mount.
    pub fn route_for(&self, slug: &Slug) -> String {
        normalize_route(&format!("{}/{}", self.route, slug))
    }
}

/// Derives the slug and final route for every document in one collection. An
/// explicit `path` override wins outright; otherwise the route is the
/// document's slug under `mount`. Fails with a [`SlugCollision`] if two
/// documents end up at the same route.
pub fn assign<'a>(
    collection: &str,
    documents: Vec<Document<'a>>,
    mount: &Mount,
) -> Result<Vec<Entry<'a>>> {
    let mut seen: HashMap<String, &'a Path> = HashMap::new();
    let mut entries = Vec::with_capacity(documents.len());
    for document in documents {
        let node: &'a ContentNode = document.node;
        let slug = derive(&node.source_path, &mount.source_root);
        let path = match &document.metadata.path {
            Some(path) => normalize_route(path),
            None => mount.route_for(&slug),
        };
        if let Some(first) = seen.insert(path.clone(), &node.source_path) {
            return Err(SlugCollision {
                collection: collection.to_owned(),
                path,
                first: first.to_owned(),
                second: node.source_path.clone(),
            });
        }
        entries.push(Entry {
            document,
            slug,
            path,
        });
    }
    Ok(entries)
}

/// Returned when two nodes in one collection resolve to the same route.
#[derive(Clone, Debug, PartialEq)]
pub struct SlugCollision {
    pub collection: String,
    pub path: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

impl fmt::Display for SlugCollision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "slug collision in collection `{}`: `{}` and `{}` both resolve to \
             `{}`",
            self.collection,
            self.first.display(),
            self.second.display(),
            self.path
        )
    }
}

impl std::error::Error for SlugCollision {}

pub type Result<T> = std::result::Result<T, SlugCollision>;
