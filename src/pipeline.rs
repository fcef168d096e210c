//! Runs the content-to-manifest pipeline over a set of discovered nodes:
//!
//! 1. Validate every node against the [`Schema`]
//! 2. Classify the documents into collections, derive their slugs and routes,
//!    and order the dated collection ([`Collections::partition`])
//! 3. Paginate, link, and assemble the [`Manifest`] ([`manifest::build`])
//!
//! Each stage runs to completion before the next one starts, and the first
//! error aborts the whole run: callers either get a complete manifest or
//! nothing.

use std::{collections::HashSet, fmt};

use log::info;

use crate::{
    collection::Collections,
    manifest::{self, Manifest, Options, PathCollision},
    node::{ContentNode, NodeId},
    schema::{Schema, SchemaViolation},
    slug::SlugCollision,
};

/// The result of a successful pipeline run. The collections are kept around
/// for collaborators that need more than the manifest (e.g., the renderer
/// resolving IDs, the feed, or a home page listing excluded documents).
pub struct Output<'a> {
    pub collections: Collections<'a>,
    pub manifest: Manifest,
}

/// Runs the pipeline. See the module documentation.
pub fn run<'a>(
    nodes: &'a [ContentNode],
    schema: &Schema,
    options: &Options,
) -> Result<Output<'a>> {
    let mut ids: HashSet<&NodeId> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(&node.id) {
            return Err(Error::DuplicateId(node.id.clone()));
        }
    }

    let documents = nodes
        .iter()
        .map(|node| schema.validate(node))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!("validated {} content nodes", documents.len());

    let collections =
        Collections::partition(documents, &options.blog, &options.works)?;
    info!(
        "classified {} posts, {} standalone items, {} excluded",
        collections.dated.len(),
        collections.standalone.len(),
        collections.excluded.len()
    );

    let manifest = manifest::build(&collections, options)?;
    info!("planned {} pages", manifest.len());

    Ok(Output {
        collections,
        manifest,
    })
}

/// The result of a pipeline run.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a fatal problem with the content. None of these can be recovered
/// from without fixing the content itself.
#[derive(Debug)]
pub enum Error {
    /// Returned when two nodes share an ID.
    DuplicateId(NodeId),

    /// Returned when a node's metadata doesn't conform to the schema.
    Schema(SchemaViolation),

    /// Returned when two nodes in one collection resolve to the same route.
    Slug(SlugCollision),

    /// Returned when two pages in the manifest share a path.
    Path(PathCollision),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateId(id) => write!(f, "duplicate content ID `{}`", id),
            Error::Schema(err) => err.fmt(f),
            Error::Slug(err) => err.fmt(f),
            Error::Path(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DuplicateId(_) => None,
            Error::Schema(err) => Some(err),
            Error::Slug(err) => Some(err),
            Error::Path(err) => Some(err),
        }
    }
}

impl From<SchemaViolation> for Error {
    fn from(err: SchemaViolation) -> Error {
        Error::Schema(err)
    }
}

impl From<SlugCollision> for Error {
    fn from(err: SlugCollision) -> Error {
        Error::Slug(err)
    }
}

impl From<PathCollision> for Error {
    fn from(err: PathCollision) -> Error {
        Error::Path(err)
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;
    use crate::{context::ContextValue, manifest::TemplateId};

    fn node(path: &str, frontmatter: &str) -> ContentNode {
        let input = format!("---\n{}\n---\nbody of {}\n", frontmatter, path);
        ContentNode::parse(Path::new(path), &input).unwrap()
    }

    fn blog_posts(count: usize) -> Vec<ContentNode> {
        (0..count)
            .map(|i| {
                node(
                    &format!("blog/post-{:02}.md", i),
                    &format!(
                        "type: blog\ntitle: Post {}\ndate: 2024-01-{:02}",
                        i,
                        i + 1
                    ),
                )
            })
            .collect()
    }

    fn run_default(nodes: &[ContentNode]) -> Result<Output<'_>> {
        run(nodes, &Schema::site(), &Options::default())
    }

    fn listing_pages(manifest: &Manifest) -> Vec<&manifest::PageDescriptor> {
        manifest
            .pages()
            .iter()
            .filter(|p| p.template == TemplateId::ListingPage)
            .collect()
    }

    fn items(page: &manifest::PageDescriptor) -> Vec<String> {
        page.context["items"]
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_thirteen_posts_paginate_into_three_pages() -> Result<()> {
        let nodes = blog_posts(13);
        let output = run_default(&nodes)?;
        let listings = listing_pages(&output.manifest);
        let paths: Vec<&str> = listings.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/my2cents", "/my2cents/2", "/my2cents/3"], paths);
        let sizes: Vec<usize> = listings.iter().map(|p| items(p).len()).collect();
        assert_eq!(vec![6, 6, 1], sizes);

        // every post appears exactly once, most recent first
        let all: Vec<String> = listings.iter().flat_map(|p| items(p)).collect();
        let wanted: Vec<String> = (0..13)
            .rev()
            .map(|i| format!("blog/post-{:02}.md", i))
            .collect();
        assert_eq!(wanted, all);
        Ok(())
    }

    #[test]
    fn test_sequence_links_follow_chronology() -> Result<()> {
        let nodes = vec![
            node("blog/newer.md", "type: blog\ntitle: n\ndate: 2024-01-02"),
            node("blog/older.md", "type: blog\ntitle: o\ndate: 2024-01-01"),
        ];
        let output = run_default(&nodes)?;

        let listing = output.manifest.get("/my2cents").unwrap();
        assert_eq!(vec!["blog/newer.md", "blog/older.md"], items(listing));

        let older = output.manifest.get("/blog/older").unwrap();
        assert_eq!(TemplateId::IndividualPost, older.template);
        assert!(older.context["previous_id"].is_null());
        assert_eq!(Some("blog/newer.md"), older.context["next_id"].as_str());

        let newer = output.manifest.get("/blog/newer").unwrap();
        assert_eq!(Some("blog/older.md"), newer.context["previous_id"].as_str());
        assert!(newer.context["next_id"].is_null());
        Ok(())
    }

    #[test]
    fn test_same_date_links_follow_listing() -> Result<()> {
        let nodes = vec![
            node("blog/b.md", "type: blog\ntitle: b\ndate: 2024-01-02"),
            node("blog/d.md", "type: blog\ntitle: d\ndate: 2024-01-02"),
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
        ];
        let output = run_default(&nodes)?;
        let listing = items(output.manifest.get("/my2cents").unwrap());
        assert_eq!(vec!["blog/b.md", "blog/d.md", "blog/a.md"], listing);

        // walking `next_id` from the oldest post visits the listing in reverse
        let mut walked = Vec::new();
        let mut current = Some("blog/a.md".to_owned());
        while let Some(id) = current {
            let slug = id.trim_start_matches("blog/").trim_end_matches(".md");
            let page = output.manifest.get(&format!("/blog/{}", slug)).unwrap();
            current = page.context["next_id"].as_str().map(str::to_owned);
            walked.push(id);
        }
        walked.reverse();
        assert_eq!(listing, walked);

        let b = output.manifest.get("/blog/b").unwrap();
        assert!(b.context["next_id"].is_null());
        assert_eq!(Some("blog/d.md"), b.context["previous_id"].as_str());
        Ok(())
    }

    #[test]
    fn test_every_post_links_to_its_neighbors() -> Result<()> {
        let nodes = blog_posts(9);
        let output = run_default(&nodes)?;
        for i in 0..9 {
            let page = output
                .manifest
                .get(&format!("/blog/post-{:02}", i))
                .unwrap();
            let previous = page.context["previous_id"].as_str();
            let next = page.context["next_id"].as_str();
            match i {
                0 => assert_eq!(None, previous),
                _ => assert_eq!(
                    Some(format!("blog/post-{:02}.md", i - 1).as_str()),
                    previous
                ),
            }
            match i {
                8 => assert_eq!(None, next),
                _ => assert_eq!(
                    Some(format!("blog/post-{:02}.md", i + 1).as_str()),
                    next
                ),
            }
        }
        Ok(())
    }

    #[test]
    fn test_standalone_override_path() -> Result<()> {
        let nodes = vec![node("works/project.md", "path: /works/my-project")];
        let output = run_default(&nodes)?;
        assert_eq!(1, output.manifest.len());
        let page = &output.manifest.pages()[0];
        assert_eq!("/works/my-project", page.path);
        assert_eq!(TemplateId::StandaloneItem, page.template);
        assert_eq!(Some("/project"), page.context["slug"].as_str());
        Ok(())
    }

    #[test]
    fn test_missing_tags_is_empty_list() -> Result<()> {
        let nodes = vec![node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01")];
        let output = run_default(&nodes)?;
        let page = output.manifest.get("/blog/a").unwrap();
        assert_eq!(ContextValue::List(Vec::new()), page.context["tags"]);
        Ok(())
    }

    #[test]
    fn test_no_posts_means_no_listing_pages() -> Result<()> {
        let nodes = vec![node("about.md", "title: About")];
        let output = run_default(&nodes)?;
        assert!(output.manifest.is_empty());
        assert_eq!(1, output.collections.excluded.len());
        Ok(())
    }

    #[test]
    fn test_idempotent_and_order_independent() -> Result<()> {
        let mut nodes = blog_posts(8);
        nodes.push(node("works/a.md", "path: /works/a\ntags: [x]"));
        let first = run_default(&nodes)?.manifest;
        let second = run_default(&nodes)?.manifest;
        assert_eq!(first, second);

        // posts and listings don't depend on discovery order
        let mut reversed = blog_posts(8);
        reversed.reverse();
        reversed.push(node("works/a.md", "path: /works/a\ntags: [x]"));
        assert_eq!(first, run_default(&reversed)?.manifest);
        Ok(())
    }

    #[test]
    fn test_paths_are_unique() -> Result<()> {
        let mut nodes = blog_posts(20);
        nodes.push(node("works/a.md", "path: /works/a"));
        let options = Options {
            emit: manifest::Emit {
                tags: true,
                ..manifest::Emit::default()
            },
            ..Options::default()
        };
        let output = run(&nodes, &Schema::site(), &options)?;
        let mut paths: Vec<&str> =
            output.manifest.pages().iter().map(|p| p.path.as_str()).collect();
        let total = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(total, paths.len());
        assert!(paths.iter().all(|p| p.starts_with('/')));
        Ok(())
    }

    #[test]
    fn test_schema_violation_aborts() {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
            node("blog/b.md", "type: blog\ntitle: b\ndate: 2024-01-01\ntags: x"),
        ];
        match run_default(&nodes) {
            Err(Error::Schema(err)) => {
                assert_eq!(Path::new("blog/b.md"), err.source_path);
                assert!(err.to_string().contains("blog/b.md"));
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected a schema violation"),
        }
    }

    #[test]
    fn test_slug_collision_aborts() {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
            node("blog/A.markdown", "type: blog\ntitle: b\ndate: 2024-01-02"),
        ];
        assert!(matches!(run_default(&nodes), Err(Error::Slug(_))));
    }

    #[test]
    fn test_path_collision_aborts() {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
            node("works/a.md", "path: /blog/a"),
        ];
        assert!(matches!(run_default(&nodes), Err(Error::Path(_))));
    }

    #[test]
    fn test_duplicate_ids_abort() {
        let nodes = vec![node("a.md", "title: a"), node("a.md", "title: b")];
        assert!(matches!(run_default(&nodes), Err(Error::DuplicateId(_))));
    }
}
