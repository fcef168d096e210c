//! Defines the [`Manifest`], the complete list of [`PageDescriptor`]s a build
//! produces, and the logic which assembles it from [`Collections`]. The
//! manifest is the only thing the rendering layer consumes.
//!
//! Pages are emitted in a fixed order: individual posts (most recent first),
//! then the paginated post listing, then tag listings, then standalone items.
//! The renderer must not depend on this order for correctness, but it keeps
//! builds reproducible.

use std::{collections::HashMap, fmt, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use crate::{
    collection::{Collections, DatedCollection, Entry},
    context,
    context::{Context, ContextValue},
    node::NodeId,
    paginate::{page_path, plan},
    sequence::{link, Neighbors},
    slug::{normalize_route, Mount},
    tag::index_by_tag,
};

/// Identifies which template renders a page.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    IndividualPost,
    ListingPage,
    StandaloneItem,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [
        TemplateId::IndividualPost,
        TemplateId::ListingPage,
        TemplateId::StandaloneItem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemplateId::IndividualPost => "individual-post",
            TemplateId::ListingPage => "listing-page",
            TemplateId::StandaloneItem => "standalone-item",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One page of output: the route it's reachable at, the template that renders
/// it, and the data the template needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageDescriptor {
    pub path: String,
    pub template: TemplateId,
    pub context: Context,
}

/// The ordered set of pages produced by one build. Every path is unique.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    pages: Vec<PageDescriptor>,
}

impl Manifest {
    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Looks up the page at `path`.
    pub fn get(&self, path: &str) -> Option<&PageDescriptor> {
        self.pages.iter().find(|page| page.path == path)
    }
}

/// Accumulates pages and enforces that no two share a path.
#[derive(Default)]
pub struct ManifestBuilder {
    pages: Vec<PageDescriptor>,

    // path -> description of the page's origin, for error messages
    owners: HashMap<String, String>,
}

impl ManifestBuilder {
    pub fn new() -> ManifestBuilder {
        ManifestBuilder::default()
    }

    /// Appends `page`. `owner` describes where the page came from (e.g., its
    /// source file) and is only used to report collisions.
    pub fn push(&mut self, owner: String, page: PageDescriptor) -> Result<()> {
        if let Some(first) = self.owners.get(&page.path) {
            return Err(PathCollision {
                path: page.path,
                first: first.clone(),
                second: owner,
            });
        }
        self.owners.insert(page.path.clone(), owner);
        self.pages.push(page);
        Ok(())
    }

    pub fn extend(
        &mut self,
        pages: impl IntoIterator<Item = (String, PageDescriptor)>,
    ) -> Result<()> {
        for (owner, page) in pages {
            self.push(owner, page)?;
        }
        Ok(())
    }

    pub fn finish(self) -> Manifest {
        Manifest { pages: self.pages }
    }
}

/// Toggles for each family of pages. Turning a family off produces a smaller
/// manifest; it never changes the pages of the other families.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Emit {
    pub posts: bool,
    pub listings: bool,
    pub standalone: bool,
    pub tags: bool,
}

impl Default for Emit {
    fn default() -> Emit {
        Emit {
            posts: true,
            listings: true,
            standalone: true,
            tags: false,
        }
    }
}

/// Everything the manifest builder needs to know about the site layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// The number of posts per listing page.
    pub page_size: NonZeroUsize,

    /// Where blog posts come from and where their pages are mounted.
    pub blog: Mount,

    /// Where work items come from and where their fallback routes are
    /// mounted.
    pub works: Mount,

    /// The route of the first post listing page.
    pub listing_base: String,

    /// The route under which tag listings are mounted.
    pub tags_base: String,

    pub emit: Emit,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            page_size: NonZeroUsize::new(6).unwrap_or(NonZeroUsize::MIN),
            blog: Mount::new("/blog", "blog"),
            works: Mount::new("/works", "works"),
            listing_base: String::from("/my2cents"),
            tags_base: String::from("/tags"),
            emit: Emit::default(),
        }
    }
}

/// Assembles the manifest for `collections`. Fails if any two pages, from any
/// families, share a path; in that case no manifest is produced at all.
pub fn build(collections: &Collections, options: &Options) -> Result<Manifest> {
    let mut builder = ManifestBuilder::new();
    if options.emit.posts {
        builder.extend(post_pages(&collections.dated))?;
    }
    if options.emit.listings {
        let ids: Vec<&NodeId> =
            collections.dated.newest_first().map(Entry::id).collect();
        builder.extend(listing_pages(
            &normalize_route(&options.listing_base),
            &ids,
            options.page_size,
            &Context::new(),
        ))?;
    }
    if options.emit.tags {
        let tags_base = normalize_route(&options.tags_base);
        for index in index_by_tag(&collections.dated) {
            let ids: Vec<&NodeId> = index.entries.iter().map(|e| e.id()).collect();
            let extra = context! {
                "tag" => &index.tag.name,
                "tag_slug" => &index.tag.slug,
                "total_count" => ids.len(),
            };
            builder.extend(listing_pages(
                &normalize_route(&format!("{}/{}", tags_base, index.tag.slug)),
                &ids,
                options.page_size,
                &extra,
            ))?;
        }
    }
    if options.emit.standalone {
        builder.extend(standalone_pages(&collections.standalone))?;
    }
    Ok(builder.finish())
}

fn owner(entry: &Entry) -> String {
    format!("`{}`", entry.document.node.source_path.display())
}

fn tags(entry: &Entry) -> ContextValue {
    entry.metadata().tags.iter().collect::<Vec<_>>().into()
}

/// Creates one individual-post page per dated entry, in listing order. Each
/// page links to its chronological neighbors: `previous_id` is the next-older
/// post and `next_id` is the next-newer one.
fn post_pages(dated: &DatedCollection) -> Vec<(String, PageDescriptor)> {
    let oldest_first: Vec<&NodeId> = dated.oldest_first().map(Entry::id).collect();
    let neighbors: HashMap<&NodeId, Neighbors<&NodeId>> = oldest_first
        .iter()
        .copied()
        .zip(link(&oldest_first))
        .collect();

    dated
        .newest_first()
        .map(|entry| {
            let Neighbors { previous, next } = neighbors[entry.id()];
            let metadata = entry.metadata();
            let page = PageDescriptor {
                path: entry.path.clone(),
                template: TemplateId::IndividualPost,
                context: context! {
                    "id" => entry.id(),
                    "slug" => entry.slug.as_str(),
                    "path" => &entry.path,
                    "title" => metadata.title.as_ref(),
                    "date" => metadata.date.map(|d| d.to_rfc3339()),
                    "category" => metadata.category.as_ref(),
                    "description" => metadata.description.as_ref(),
                    "tags" => tags(entry),
                    "previous_id" => previous,
                    "next_id" => next,
                },
            };
            (owner(entry), page)
        })
        .collect()
}

/// Creates the paginated listing pages over `ids` (already in listing order)
/// mounted at `base`. `extra` is merged into every page's context.
fn listing_pages(
    base: &str,
    ids: &[&NodeId],
    page_size: NonZeroUsize,
    extra: &Context,
) -> Vec<(String, PageDescriptor)> {
    plan(ids.len(), page_size)
        .into_iter()
        .map(|slice| {
            let mut context = context! {
                "base" => base,
                "limit" => page_size.get(),
                "skip" => slice.skip,
                "num_pages" => slice.num_pages,
                "current_page" => slice.number(),
                "items" => ids[slice.range()].to_vec(),
                "prev_page" => match slice.is_first() {
                    true => None,
                    false => Some(page_path(base, slice.index - 1)),
                },
                "next_page" => match slice.is_last() {
                    true => None,
                    false => Some(page_path(base, slice.index + 1)),
                },
            };
            context.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            let page = PageDescriptor {
                path: page_path(base, slice.index),
                template: TemplateId::ListingPage,
                context,
            };
            (format!("listing `{}` page {}", base, slice.number()), page)
        })
        .collect()
}

/// Creates one standalone-item page per entry, in encounter order.
fn standalone_pages(entries: &[Entry]) -> Vec<(String, PageDescriptor)> {
    entries
        .iter()
        .map(|entry| {
            let metadata = entry.metadata();
            let page = PageDescriptor {
                path: entry.path.clone(),
                template: TemplateId::StandaloneItem,
                context: context! {
                    "id" => entry.id(),
                    "slug" => entry.slug.as_str(),
                    "path" => &entry.path,
                    "title" => metadata.title.as_ref(),
                    "type" => metadata.kind.as_ref(),
                    "short" => metadata.short.as_ref(),
                    "img" => metadata.img.as_ref(),
                    "tags" => tags(entry),
                },
            };
            (owner(entry), page)
        })
        .collect()
}

/// Returned when two pages share a path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathCollision {
    pub path: String,
    pub first: String,
    pub second: String,
}

impl fmt::Display for PathCollision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "path collision: {} and {} both produce the page `{}`",
            self.first, self.second, self.path
        )
    }
}

impl std::error::Error for PathCollision {}

pub type Result<T> = std::result::Result<T, PathCollision>;

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;
    use crate::{node::ContentNode, schema::Schema};

    fn page(path: &str) -> PageDescriptor {
        PageDescriptor {
            path: path.to_owned(),
            template: TemplateId::StandaloneItem,
            context: Context::new(),
        }
    }

    #[test]
    fn test_builder_rejects_duplicate_paths() {
        let mut builder = ManifestBuilder::new();
        builder.push("`a.md`".to_owned(), page("/x")).unwrap();
        builder.push("`b.md`".to_owned(), page("/y")).unwrap();
        let err = builder.push("`c.md`".to_owned(), page("/x")).unwrap_err();
        assert_eq!(
            PathCollision {
                path: "/x".to_owned(),
                first: "`a.md`".to_owned(),
                second: "`c.md`".to_owned(),
            },
            err
        );
        assert_eq!(2, builder.finish().len());
    }

    #[test]
    fn test_listing_pages_cursors() {
        let ids: Vec<NodeId> =
            (0..13).map(|i| NodeId::new(format!("{:02}", i))).collect();
        let refs: Vec<&NodeId> = ids.iter().collect();
        let pages = listing_pages(
            "/my2cents",
            &refs,
            NonZeroUsize::new(6).unwrap(),
            &context! { "tag" => "rust" },
        );
        let paths: Vec<&str> = pages.iter().map(|(_, p)| p.path.as_str()).collect();
        assert_eq!(vec!["/my2cents", "/my2cents/2", "/my2cents/3"], paths);

        let second = &pages[1].1.context;
        assert_eq!(Some(6), second["skip"].as_int());
        assert_eq!(Some(6), second["limit"].as_int());
        assert_eq!(Some(3), second["num_pages"].as_int());
        assert_eq!(Some(2), second["current_page"].as_int());
        assert_eq!(Some("/my2cents"), second["prev_page"].as_str());
        assert_eq!(Some("/my2cents/3"), second["next_page"].as_str());
        assert_eq!(Some("rust"), second["tag"].as_str());

        let first = &pages[0].1.context;
        assert!(first["prev_page"].is_null());
        let last = &pages[2].1.context;
        assert!(last["next_page"].is_null());
        assert_eq!(1, last["items"].as_list().unwrap().len());
    }

    #[test]
    fn test_template_names() {
        let names: Vec<&str> = TemplateId::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            vec!["individual-post", "listing-page", "standalone-item"],
            names
        );
    }

    fn collections<'a>(nodes: &'a [ContentNode], options: &Options) -> Collections<'a> {
        let schema = Schema::site();
        Collections::partition(
            nodes.iter().map(|n| schema.validate(n).unwrap()).collect(),
            &options.blog,
            &options.works,
        )
        .unwrap()
    }

    fn node(path: &str, frontmatter: &str) -> ContentNode {
        let input = format!("---\n{}\n---\n", frontmatter);
        ContentNode::parse(Path::new(path), &input).unwrap()
    }

    #[test]
    fn test_emit_flags() -> Result<()> {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01\ntags: [x]"),
            node("works/w.md", "path: /works/w"),
        ];
        let mut options = Options::default();
        let all = build(&collections(&nodes, &options), &options)?;
        let paths: Vec<&str> = all.pages().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/blog/a", "/my2cents", "/works/w"], paths);

        options.emit = Emit {
            posts: false,
            listings: false,
            standalone: true,
            tags: true,
        };
        let some = build(&collections(&nodes, &options), &options)?;
        let paths: Vec<&str> =
            some.pages().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(vec!["/tags/x", "/works/w"], paths);
        let tag_page = some.get("/tags/x").unwrap();
        assert_eq!(Some("x"), tag_page.context["tag"].as_str());
        assert_eq!(Some(1), tag_page.context["total_count"].as_int());
        Ok(())
    }

    #[test]
    fn test_collision_across_collections() {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
            node("works/w.md", "path: /blog/a"),
        ];
        let options = Options::default();
        let err = build(&collections(&nodes, &options), &options).unwrap_err();
        assert_eq!("/blog/a", err.path);
        assert_eq!("`blog/a.md`", err.first);
        assert_eq!("`works/w.md`", err.second);
    }

    #[test]
    fn test_standalone_collides_with_listing() {
        let nodes = vec![
            node("blog/a.md", "type: blog\ntitle: a\ndate: 2024-01-01"),
            node("works/w.md", "path: /my2cents/"),
        ];
        let options = Options::default();
        let err = build(&collections(&nodes, &options), &options).unwrap_err();
        assert_eq!("/my2cents", err.path);
    }
}
