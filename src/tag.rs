//! Defines the [`Tag`] type and [`index_by_tag`], which groups the dated
//! collection into one listing per tag.

use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};

use crate::collection::{DatedCollection, Entry};

/// A tag as it appears on an entry. Tags are compared by their slug so e.g.,
/// `macOS` and `MacOS` resolve to the same tag.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag as written in the first (most recent) entry which uses it.
    pub name: String,

    /// The slugified tag. It's safe to drop into a route.
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        Tag {
            name: name.to_owned(),
            slug: ::slug::slugify(name),
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `slug`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `slug` field.
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}
impl Eq for Tag {}

/// The entries associated with one tag, most recent first.
pub struct TagIndex<'c, 'a> {
    pub tag: Tag,
    pub entries: Vec<&'c Entry<'a>>,
}

/// Indexes the dated collection by tag. Indices are ordered by tag slug and
/// each index lists its entries in listing order (most recent first). Tags
/// which slugify to nothing (e.g., `???`) are skipped.
pub fn index_by_tag<'c, 'a>(
    dated: &'c DatedCollection<'a>,
) -> Vec<TagIndex<'c, 'a>> {
    let mut indices: BTreeMap<String, TagIndex> = BTreeMap::new();
    for entry in dated.newest_first() {
        for name in entry.metadata().tags.iter() {
            let tag = Tag::new(name);
            if tag.slug.is_empty() {
                continue;
            }
            let index = indices.entry(tag.slug.clone()).or_insert_with(|| {
                TagIndex {
                    tag,
                    entries: Vec::new(),
                }
            });
            // an entry may list the same tag twice under different spellings
            if index.entries.last().map(|e| e.id()) != Some(entry.id()) {
                index.entries.push(entry);
            }
        }
    }
    indices.into_iter().map(|(_, index)| index).collect()
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;
    use crate::{
        collection::Collections, node::ContentNode, schema::Schema, slug::Mount,
    };

    #[test]
    fn test_tags_compare_by_slug() {
        assert_eq!(Tag::new("macOS"), Tag::new("MacOS"));
        assert_eq!("web-dev", Tag::new("Web Dev").slug);
    }

    #[test]
    fn test_index_by_tag() {
        let nodes: Vec<ContentNode> = [
            ("blog/a.md", "2024-01-01", "[Rust, web]"),
            ("blog/b.md", "2024-01-03", "[rust, rust]"),
            ("blog/c.md", "2024-01-02", "['???']"),
        ]
        .iter()
        .map(|(path, date, tags)| {
            let input = format!(
                "---\ntype: blog\ntitle: t\ndate: {}\ntags: {}\n---\n",
                date, tags
            );
            ContentNode::parse(Path::new(path), &input).unwrap()
        })
        .collect();
        let schema = Schema::site();
        let collections = Collections::partition(
            nodes.iter().map(|n| schema.validate(n).unwrap()).collect(),
            &Mount::new("/blog", "blog"),
            &Mount::new("/works", "works"),
        )
        .unwrap();

        let indices = index_by_tag(&collections.dated);
        assert_eq!(2, indices.len());

        assert_eq!("rust", indices[0].tag.slug);
        assert_eq!("rust", indices[0].tag.name);
        let ids: Vec<&str> =
            indices[0].entries.iter().map(|e| e.id().as_str()).collect();
        assert_eq!(vec!["blog/b.md", "blog/a.md"], ids);

        assert_eq!("web", indices[1].tag.slug);
        assert_eq!(1, indices[1].entries.len());
    }
}
