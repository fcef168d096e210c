//! Partitions validated documents into collections. Every document is
//! classified exactly once by [`classify`]; blog posts become the
//! [`DatedCollection`], documents with an explicit route become standalone
//! entries, and everything else is excluded from page generation (but still
//! returned, since other consumers such as a home page may want it).

use log::debug;

use crate::{
    node::NodeId,
    schema::{Document, Metadata},
    slug::{self, Mount, Slug},
};

/// The `type` value which marks a dated, sequential document.
pub const BLOG_TYPE: &str = "blog";

/// The collection a document belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Dated, sequential content (blog posts).
    Dated,

    /// Standalone content with an explicit route (work/project items).
    Standalone,

    /// Not page-worthy.
    Excluded,
}

/// Classifies a document by its metadata. The rules are evaluated in order and
/// the first match wins:
///
/// 1. `type` is `blog` ⇒ [`Classification::Dated`]
/// 2. `path` is present ⇒ [`Classification::Standalone`]
/// 3. otherwise ⇒ [`Classification::Excluded`]
pub fn classify(metadata: &Metadata) -> Classification {
    if metadata.kind.as_deref() == Some(BLOG_TYPE) {
        Classification::Dated
    } else if metadata.path.is_some() {
        Classification::Standalone
    } else {
        Classification::Excluded
    }
}

/// A document that has been assigned a slug and a final route.
#[derive(Clone, Debug)]
pub struct Entry<'a> {
    pub document: Document<'a>,
    pub slug: Slug,
    pub path: String,
}

impl<'a> Entry<'a> {
    pub fn id(&self) -> &'a NodeId {
        &self.document.node.id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.document.metadata
    }
}

/// The dated, sequential collection. It holds two derived orderings over the
/// same entries: newest-first for listings and oldest-first for sequence
/// linking. Both are computed once, on construction.
#[derive(Clone, Debug, Default)]
pub struct DatedCollection<'a> {
    entries: Vec<Entry<'a>>,
    newest_first: Vec<usize>,
    oldest_first: Vec<usize>,
}

impl<'a> DatedCollection<'a> {
    /// Builds the collection and its orderings. Newest-first sorts by date
    /// descending and breaks ties by ID ascending, so it doesn't depend on the
    /// order of `entries`. Oldest-first is its exact reverse, which keeps
    /// sequence links consistent with the listing even for same-date posts.
    pub fn new(entries: Vec<Entry<'a>>) -> DatedCollection<'a> {
        let mut newest_first: Vec<usize> = (0..entries.len()).collect();
        newest_first.sort_by(|&a, &b| {
            let (a, b) = (&entries[a], &entries[b]);
            b.metadata()
                .date
                .cmp(&a.metadata().date)
                .then_with(|| a.id().cmp(b.id()))
        });

        let oldest_first: Vec<usize> = newest_first.iter().rev().copied().collect();

        DatedCollection {
            entries,
            newest_first,
            oldest_first,
        }
    }

    /// The entries in listing order (most recent first).
    pub fn newest_first(&self) -> impl Iterator<Item = &Entry<'a>> + '_ {
        self.newest_first.iter().map(move |&i| &self.entries[i])
    }

    /// The entries in chronological order (oldest first).
    pub fn oldest_first(&self) -> impl Iterator<Item = &Entry<'a>> + '_ {
        self.oldest_first.iter().map(move |&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The result of partitioning a set of documents.
#[derive(Clone, Debug, Default)]
pub struct Collections<'a> {
    pub dated: DatedCollection<'a>,

    /// Standalone entries, in encounter order.
    pub standalone: Vec<Entry<'a>>,

    /// Documents which produce no page.
    pub excluded: Vec<Document<'a>>,
}

impl<'a> Collections<'a> {
    /// Classifies `documents`, derives slugs and routes for the page-worthy
    /// ones (the dated collection under `blog`, standalone entries under
    /// `works`), and orders the dated collection.
    pub fn partition(
        documents: Vec<Document<'a>>,
        blog: &Mount,
        works: &Mount,
    ) -> slug::Result<Collections<'a>> {
        let mut dated = Vec::new();
        let mut standalone = Vec::new();
        let mut excluded = Vec::new();
        for document in documents {
            let classification = classify(&document.metadata);
            debug!(
                "classified `{}` as {:?}",
                document.node.source_path.display(),
                classification
            );
            match classification {
                Classification::Dated => dated.push(document),
                Classification::Standalone => standalone.push(document),
                Classification::Excluded => excluded.push(document),
            }
        }

        Ok(Collections {
            dated: DatedCollection::new(slug::assign("blog", dated, blog)?),
            standalone: slug::assign("works", standalone, works)?,
            excluded,
        })
    }

    /// Finds a page-worthy entry by ID.
    pub fn entry(&self, id: &NodeId) -> Option<&Entry<'a>> {
        self.dated
            .entries
            .iter()
            .chain(self.standalone.iter())
            .find(|entry| entry.id() == id)
    }
}
