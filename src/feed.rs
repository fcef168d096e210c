//! Support for creating Atom feeds from the dated collection.

use crate::collection::DatedCollection;
use crate::config::Author;
use crate::markdown;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::io::Write;
use url::{ParseError, Url};

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub site_url: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and the dated
/// collection and writes the result to a [`std::io::Write`]. Entries appear
/// newest first.
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    posts: &DatedCollection,
    w: W,
) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: &FeedConfig, posts: &DatedCollection) -> Result<Feed> {
    let entries = feed_entries(config, posts)?;

    // The feed was last updated when its newest post was; an empty feed is
    // stamped with the build time.
    let updated: DateTime<FixedOffset> = posts
        .newest_first()
        .find_map(|entry| entry.metadata().date)
        .unwrap_or_else(|| Utc::now().into());

    let mut feed = Feed::default();
    feed.set_title(config.title.as_str());
    feed.set_id(config.id.as_str());
    feed.set_updated(updated);
    feed.set_authors(author_to_people(config.author.as_ref()));
    feed.set_links(vec![alternate_link(config.site_url.as_str())]);
    feed.set_entries(entries);
    Ok(feed)
}

fn feed_entries(config: &FeedConfig, posts: &DatedCollection) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts.newest_first() {
        let metadata = post.metadata();
        let url = config.site_url.join(post.path.trim_start_matches('/'))?;
        let summary = match &metadata.description {
            Some(description) => Text::plain(description.as_str()),
            None => Text::html(markdown::excerpt(&post.document.node.body).0),
        };

        let mut entry = Entry::default();
        entry.set_id(url.as_str());
        entry.set_title(metadata.title.as_deref().unwrap_or_default());
        entry.set_authors(author_to_people(config.author.as_ref()));
        entry.set_links(vec![alternate_link(url.as_str())]);
        entry.set_summary(summary);
        if let Some(date) = metadata.date {
            entry.set_updated(date);
            entry.set_published(date);
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn alternate_link(href: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.as_str());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and URL
/// issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when a post's route can't be joined onto the site URL.
    Url(ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        manifest::Options, node::ContentNode, pipeline, schema::Schema,
    };
    use std::path::Path;

    fn config() -> FeedConfig {
        FeedConfig {
            title: "Folio".to_owned(),
            id: "https://example.org/".to_owned(),
            author: Some(Author {
                name: "Jane".to_owned(),
                email: None,
            }),
            site_url: Url::parse("https://example.org/").unwrap(),
        }
    }

    #[test]
    fn test_feed_entries_newest_first() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let nodes = vec![
            ContentNode::parse(
                Path::new("blog/old.md"),
                "---\ntype: blog\ntitle: Old\ndate: 2023-05-01\n---\nFirst\n\nSecond",
            )?,
            ContentNode::parse(
                Path::new("blog/new.md"),
                "---\ntype: blog\ntitle: New\ndate: 2024-05-01\ndescription: Fresh\n---\n",
            )?,
        ];
        let output = pipeline::run(&nodes, &Schema::site(), &Options::default())?;
        let feed = feed(&config(), &output.collections.dated)?;

        assert_eq!("Folio", feed.title().as_str());
        assert_eq!(
            "2024-05-01T00:00:00+00:00",
            feed.updated().to_rfc3339()
        );

        let entries = feed.entries();
        assert_eq!(2, entries.len());
        assert_eq!("New", entries[0].title().as_str());
        assert_eq!("https://example.org/blog/new", entries[0].links()[0].href());
        assert_eq!(Some("Fresh"), entries[0].summary().map(|s| s.as_str()));
        assert_eq!("Old", entries[1].title().as_str());
        assert_eq!(
            Some("<p>First</p>\n"),
            entries[1].summary().map(|s| s.as_str())
        );

        let mut buf: Vec<u8> = Vec::new();
        write_feed(&config(), &output.collections.dated, &mut buf)?;
        let xml = String::from_utf8(buf)?;
        assert!(xml.contains("<name>Jane</name>"));
        Ok(())
    }
}
